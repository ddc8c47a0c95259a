// ==========================================
// VisionJudgementRepository - 视觉判定仓储
// ==========================================
// 仅追加: 视觉判定只记录流水，不参与状态变迁
// ==========================================

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

use crate::domain::production::VisionJudgement;
use crate::domain::types::{VisionResult, VisionUnit};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::DATETIME_FORMAT;

pub struct VisionJudgementRepository {
    conn: Arc<Mutex<Connection>>,
}

impl VisionJudgementRepository {
    /// 创建新的视觉判定仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入一条判定流水
    ///
    /// # 返回
    /// - `Ok(seq)`: 自增序号
    pub fn insert(
        &self,
        unit: VisionUnit,
        result: VisionResult,
        judged_date: NaiveDateTime,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO vision_judgement (unit, result, judged_date) VALUES (?1, ?2, ?3)",
            params![
                unit.to_db_str(),
                result.to_db_str(),
                judged_date.format(DATETIME_FORMAT).to_string(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 判定流水总数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM vision_judgement", [], |row| row.get(0))?;
        Ok(count)
    }

    /// 最近 N 条判定流水（新的在前）
    pub fn list_recent(&self, limit: i64) -> RepositoryResult<Vec<VisionJudgement>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT seq, unit, result, judged_date FROM vision_judgement \
             ORDER BY seq DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit], |row| {
                let unit: String = row.get(1)?;
                let result: String = row.get(2)?;
                Ok(VisionJudgement {
                    seq: row.get(0)?,
                    unit: if unit == "LOWER" {
                        VisionUnit::Lower
                    } else {
                        VisionUnit::Upper
                    },
                    result: if result == "NG" {
                        VisionResult::Ng
                    } else {
                        VisionResult::Ok
                    },
                    judged_date: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_db() -> Arc<Mutex<Connection>> {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::ensure_ledger_schema(&conn).unwrap();
        Arc::new(Mutex::new(conn))
    }

    #[test]
    fn test_insert_is_append_only_with_increasing_seq() {
        let repo = VisionJudgementRepository::new(setup_test_db());
        let ts = NaiveDateTime::parse_from_str("2025-01-01 08:00:00", "%Y-%m-%d %H:%M:%S")
            .unwrap();

        let seq1 = repo.insert(VisionUnit::Upper, VisionResult::Ok, ts).unwrap();
        let seq2 = repo.insert(VisionUnit::Lower, VisionResult::Ng, ts).unwrap();
        assert!(seq2 > seq1);
        assert_eq!(repo.count().unwrap(), 2);

        let recent = repo.list_recent(10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].unit, VisionUnit::Lower);
        assert_eq!(recent[0].result, VisionResult::Ng);
        assert_eq!(recent[1].unit, VisionUnit::Upper);
        assert_eq!(recent[1].result, VisionResult::Ok);
    }
}
