// ==========================================
// ProductionRepository - 生产仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// 说明: “当前生产”指 end_date 为 NULL 且 start_date 最大的一行；
//       计数增量在 SQL 层完成（x = x + 1），避免读改写丢失更新。
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

use crate::domain::production::{Production, ProductionHistory};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{ident, DATETIME_FORMAT};

pub struct ProductionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProductionRepository {
    /// 创建新的生产仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_production(row: &Row<'_>) -> rusqlite::Result<Production> {
        Ok(Production {
            production_id: row.get(0)?,
            model_code: row.get(1)?,
            upper_quantity: row.get(2)?,
            lower_quantity: row.get(3)?,
            good_quantity: row.get(4)?,
            bad_quantity: row.get(5)?,
            start_date: row.get(6)?,
            end_date: row.get(7)?,
        })
    }

    const SELECT_COLUMNS: &'static str = "production_id, model_code, upper_quantity, \
         lower_quantity, good_quantity, bad_quantity, start_date, end_date";

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入生产记录
    ///
    /// # 返回
    /// - `Ok(rows)`: 受影响行数（预期为 1，由调用方校验告警）
    pub fn insert(&self, production: &Production) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            INSERT INTO production
                (production_id, model_code, upper_quantity, lower_quantity,
                 good_quantity, bad_quantity, start_date, end_date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                production.production_id,
                production.model_code,
                production.upper_quantity,
                production.lower_quantity,
                production.good_quantity,
                production.bad_quantity,
                production.start_date.format(DATETIME_FORMAT).to_string(),
                production
                    .end_date
                    .map(|d| d.format(DATETIME_FORMAT).to_string()),
            ],
        )?;
        Ok(rows)
    }

    /// 设置结束时间（生产收尾）
    pub fn set_end_date(
        &self,
        production_id: i64,
        end_date: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE production SET end_date = ?1 WHERE production_id = ?2",
            params![end_date.format(DATETIME_FORMAT).to_string(), production_id],
        )?;
        Ok(rows)
    }

    /// 良品计数 +1（SQL 层自增）
    pub fn increment_good(&self, production_id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE production SET good_quantity = good_quantity + 1 WHERE production_id = ?1",
            params![production_id],
        )?;
        Ok(rows)
    }

    /// 不良计数 +1（SQL 层自增）
    pub fn increment_bad(&self, production_id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE production SET bad_quantity = bad_quantity + 1 WHERE production_id = ?1",
            params![production_id],
        )?;
        Ok(rows)
    }

    /// 删除生产记录（归档迁移的删除步骤）
    pub fn delete(&self, production_id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "DELETE FROM production WHERE production_id = ?1",
            params![production_id],
        )?;
        Ok(rows)
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 查询当前生产（end_date 为 NULL 且 start_date 最大）
    pub fn find_open(&self) -> RepositoryResult<Option<Production>> {
        let conn = self.get_conn()?;
        let production = conn
            .query_row(
                &format!(
                    "SELECT {} FROM production WHERE end_date IS NULL \
                     ORDER BY start_date DESC LIMIT 1",
                    Self::SELECT_COLUMNS
                ),
                [],
                Self::map_production,
            )
            .optional()?;
        Ok(production)
    }

    /// 查询最旧生产记录（start_date 最小，归档迁移的候选）
    pub fn find_oldest(&self) -> RepositoryResult<Option<Production>> {
        let conn = self.get_conn()?;
        let production = conn
            .query_row(
                &format!(
                    "SELECT {} FROM production ORDER BY start_date ASC LIMIT 1",
                    Self::SELECT_COLUMNS
                ),
                [],
                Self::map_production,
            )
            .optional()?;
        Ok(production)
    }

    /// 按 ID 查询生产记录
    pub fn find_by_id(&self, production_id: i64) -> RepositoryResult<Option<Production>> {
        let conn = self.get_conn()?;
        let production = conn
            .query_row(
                &format!(
                    "SELECT {} FROM production WHERE production_id = ?1",
                    Self::SELECT_COLUMNS
                ),
                params![production_id],
                Self::map_production,
            )
            .optional()?;
        Ok(production)
    }

    /// 活动表行数
    pub fn count_active(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM production", [], |row| row.get(0))?;
        Ok(count)
    }

    /// 进行中行数（不变量: 正常情况下至多为 1）
    pub fn count_open(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM production WHERE end_date IS NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // ==========================================
    // ID 分配
    // ==========================================

    /// 为指定日期分配下一个生产 ID（与订单 ID 独立计数）
    pub fn next_id_for_day(&self, day: NaiveDate) -> RepositoryResult<i64> {
        let (base, end) = ident::day_id_range(day);
        let conn = self.get_conn()?;
        let current_max: Option<i64> = conn.query_row(
            "SELECT MAX(production_id) FROM production WHERE production_id BETWEEN ?1 AND ?2",
            params![base, end],
            |row| row.get(0),
        )?;
        drop(conn);
        ident::next_daily_id(day, current_max)
    }

    // ==========================================
    // 归档操作
    // ==========================================

    /// 计算下一个归档序号（空表为 0，否则 max+1）
    pub fn next_backup_id(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let next: i64 = conn.query_row(
            "SELECT COALESCE(MAX(backup_id), -1) + 1 FROM production_history",
            [],
            |row| row.get(0),
        )?;
        Ok(next)
    }

    /// 插入归档副本
    pub fn insert_history(&self, history: &ProductionHistory) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            INSERT INTO production_history
                (backup_id, production_id, model_code, upper_quantity, lower_quantity,
                 good_quantity, bad_quantity, start_date, end_date, backed_date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                history.backup_id,
                history.production_id,
                history.model_code,
                history.upper_quantity,
                history.lower_quantity,
                history.good_quantity,
                history.bad_quantity,
                history.start_date.format(DATETIME_FORMAT).to_string(),
                history
                    .end_date
                    .map(|d| d.format(DATETIME_FORMAT).to_string()),
                history.backed_date.format(DATETIME_FORMAT).to_string(),
            ],
        )?;
        Ok(rows)
    }

    /// 归档表行数
    pub fn count_history(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM production_history", [], |row| {
            row.get(0)
        })?;
        Ok(count)
    }

    /// 按生产 ID 查询归档记录
    pub fn find_history_by_production_id(
        &self,
        production_id: i64,
    ) -> RepositoryResult<Vec<ProductionHistory>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT backup_id, production_id, model_code, upper_quantity, lower_quantity,
                   good_quantity, bad_quantity, start_date, end_date, backed_date
            FROM production_history
            WHERE production_id = ?1
            ORDER BY backup_id ASC
            "#,
        )?;
        let rows = stmt
            .query_map(params![production_id], |row| {
                Ok(ProductionHistory {
                    backup_id: row.get(0)?,
                    production_id: row.get(1)?,
                    model_code: row.get(2)?,
                    upper_quantity: row.get(3)?,
                    lower_quantity: row.get(4)?,
                    good_quantity: row.get(5)?,
                    bad_quantity: row.get(6)?,
                    start_date: row.get(7)?,
                    end_date: row.get(8)?,
                    backed_date: row.get(9)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn setup_test_db() -> Arc<Mutex<Connection>> {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::ensure_ledger_schema(&conn).unwrap();
        Arc::new(Mutex::new(conn))
    }

    fn make_production(production_id: i64, start: &str, end: Option<&str>) -> Production {
        Production {
            production_id,
            model_code: "KIA_SORENTO".to_string(),
            upper_quantity: 8,
            lower_quantity: 8,
            good_quantity: 0,
            bad_quantity: 0,
            start_date: NaiveDateTime::parse_from_str(start, "%Y-%m-%d %H:%M:%S").unwrap(),
            end_date: end
                .map(|e| NaiveDateTime::parse_from_str(e, "%Y-%m-%d %H:%M:%S").unwrap()),
        }
    }

    #[test]
    fn test_find_open_picks_latest_open_row() {
        let repo = ProductionRepository::new(setup_test_db());

        repo.insert(&make_production(
            1250101001,
            "2025-01-01 08:00:00",
            Some("2025-01-01 12:00:00"),
        ))
        .unwrap();
        repo.insert(&make_production(1250101002, "2025-01-01 13:00:00", None))
            .unwrap();

        let open = repo.find_open().unwrap().unwrap();
        assert_eq!(open.production_id, 1250101002);
        assert!(open.is_open());
    }

    #[test]
    fn test_find_open_none_when_all_closed() {
        let repo = ProductionRepository::new(setup_test_db());
        repo.insert(&make_production(
            1250101001,
            "2025-01-01 08:00:00",
            Some("2025-01-01 12:00:00"),
        ))
        .unwrap();
        assert!(repo.find_open().unwrap().is_none());
    }

    #[test]
    fn test_set_end_date_closes_row() {
        let repo = ProductionRepository::new(setup_test_db());
        repo.insert(&make_production(1250101001, "2025-01-01 08:00:00", None))
            .unwrap();
        assert_eq!(repo.count_open().unwrap(), 1);

        let end = NaiveDateTime::parse_from_str("2025-01-01 16:30:00", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        let rows = repo.set_end_date(1250101001, end).unwrap();
        assert_eq!(rows, 1);
        assert_eq!(repo.count_open().unwrap(), 0);

        let production = repo.find_by_id(1250101001).unwrap().unwrap();
        assert_eq!(production.end_date, Some(end));
    }

    #[test]
    fn test_counters_increment_at_sql_level() {
        let repo = ProductionRepository::new(setup_test_db());
        repo.insert(&make_production(1250101001, "2025-01-01 08:00:00", None))
            .unwrap();

        repo.increment_good(1250101001).unwrap();
        repo.increment_good(1250101001).unwrap();
        repo.increment_bad(1250101001).unwrap();

        let production = repo.find_by_id(1250101001).unwrap().unwrap();
        assert_eq!(production.good_quantity, 2);
        assert_eq!(production.bad_quantity, 1);
    }

    #[test]
    fn test_next_id_for_day_independent_of_orders() {
        let repo = ProductionRepository::new(setup_test_db());
        let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        assert_eq!(repo.next_id_for_day(day).unwrap(), 1250101001);

        repo.insert(&make_production(1250101001, "2025-01-01 08:00:00", None))
            .unwrap();
        assert_eq!(repo.next_id_for_day(day).unwrap(), 1250101002);
    }

    #[test]
    fn test_next_id_capacity_exhausted() {
        let repo = ProductionRepository::new(setup_test_db());
        let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        repo.insert(&make_production(1250101999, "2025-01-01 08:00:00", None))
            .unwrap();

        match repo.next_id_for_day(day) {
            Err(RepositoryError::DailySequenceExhausted { .. }) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_history_preserves_null_end_date() {
        let repo = ProductionRepository::new(setup_test_db());
        assert_eq!(repo.next_backup_id().unwrap(), 0);

        let production = make_production(1250101001, "2025-01-01 08:00:00", None);
        let backed = NaiveDateTime::parse_from_str("2025-02-01 00:00:00", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        repo.insert_history(&production.to_history(0, backed)).unwrap();

        assert_eq!(repo.next_backup_id().unwrap(), 1);
        let history = repo.find_history_by_production_id(1250101001).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].end_date, None);
        assert_eq!(history[0].backed_date, backed);
    }
}
