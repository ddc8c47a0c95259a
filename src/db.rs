// ==========================================
// 装配产线 MES 服务 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 统一台账建表入口，避免各模块各自建表
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 创建台账表结构（若不存在）
///
/// 表:
/// - `order` / `order_history`: 订单与订单归档
/// - `production` / `production_history`: 生产与生产归档
/// - `vision_judgement`: 视觉判定流水（仅追加）
pub fn ensure_ledger_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS "order" (
            order_id        INTEGER PRIMARY KEY,
            model_code      TEXT    NOT NULL,
            order_quantity  INTEGER NOT NULL,
            order_date      TEXT    NOT NULL,
            order_status    TEXT    NOT NULL
        );

        CREATE TABLE IF NOT EXISTS order_history (
            backup_id       INTEGER PRIMARY KEY,
            order_id        INTEGER NOT NULL,
            model_code      TEXT    NOT NULL,
            order_quantity  INTEGER NOT NULL,
            order_date      TEXT    NOT NULL,
            order_status    TEXT    NOT NULL,
            backed_date     TEXT    NOT NULL
        );

        CREATE TABLE IF NOT EXISTS production (
            production_id   INTEGER PRIMARY KEY,
            model_code      TEXT    NOT NULL,
            upper_quantity  INTEGER NOT NULL,
            lower_quantity  INTEGER NOT NULL,
            good_quantity   INTEGER NOT NULL,
            bad_quantity    INTEGER NOT NULL,
            start_date      TEXT    NOT NULL,
            end_date        TEXT
        );

        CREATE TABLE IF NOT EXISTS production_history (
            backup_id       INTEGER PRIMARY KEY,
            production_id   INTEGER NOT NULL,
            model_code      TEXT    NOT NULL,
            upper_quantity  INTEGER NOT NULL,
            lower_quantity  INTEGER NOT NULL,
            good_quantity   INTEGER NOT NULL,
            bad_quantity    INTEGER NOT NULL,
            start_date      TEXT    NOT NULL,
            end_date        TEXT,
            backed_date     TEXT    NOT NULL
        );

        CREATE TABLE IF NOT EXISTS vision_judgement (
            seq             INTEGER PRIMARY KEY AUTOINCREMENT,
            unit            TEXT    NOT NULL,
            result          TEXT    NOT NULL,
            judged_date     TEXT    NOT NULL
        );

        -- 台账按时间取最新/最旧是高频查询，建立覆盖索引
        CREATE INDEX IF NOT EXISTS idx_order_date ON "order"(order_date);
        CREATE INDEX IF NOT EXISTS idx_production_start_date ON production(start_date);
        CREATE INDEX IF NOT EXISTS idx_production_open ON production(end_date, start_date);
        "#,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_ledger_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        ensure_ledger_schema(&conn).unwrap();
        // 再执行一次不应报错
        ensure_ledger_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN \
                 ('order','order_history','production','production_history','vision_judgement')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 5);
    }
}
