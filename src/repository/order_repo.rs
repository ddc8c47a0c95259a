// ==========================================
// OrderRepository - 订单仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// 说明: “最新订单”以 order_date 最大的一行为准，
//       通过显式查询暴露，不依赖隐式游标。
// ==========================================

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

use crate::domain::order::{Order, OrderHistory};
use crate::domain::types::OrderStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{ident, DATETIME_FORMAT};

pub struct OrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OrderRepository {
    /// 创建新的订单仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_order(row: &Row<'_>) -> rusqlite::Result<Order> {
        let status: String = row.get(4)?;
        Ok(Order {
            order_id: row.get(0)?,
            model_code: row.get(1)?,
            order_quantity: row.get(2)?,
            order_date: row.get(3)?,
            order_status: OrderStatus::from_db_str(&status),
        })
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入订单
    ///
    /// # 返回
    /// - `Ok(rows)`: 受影响行数（预期为 1，由调用方校验告警）
    pub fn insert(&self, order: &Order) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            INSERT INTO "order" (order_id, model_code, order_quantity, order_date, order_status)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                order.order_id,
                order.model_code,
                order.order_quantity,
                order.order_date.format(DATETIME_FORMAT).to_string(),
                order.order_status.to_db_str(),
            ],
        )?;
        Ok(rows)
    }

    /// 按 ID 更新订单状态
    pub fn update_status(&self, order_id: i64, status: OrderStatus) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"UPDATE "order" SET order_status = ?1 WHERE order_id = ?2"#,
            params![status.to_db_str(), order_id],
        )?;
        Ok(rows)
    }

    /// 将所有仍处于 WAITING 的订单置为 CANCELLED（新订单接入时取代旧待产单）
    ///
    /// # 返回
    /// - `Ok(rows)`: 被取代的订单数
    pub fn cancel_waiting(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"UPDATE "order" SET order_status = 'CANCELLED' WHERE order_status = 'WAITING'"#,
            [],
        )?;
        Ok(rows)
    }

    /// 删除订单（归档迁移的删除步骤）
    pub fn delete(&self, order_id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(r#"DELETE FROM "order" WHERE order_id = ?1"#, params![order_id])?;
        Ok(rows)
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 查询最新订单（order_date 最大的一行）
    pub fn find_latest(&self) -> RepositoryResult<Option<Order>> {
        let conn = self.get_conn()?;
        let order = conn
            .query_row(
                r#"
                SELECT order_id, model_code, order_quantity, order_date, order_status
                FROM "order"
                ORDER BY order_date DESC
                LIMIT 1
                "#,
                [],
                Self::map_order,
            )
            .optional()?;
        Ok(order)
    }

    /// 查询最旧订单（order_date 最小的一行，归档迁移的候选）
    pub fn find_oldest(&self) -> RepositoryResult<Option<Order>> {
        let conn = self.get_conn()?;
        let order = conn
            .query_row(
                r#"
                SELECT order_id, model_code, order_quantity, order_date, order_status
                FROM "order"
                ORDER BY order_date ASC
                LIMIT 1
                "#,
                [],
                Self::map_order,
            )
            .optional()?;
        Ok(order)
    }

    /// 按 ID 查询订单
    pub fn find_by_id(&self, order_id: i64) -> RepositoryResult<Option<Order>> {
        let conn = self.get_conn()?;
        let order = conn
            .query_row(
                r#"
                SELECT order_id, model_code, order_quantity, order_date, order_status
                FROM "order"
                WHERE order_id = ?1
                "#,
                params![order_id],
                Self::map_order,
            )
            .optional()?;
        Ok(order)
    }

    /// 活动表行数
    pub fn count_active(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(r#"SELECT COUNT(*) FROM "order""#, [], |row| row.get(0))?;
        Ok(count)
    }

    // ==========================================
    // ID 分配
    // ==========================================

    /// 为指定日期分配下一个订单 ID
    ///
    /// 序号当日内严格递增；超过 999 返回 DailySequenceExhausted。
    pub fn next_id_for_day(&self, day: NaiveDate) -> RepositoryResult<i64> {
        let (base, end) = ident::day_id_range(day);
        let conn = self.get_conn()?;
        let current_max: Option<i64> = conn.query_row(
            r#"SELECT MAX(order_id) FROM "order" WHERE order_id BETWEEN ?1 AND ?2"#,
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
            "SELECT COALESCE(MAX(backup_id), -1) + 1 FROM order_history",
            [],
            |row| row.get(0),
        )?;
        Ok(next)
    }

    /// 插入归档副本
    pub fn insert_history(&self, history: &OrderHistory) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            INSERT INTO order_history
                (backup_id, order_id, model_code, order_quantity, order_date, order_status, backed_date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                history.backup_id,
                history.order_id,
                history.model_code,
                history.order_quantity,
                history.order_date.format(DATETIME_FORMAT).to_string(),
                history.order_status.to_db_str(),
                history.backed_date.format(DATETIME_FORMAT).to_string(),
            ],
        )?;
        Ok(rows)
    }

    /// 归档表行数
    pub fn count_history(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM order_history", [], |row| row.get(0))?;
        Ok(count)
    }

    /// 按订单 ID 查询归档记录
    pub fn find_history_by_order_id(&self, order_id: i64) -> RepositoryResult<Vec<OrderHistory>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT backup_id, order_id, model_code, order_quantity, order_date, order_status, backed_date
            FROM order_history
            WHERE order_id = ?1
            ORDER BY backup_id ASC
            "#,
        )?;
        let rows = stmt
            .query_map(params![order_id], |row| {
                let status: String = row.get(5)?;
                Ok(OrderHistory {
                    backup_id: row.get(0)?,
                    order_id: row.get(1)?,
                    model_code: row.get(2)?,
                    order_quantity: row.get(3)?,
                    order_date: row.get(4)?,
                    order_status: OrderStatus::from_db_str(&status),
                    backed_date: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
