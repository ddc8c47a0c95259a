// ==========================================
// OrderService - 订单状态引擎
// ==========================================
// 职责: 将信号事件落到“最新订单”上，并维护订单保留归档
// 说明: 订单终态（COMPLETED/CANCELLED）联动生产收尾；
//       联动失败只记录日志，不影响订单主更新。
// ==========================================

use std::sync::Arc;

use chrono::Local;
use tracing::{error, info, warn};

use crate::domain::types::OrderStatus;
use crate::engine::production_service::ProductionService;
use crate::engine::ACTIVE_ROW_LIMIT;
use crate::repository::error::RepositoryResult;
use crate::repository::order_repo::OrderRepository;

pub struct OrderService {
    order_repo: Arc<OrderRepository>,
    production_service: Arc<ProductionService>,
}

impl OrderService {
    /// 创建新的订单状态引擎
    pub fn new(order_repo: Arc<OrderRepository>, production_service: Arc<ProductionService>) -> Self {
        Self {
            order_repo,
            production_service,
        }
    }

    // ==========================================
    // 状态变迁
    // ==========================================

    /// 将最新订单更新为指定状态
    ///
    /// - 无订单数据: 记录告警后返回（不是错误）
    /// - 新状态为终态: 联动生产收尾，联动失败仅记录日志
    pub fn update_latest_status(&self, new_status: OrderStatus) -> RepositoryResult<()> {
        let Some(latest) = self.order_repo.find_latest()? else {
            warn!(
                "试图将订单状态更新为 {}，但 order 表中没有数据。",
                new_status
            );
            return Ok(());
        };

        let rows = self.order_repo.update_status(latest.order_id, new_status)?;
        if rows != 1 {
            warn!(
                "订单状态更新影响行数不是 1。rows={}, order_id={}, status={}",
                rows, latest.order_id, new_status
            );
            return Ok(());
        }

        if new_status.is_terminal() {
            if let Err(e) = self.production_service.close_current_production() {
                error!(
                    "订单状态 {} 触发的生产收尾失败: {}",
                    new_status, e
                );
            }
        }

        Ok(())
    }

    /// 最新订单处于活动状态（PROCESSING/PAUSED）时强制取消
    ///
    /// 用于产线异常复位：非活动状态的订单保持原样。
    pub fn cancel_latest_if_active(&self) -> RepositoryResult<()> {
        let Some(latest) = self.order_repo.find_latest()? else {
            warn!("[M131] order 表中没有最新订单数据。");
            return Ok(());
        };

        if !latest.order_status.is_active() {
            return Ok(());
        }

        let rows = self
            .order_repo
            .update_status(latest.order_id, OrderStatus::Cancelled)?;
        if rows != 1 {
            warn!(
                "[M131] 最新订单改为 CANCELLED 时影响行数不是 1。rows={}, order_id={}",
                rows, latest.order_id
            );
            return Ok(());
        }

        info!(
            "[M131] 最新订单已强制取消。order_id={}, previous_status={}",
            latest.order_id, latest.order_status
        );

        if let Err(e) = self.production_service.close_current_production() {
            error!("[M131] 订单取消后的生产收尾失败: {}", e);
        }

        Ok(())
    }

    // ==========================================
    // 保留归档
    // ==========================================

    /// 订单保留: 活动表只保留最新 30 行，超出部分迁入 order_history
    ///
    /// 逐行迁移，单步失败记录日志后继续处理剩余行（尽力而为，非原子批量）。
    pub fn enforce_retention(&self) -> RepositoryResult<()> {
        let total = self.order_repo.count_active()?;
        if total <= ACTIVE_ROW_LIMIT {
            return Ok(());
        }

        let to_archive = total - ACTIVE_ROW_LIMIT;
        for _ in 0..to_archive {
            match self.archive_oldest() {
                Ok(true) => {}
                Ok(false) => return Ok(()),
                Err(e) => warn!("订单归档迁移单步失败（继续处理剩余行）: {}", e),
            }
        }
        Ok(())
    }

    /// 迁移最旧的一行订单到归档表
    ///
    /// # 返回
    /// - `Ok(true)`: 迁移了一行
    /// - `Ok(false)`: 活动表已空
    fn archive_oldest(&self) -> RepositoryResult<bool> {
        let Some(oldest) = self.order_repo.find_oldest()? else {
            return Ok(false);
        };

        let backup_id = self.order_repo.next_backup_id()?;
        let history = oldest.to_history(backup_id, Local::now().naive_local());

        let rows = self.order_repo.insert_history(&history)?;
        if rows != 1 {
            warn!(
                "order_history 插入影响行数不是 1。rows={}, order_id={}, backup_id={}",
                rows, oldest.order_id, backup_id
            );
        }

        let rows = self.order_repo.delete(oldest.order_id)?;
        if rows != 1 {
            warn!(
                "order 删除旧记录影响行数不是 1。rows={}, order_id={}",
                rows, oldest.order_id
            );
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::Order;
    use crate::repository::production_repo::ProductionRepository;
    use crate::repository::vision_repo::VisionJudgementRepository;
    use chrono::NaiveDateTime;
    use rusqlite::Connection;
    use std::sync::Mutex;

    fn setup() -> (OrderService, Arc<OrderRepository>, Arc<ProductionRepository>) {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::ensure_ledger_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));

        let order_repo = Arc::new(OrderRepository::new(conn.clone()));
        let production_repo = Arc::new(ProductionRepository::new(conn.clone()));
        let vision_repo = Arc::new(VisionJudgementRepository::new(conn));
        let production_service = Arc::new(ProductionService::new(
            order_repo.clone(),
            production_repo.clone(),
            vision_repo,
        ));
        let service = OrderService::new(order_repo.clone(), production_service);
        (service, order_repo, production_repo)
    }

    fn seed(repo: &OrderRepository, order_id: i64, date: &str, status: OrderStatus) {
        let order = Order {
            order_id,
            model_code: "KIA_CARNIVAL".to_string(),
            order_quantity: 5,
            order_date: NaiveDateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S").unwrap(),
            order_status: status,
        };
        assert_eq!(repo.insert(&order).unwrap(), 1);
    }

    #[test]
    fn test_update_latest_status_empty_table_is_noop() {
        let (service, order_repo, _) = setup();
        // 空表: 告警后正常返回，不是错误
        service.update_latest_status(OrderStatus::Processing).unwrap();
        assert_eq!(order_repo.count_active().unwrap(), 0);
    }

    #[test]
    fn test_update_latest_status_targets_latest_row() {
        let (service, order_repo, _) = setup();
        seed(&order_repo, 1250101001, "2025-01-01 08:00:00", OrderStatus::Completed);
        seed(&order_repo, 1250101002, "2025-01-01 09:00:00", OrderStatus::Waiting);

        service.update_latest_status(OrderStatus::Processing).unwrap();

        // 只有最新订单被改动
        assert_eq!(
            order_repo.find_by_id(1250101002).unwrap().unwrap().order_status,
            OrderStatus::Processing
        );
        assert_eq!(
            order_repo.find_by_id(1250101001).unwrap().unwrap().order_status,
            OrderStatus::Completed
        );
    }

    #[test]
    fn test_terminal_status_closes_open_production() {
        let (service, order_repo, production_repo) = setup();
        seed(&order_repo, 1250101001, "2025-01-01 08:00:00", OrderStatus::Processing);

        let production = crate::domain::production::Production {
            production_id: 1250101001,
            model_code: "KIA_CARNIVAL".to_string(),
            upper_quantity: 5,
            lower_quantity: 5,
            good_quantity: 0,
            bad_quantity: 0,
            start_date: NaiveDateTime::parse_from_str(
                "2025-01-01 08:05:00",
                "%Y-%m-%d %H:%M:%S",
            )
            .unwrap(),
            end_date: None,
        };
        production_repo.insert(&production).unwrap();
        assert_eq!(production_repo.count_open().unwrap(), 1);

        service.update_latest_status(OrderStatus::Completed).unwrap();

        // 终态联动生产收尾
        assert_eq!(production_repo.count_open().unwrap(), 0);
    }

    #[test]
    fn test_non_terminal_status_keeps_production_open() {
        let (service, order_repo, production_repo) = setup();
        seed(&order_repo, 1250101001, "2025-01-01 08:00:00", OrderStatus::Processing);

        let production = crate::domain::production::Production {
            production_id: 1250101001,
            model_code: "KIA_CARNIVAL".to_string(),
            upper_quantity: 5,
            lower_quantity: 5,
            good_quantity: 0,
            bad_quantity: 0,
            start_date: NaiveDateTime::parse_from_str(
                "2025-01-01 08:05:00",
                "%Y-%m-%d %H:%M:%S",
            )
            .unwrap(),
            end_date: None,
        };
        production_repo.insert(&production).unwrap();

        service.update_latest_status(OrderStatus::Paused).unwrap();
        assert_eq!(production_repo.count_open().unwrap(), 1);
    }

    #[test]
    fn test_cancel_latest_if_active_empty_table_is_noop() {
        let (service, _, _) = setup();
        service.cancel_latest_if_active().unwrap();
    }

    #[test]
    fn test_cancel_latest_if_active_skips_waiting_order() {
        let (service, order_repo, _) = setup();
        seed(&order_repo, 1250101001, "2025-01-01 08:00:00", OrderStatus::Waiting);

        service.cancel_latest_if_active().unwrap();

        assert_eq!(
            order_repo.find_by_id(1250101001).unwrap().unwrap().order_status,
            OrderStatus::Waiting
        );
    }

    #[test]
    fn test_cancel_latest_if_active_cancels_paused_order() {
        let (service, order_repo, _) = setup();
        seed(&order_repo, 1250101001, "2025-01-01 08:00:00", OrderStatus::Paused);

        service.cancel_latest_if_active().unwrap();

        assert_eq!(
            order_repo.find_by_id(1250101001).unwrap().unwrap().order_status,
            OrderStatus::Cancelled
        );
    }
}
