// ==========================================
// 装配产线 MES 服务 - 订单领域模型
// ==========================================
// 对齐: db::ensure_ledger_schema 的 "order" / order_history 表
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::OrderStatus;

// ==========================================
// Order - 订单
// ==========================================
// 订单ID格式: 1YYMMDDNNN（首位恒为 1，YYMMDD 为下单日期，NNN 为当日序号 001-999）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: i64,                // 订单ID
    pub model_code: String,           // 车型代码
    pub order_quantity: i32,          // 订单数量
    pub order_date: NaiveDateTime,    // 下单时间
    pub order_status: OrderStatus,    // 订单状态
}

// ==========================================
// OrderHistory - 订单归档
// ==========================================
// 活动表超过保留上限后，最旧的订单原样迁入归档表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderHistory {
    pub backup_id: i64,               // 归档序号（从 0 单调递增，与订单ID无关）
    pub order_id: i64,
    pub model_code: String,
    pub order_quantity: i32,
    pub order_date: NaiveDateTime,
    pub order_status: OrderStatus,
    pub backed_date: NaiveDateTime,   // 归档时间
}

impl Order {
    /// 生成归档副本
    pub fn to_history(&self, backup_id: i64, backed_date: NaiveDateTime) -> OrderHistory {
        OrderHistory {
            backup_id,
            order_id: self.order_id,
            model_code: self.model_code.clone(),
            order_quantity: self.order_quantity,
            order_date: self.order_date,
            order_status: self.order_status,
            backed_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_history_copies_row_verbatim() {
        let order = Order {
            order_id: 1250101001,
            model_code: "KIA_CARNIVAL".to_string(),
            order_quantity: 5,
            order_date: NaiveDateTime::parse_from_str("2025-01-01 08:00:00", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
            order_status: OrderStatus::Completed,
        };
        let backed = NaiveDateTime::parse_from_str("2025-02-01 09:30:00", "%Y-%m-%d %H:%M:%S")
            .unwrap();

        let history = order.to_history(0, backed);
        assert_eq!(history.backup_id, 0);
        assert_eq!(history.order_id, order.order_id);
        assert_eq!(history.model_code, order.model_code);
        assert_eq!(history.order_quantity, order.order_quantity);
        assert_eq!(history.order_date, order.order_date);
        assert_eq!(history.order_status, order.order_status);
        assert_eq!(history.backed_date, backed);
    }
}
