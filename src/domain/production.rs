// ==========================================
// 装配产线 MES 服务 - 生产领域模型
// ==========================================
// 对齐: db::ensure_ledger_schema 的 production / production_history /
//       vision_judgement 表
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{VisionResult, VisionUnit};

// ==========================================
// Production - 生产记录
// ==========================================
// end_date 为 NULL 表示“进行中”；任一时刻至多一行处于进行中，
// 该行即为计数与收尾操作的隐式目标（当前生产）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Production {
    pub production_id: i64,               // 生产ID（与订单ID同构，当日独立计数）
    pub model_code: String,               // 车型代码
    pub upper_quantity: i32,              // 上部指示数量（创建时取订单数量）
    pub lower_quantity: i32,              // 下部指示数量（创建时取订单数量）
    pub good_quantity: i32,               // 良品计数（只增）
    pub bad_quantity: i32,                // 不良计数（只增）
    pub start_date: NaiveDateTime,        // 开始时间
    pub end_date: Option<NaiveDateTime>,  // 结束时间（NULL = 进行中）
}

impl Production {
    /// 是否进行中
    pub fn is_open(&self) -> bool {
        self.end_date.is_none()
    }

    /// 生成归档副本
    pub fn to_history(&self, backup_id: i64, backed_date: NaiveDateTime) -> ProductionHistory {
        ProductionHistory {
            backup_id,
            production_id: self.production_id,
            model_code: self.model_code.clone(),
            upper_quantity: self.upper_quantity,
            lower_quantity: self.lower_quantity,
            good_quantity: self.good_quantity,
            bad_quantity: self.bad_quantity,
            start_date: self.start_date,
            end_date: self.end_date,
            backed_date,
        }
    }
}

// ==========================================
// ProductionHistory - 生产归档
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionHistory {
    pub backup_id: i64,                   // 归档序号（从 0 单调递增）
    pub production_id: i64,
    pub model_code: String,
    pub upper_quantity: i32,
    pub lower_quantity: i32,
    pub good_quantity: i32,
    pub bad_quantity: i32,
    pub start_date: NaiveDateTime,
    pub end_date: Option<NaiveDateTime>,  // 进行中被归档时保持 NULL
    pub backed_date: NaiveDateTime,
}

// ==========================================
// VisionJudgement - 视觉判定流水
// ==========================================
// 仅追加，不参与订单/生产状态变迁
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionJudgement {
    pub seq: i64,                         // 自增序号
    pub unit: VisionUnit,                 // 工位（上部/下部）
    pub result: VisionResult,             // 判定结果（OK/NG）
    pub judged_date: NaiveDateTime,       // 判定时间
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_production(end_date: Option<NaiveDateTime>) -> Production {
        Production {
            production_id: 1250101001,
            model_code: "KIA_SPORTAGE".to_string(),
            upper_quantity: 10,
            lower_quantity: 10,
            good_quantity: 3,
            bad_quantity: 1,
            start_date: NaiveDateTime::parse_from_str("2025-01-01 08:00:00", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
            end_date,
        }
    }

    #[test]
    fn test_is_open() {
        assert!(sample_production(None).is_open());
        let closed = sample_production(Some(
            NaiveDateTime::parse_from_str("2025-01-01 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap(),
        ));
        assert!(!closed.is_open());
    }

    #[test]
    fn test_to_history_preserves_open_end_date() {
        let production = sample_production(None);
        let backed = NaiveDateTime::parse_from_str("2025-02-01 09:30:00", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        let history = production.to_history(7, backed);
        assert_eq!(history.backup_id, 7);
        assert_eq!(history.end_date, None);
        assert_eq!(history.good_quantity, 3);
        assert_eq!(history.bad_quantity, 1);
    }
}
