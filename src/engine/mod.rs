// ==========================================
// 装配产线 MES 服务 - 引擎层
// ==========================================
// 职责: 订单/生产台账的业务规则（状态变迁、计数、保留归档）
// 红线: 引擎只通过仓储接口访问数据，不拼 SQL
// ==========================================

pub mod order_service;
pub mod production_service;

// 重导出核心引擎
pub use order_service::OrderService;
pub use production_service::ProductionService;

/// 活动台账保留上限（订单/生产各自独立计算）
///
/// 超出部分按创建时间从旧到新迁入归档表。
pub const ACTIVE_ROW_LIMIT: i64 = 30;
