// ==========================================
// 装配产线 MES 服务 - 数据仓储层
// ==========================================
// 职责: 提供台账数据访问接口,屏蔽数据库细节
// 红线: Repository 不含业务逻辑（保留/归档循环在引擎层）
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod ident;
pub mod order_repo;
pub mod production_repo;
pub mod vision_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use order_repo::OrderRepository;
pub use production_repo::ProductionRepository;
pub use vision_repo::VisionJudgementRepository;

/// 台账统一时间戳格式
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
