// ==========================================
// 装配产线 MES 服务 - 核心库
// ==========================================
// 技术栈: Rust + Tokio + SQLite
// 系统定位: PLC 信号驱动的订单/生产台账服务
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 台账数据访问
pub mod repository;

// 引擎层 - 订单/生产业务规则
pub mod engine;

// 信号层 - PLC 信号扫描与分发
pub mod signal;

// PLC 层 - 设备会话与传输抽象
pub mod plc;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 订单接入接口
pub mod api;

// 应用层 - 进程装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ModelCode, OrderStatus, VisionResult, VisionUnit};

// 领域实体
pub use domain::{Order, OrderHistory, Production, ProductionHistory, VisionJudgement};

// 引擎
pub use engine::{OrderService, ProductionService, ACTIVE_ROW_LIMIT};

// 信号
pub use signal::{PlcSignal, SignalDispatcher, SignalScanner};

// PLC
pub use plc::{MemoryBus, MemoryTransport, PlcClient, PlcError, PlcSession, PlcTransport};

// API
pub use api::OrderApi;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "装配产线 MES 服务";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
