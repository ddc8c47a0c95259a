// ==========================================
// 装配产线 MES 服务 - PLC 层
// ==========================================
// 职责: 设备点位读写的会话管理（断线快速失败 + 按需重连）
// 约束: 底层链路一次只允许一个在途操作，所有访问串行化
// ==========================================

pub mod client;
pub mod error;
pub mod memory;
pub mod session;

// 重导出核心类型
pub use client::PlcClient;
pub use error::{PlcError, PlcResult};
pub use memory::{MemoryBus, MemoryTransport};
pub use session::{PlcSession, PlcTransport};
