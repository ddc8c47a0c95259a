// ==========================================
// 装配产线 MES 服务 - PLC 层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// PLC 层错误类型
///
/// 读写失败会把会话标记为断开；之后的设备调用快速失败，
/// 直到下一次 ensure_connected 成功为止。
#[derive(Error, Debug)]
pub enum PlcError {
    #[error("PLC 未连接")]
    NotConnected,

    #[error("PLC 点位读取失败: device={device}, code={code}")]
    ReadFailed { device: String, code: i32 },

    #[error("PLC 点位写入失败: device={device}, value={value}, code={code}")]
    WriteFailed { device: String, value: i32, code: i32 },

    #[error("PLC 会话锁获取失败: {0}")]
    LockError(String),
}

/// Result 类型别名
pub type PlcResult<T> = Result<T, PlcError>;
