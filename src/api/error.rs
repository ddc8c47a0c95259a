// ==========================================
// 装配产线 MES 服务 - API 层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换仓储/PLC错误为用户友好的错误消息
// ==========================================

use crate::i18n;
use crate::plc::error::PlcError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API 层错误类型
///
/// 订单接入的拒绝必须携带用户可读的原因；
/// 其余错误属于运维可见（仅日志），不暴露给用户界面。
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 接入拒绝（用户可读）
    // ==========================================
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    LineBusy(String),

    #[error("{0}")]
    DeviceUnavailable(String),

    #[error("{0}")]
    CapacityExhausted(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// 目的: 将仓储层的技术错误转换为用户/运维可读的业务错误
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DailySequenceExhausted { .. } => {
                ApiError::CapacityExhausted(i18n::t("order.daily_capacity_exceeded"))
            }
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::DatabaseError(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 PlcError 转换
// ==========================================
impl From<PlcError> for ApiError {
    fn from(_err: PlcError) -> Self {
        ApiError::DeviceUnavailable(i18n::t("order.device_unreachable"))
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
