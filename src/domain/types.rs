// ==========================================
// 装配产线 MES 服务 - 领域类型定义
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 订单状态 (Order Status)
// ==========================================
// 业务操作始终针对“最新订单”（order_date 最大的一行）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Waiting,    // 待产
    Processing, // 生产中
    Completed,  // 已完成
    Paused,     // 暂停
    Cancelled,  // 已取消
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl OrderStatus {
    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            OrderStatus::Waiting => "WAITING",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Paused => "PAUSED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// 从字符串解析状态
    ///
    /// 未知值回退为 WAITING
    pub fn from_db_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "WAITING" => OrderStatus::Waiting,
            "PROCESSING" => OrderStatus::Processing,
            "COMPLETED" => OrderStatus::Completed,
            "PAUSED" => OrderStatus::Paused,
            "CANCELLED" => OrderStatus::Cancelled,
            _ => OrderStatus::Waiting,
        }
    }

    /// 是否为终态（触发生产收尾）
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// 是否为“产线活动中”状态（异常复位时强制取消的判定范围）
    pub fn is_active(&self) -> bool {
        matches!(self, OrderStatus::Processing | OrderStatus::Paused)
    }
}

// ==========================================
// 车型代码 (Model Code)
// ==========================================
// 产线当前仅支持固定的小型车型集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModelCode {
    KiaCarnival,
    KiaSorento,
    KiaSportage,
}

impl fmt::Display for ModelCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

impl ModelCode {
    /// 转换为数据库/设备侧使用的代码
    pub fn as_code(&self) -> &'static str {
        match self {
            ModelCode::KiaCarnival => "KIA_CARNIVAL",
            ModelCode::KiaSorento => "KIA_SORENTO",
            ModelCode::KiaSportage => "KIA_SPORTAGE",
        }
    }

    /// 从代码解析车型
    ///
    /// 不在支持集合内的代码返回 None（订单接入时拒绝）
    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "KIA_CARNIVAL" => Some(ModelCode::KiaCarnival),
            "KIA_SORENTO" => Some(ModelCode::KiaSorento),
            "KIA_SPORTAGE" => Some(ModelCode::KiaSportage),
            _ => None,
        }
    }
}

// ==========================================
// 视觉检测工位 (Vision Unit)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisionUnit {
    Upper, // 上部工位
    Lower, // 下部工位
}

impl fmt::Display for VisionUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl VisionUnit {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            VisionUnit::Upper => "UPPER",
            VisionUnit::Lower => "LOWER",
        }
    }
}

// ==========================================
// 视觉检测结果 (Vision Result)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisionResult {
    Ok, // 合格
    Ng, // 不合格
}

impl fmt::Display for VisionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl VisionResult {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            VisionResult::Ok => "OK",
            VisionResult::Ng => "NG",
        }
    }
}
