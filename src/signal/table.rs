// ==========================================
// PlcSignal - 控制信号表
// ==========================================
// 固定的小型映射表：点位地址 ↔ 领域信号，编译期封闭（穷尽 match），
// 不提供运行时配置。扫描顺序即 SCAN_LIST 的点位顺序。
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, info, warn};

// ==========================================
// PlcSignal - 领域信号
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlcSignal {
    ProductionStart,       // M120 生产启动
    FrontEndCompleted,     // M121 前段工序完成
    Paused,                // M122 暂停
    Resumed,               // M123 恢复
    CancelRequested,       // M124 取消请求
    EmergencyStop,         // M125 紧急停止
    EmergencyStopReleased, // M126 紧急停止解除
    UpperVisionOk,         // M127 上部视觉 OK
    UpperVisionNg,         // M128 上部视觉 NG
    LowerVisionOk,         // M129 下部视觉 OK
    LowerVisionNg,         // M130 下部视觉 NG
    AbnormalLineReset,     // M131 产线异常复位
    UpperProcessCompleted, // M132 上部工序完成
    UpperProcessNg,        // M133 上部工序 NG
    LowerProcessCompleted, // M134 下部工序完成
    LowerProcessNg,        // M135 下部工序 NG
    AutoMode,              // M140 自动模式
    ManualMode,            // M141 手动模式
}

impl fmt::Display for PlcSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl PlcSignal {
    /// 扫描列表（按点位顺序）
    pub const SCAN_LIST: [PlcSignal; 18] = [
        PlcSignal::ProductionStart,
        PlcSignal::FrontEndCompleted,
        PlcSignal::Paused,
        PlcSignal::Resumed,
        PlcSignal::CancelRequested,
        PlcSignal::EmergencyStop,
        PlcSignal::EmergencyStopReleased,
        PlcSignal::UpperVisionOk,
        PlcSignal::UpperVisionNg,
        PlcSignal::LowerVisionOk,
        PlcSignal::LowerVisionNg,
        PlcSignal::AbnormalLineReset,
        PlcSignal::UpperProcessCompleted,
        PlcSignal::UpperProcessNg,
        PlcSignal::LowerProcessCompleted,
        PlcSignal::LowerProcessNg,
        PlcSignal::AutoMode,
        PlcSignal::ManualMode,
    ];

    /// 信号绑定的点位地址
    pub fn point(self) -> &'static str {
        match self {
            PlcSignal::ProductionStart => "M120",
            PlcSignal::FrontEndCompleted => "M121",
            PlcSignal::Paused => "M122",
            PlcSignal::Resumed => "M123",
            PlcSignal::CancelRequested => "M124",
            PlcSignal::EmergencyStop => "M125",
            PlcSignal::EmergencyStopReleased => "M126",
            PlcSignal::UpperVisionOk => "M127",
            PlcSignal::UpperVisionNg => "M128",
            PlcSignal::LowerVisionOk => "M129",
            PlcSignal::LowerVisionNg => "M130",
            PlcSignal::AbnormalLineReset => "M131",
            PlcSignal::UpperProcessCompleted => "M132",
            PlcSignal::UpperProcessNg => "M133",
            PlcSignal::LowerProcessCompleted => "M134",
            PlcSignal::LowerProcessNg => "M135",
            PlcSignal::AutoMode => "M140",
            PlcSignal::ManualMode => "M141",
        }
    }

    /// 从点位地址解析信号
    pub fn from_point(point: &str) -> Option<Self> {
        Self::SCAN_LIST.iter().copied().find(|s| s.point() == point)
    }

    /// 输出该信号的固定变迁日志（每次触发恰好一条）
    pub fn log_transition(self) {
        match self {
            PlcSignal::ProductionStart => info!("[M120] 生产线已开始运行。"),
            PlcSignal::FrontEndCompleted => info!("[M121] 前段工序(Front-End)作业已完成。"),
            PlcSignal::Paused => warn!("[M122] 产线处于暂停状态，请确认现场设备。"),
            PlcSignal::Resumed => info!("[M123] 产线已从暂停状态恢复生产。"),
            PlcSignal::CancelRequested => {
                warn!("[M124] 收到作业取消请求，当前工序即将中断。")
            }
            PlcSignal::EmergencyStop => {
                error!("[M125] 检测到紧急停止(EMG)，请立即停止所有设备。")
            }
            PlcSignal::EmergencyStopReleased => info!("[M126] 紧急停止(EMG)状态已解除。"),
            PlcSignal::UpperVisionOk => info!("[M127] 上部(Upper)视觉检测结果：合格(OK)"),
            PlcSignal::UpperVisionNg => warn!("[M128] 上部(Upper)视觉检测结果：不合格(NG)"),
            PlcSignal::LowerVisionOk => info!("[M129] 下部(Lower)视觉检测结果：合格(OK)"),
            PlcSignal::LowerVisionNg => warn!("[M130] 下部(Lower)视觉检测结果：不合格(NG)"),
            PlcSignal::AbnormalLineReset => {
                error!("[M131] 检测到产线运行中 PLC 异常复位或非正常停机。")
            }
            PlcSignal::UpperProcessCompleted => {
                info!("[M132] 上部(Upper)工序完成：良品进入下一工序。")
            }
            PlcSignal::UpperProcessNg => {
                warn!("[M133] 上部(Upper)工序 NG：不良品已排出至剔除输送带。")
            }
            PlcSignal::LowerProcessCompleted => {
                info!("[M134] 下部(Lower)工序完成：良品进入下一工序。")
            }
            PlcSignal::LowerProcessNg => {
                warn!("[M135] 下部(Lower)工序 NG：不良品已排出至剔除输送带。")
            }
            PlcSignal::AutoMode => info!("[M140] 设备运行模式已切换为 [AUTO]。"),
            PlcSignal::ManualMode => info!("[M141] 设备运行模式已切换为 [MANUAL]。"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_list_is_in_point_order() {
        let points: Vec<&str> = PlcSignal::SCAN_LIST.iter().map(|s| s.point()).collect();
        assert_eq!(
            points,
            vec![
                "M120", "M121", "M122", "M123", "M124", "M125", "M126", "M127", "M128", "M129",
                "M130", "M131", "M132", "M133", "M134", "M135", "M140", "M141",
            ]
        );
    }

    #[test]
    fn test_point_round_trip() {
        for signal in PlcSignal::SCAN_LIST {
            assert_eq!(PlcSignal::from_point(signal.point()), Some(signal));
        }
        assert_eq!(PlcSignal::from_point("M999"), None);
    }
}
