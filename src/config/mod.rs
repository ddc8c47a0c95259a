// ==========================================
// 装配产线 MES 服务 - 配置层
// ==========================================
// 职责: 进程级运行配置（数据库路径/PLC 站号/扫描周期/信号行为开关）
// 来源: 环境变量覆盖 + 默认值
// ==========================================

use serde::{Deserialize, Serialize};

/// 扫描周期默认值（毫秒）
pub const DEFAULT_TICK_PERIOD_MS: u64 = 1_000;

/// PLC 逻辑站号默认值
pub const DEFAULT_STATION_NUMBER: i32 = 1;

// ==========================================
// SignalBehavior - 信号处理行为开关
// ==========================================
// 视觉判定落库与工序计数在不同产线版本中取舍不同，
// 作为两个互相独立的开关建模，默认全部开启。
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SignalBehavior {
    /// 视觉 OK/NG 信号是否写入 vision_judgement 表
    pub persist_vision_results: bool,
    /// 工序完成/NG 信号是否累计 good/bad 计数
    pub count_process_results: bool,
}

impl Default for SignalBehavior {
    fn default() -> Self {
        Self {
            persist_vision_results: true,
            count_process_results: true,
        }
    }
}

// ==========================================
// MesConfig - 进程运行配置
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MesConfig {
    /// SQLite 数据库文件路径
    pub db_path: String,
    /// PLC 逻辑站号
    pub station_number: i32,
    /// 信号扫描周期（毫秒）
    pub tick_period_ms: u64,
    /// 信号处理行为开关
    pub behavior: SignalBehavior,
}

impl Default for MesConfig {
    fn default() -> Self {
        Self {
            db_path: get_default_db_path(),
            station_number: DEFAULT_STATION_NUMBER,
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
            behavior: SignalBehavior::default(),
        }
    }
}

impl MesConfig {
    /// 从环境变量构建配置
    ///
    /// # 环境变量
    /// - `MES_DB_PATH`: 数据库路径
    /// - `MES_PLC_STATION`: PLC 逻辑站号
    /// - `MES_TICK_PERIOD_MS`: 扫描周期（毫秒）
    /// - `MES_PERSIST_VISION`: 视觉判定落库开关（"0" 关闭）
    /// - `MES_COUNT_PROCESS`: 工序计数开关（"0" 关闭）
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("MES_DB_PATH") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                config.db_path = trimmed.to_string();
            }
        }
        if let Ok(station) = std::env::var("MES_PLC_STATION") {
            if let Ok(parsed) = station.trim().parse::<i32>() {
                config.station_number = parsed;
            }
        }
        if let Ok(period) = std::env::var("MES_TICK_PERIOD_MS") {
            if let Ok(parsed) = period.trim().parse::<u64>() {
                if parsed > 0 {
                    config.tick_period_ms = parsed;
                }
            }
        }
        if let Ok(v) = std::env::var("MES_PERSIST_VISION") {
            config.behavior.persist_vision_results = v.trim() != "0";
        }
        if let Ok(v) = std::env::var("MES_COUNT_PROCESS") {
            config.behavior.count_process_results = v.trim() != "0";
        }

        config
    }
}

// ==========================================
// 默认数据库路径辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 开发环境: 用户数据目录/assembly-line-mes-dev/assembly_line_mes.db
/// - 生产环境: 用户数据目录/assembly-line-mes/assembly_line_mes.db
/// - 无法获取用户数据目录时回退为 ./assembly_line_mes.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 先给一个默认回退值，后续如果能拿到 data_dir 再覆盖。
    let mut path = PathBuf::from("./assembly_line_mes.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("assembly-line-mes-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("assembly-line-mes");
        }

        // 确保目录存在
        std::fs::create_dir_all(&path).ok();
        path = path.join("assembly_line_mes.db");
    }

    path.to_string_lossy().to_string()
}
