// ==========================================
// 装配产线 MES 服务 - 主入口
// ==========================================
// 技术栈: Rust + Tokio + SQLite
// 生命周期: 启动即开始周期扫描，Ctrl-C 停止扫描并关闭 PLC 会话
// ==========================================

use std::sync::Arc;

use assembly_line_mes::app::AppState;
use assembly_line_mes::config::MesConfig;
use assembly_line_mes::logging;
use assembly_line_mes::plc::{MemoryBus, MemoryTransport, PlcClient, PlcSession};

#[tokio::main]
async fn main() {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", assembly_line_mes::APP_NAME);
    tracing::info!("系统版本: {}", assembly_line_mes::VERSION);
    tracing::info!("==================================================");

    // 读取配置
    let config = MesConfig::from_env();
    tracing::info!("使用数据库: {}", config.db_path);
    tracing::info!(
        "扫描周期: {}ms, PLC 站号: {}",
        config.tick_period_ms,
        config.station_number
    );

    // 默认构建挂接内存点位总线（干跑/联调模式）；
    // 接入真实设备时在此替换为厂商链路的 PlcTransport 实现。
    let bus = MemoryBus::default();
    let plc: Arc<dyn PlcClient> = Arc::new(PlcSession::new(
        config.station_number,
        MemoryTransport::new(bus),
    ));

    // 创建 AppState 并启动扫描
    tracing::info!("正在初始化 AppState...");
    let app_state = AppState::new(&config, plc).expect("无法初始化AppState");
    app_state.start();

    tracing::info!("服务已启动，Ctrl-C 退出。");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("等待退出信号失败: {}", e);
    }

    tracing::info!("收到退出信号，开始关闭...");
    app_state.shutdown().await;
    tracing::info!("服务已退出。");
}
