// ==========================================
// 产线信号模拟器
// ==========================================
// 用途: 在内存点位总线上走一遍完整的订单→生产流程，
//       验证信号扫描/分发与台账联动（无需真实设备）。
// 运行: cargo run --bin simulate_line
// ==========================================

use std::sync::Arc;

use assembly_line_mes::api::order_api::MACHINE_STATUS_POINT;
use assembly_line_mes::app::AppState;
use assembly_line_mes::config::MesConfig;
use assembly_line_mes::plc::{MemoryBus, MemoryTransport, PlcClient, PlcSession};
use assembly_line_mes::signal::PlcSignal;

fn main() {
    tracing_subscriber::fmt::init();

    println!("==================================================");
    println!("产线信号模拟 - {}", assembly_line_mes::APP_NAME);
    println!("==================================================");

    let mut config = MesConfig::from_env();
    if std::env::var("MES_DB_PATH").is_err() {
        config.db_path = "./simulate_line.db".to_string();
    }
    println!("使用数据库: {}", config.db_path);

    let bus = MemoryBus::default();
    let plc: Arc<dyn PlcClient> = Arc::new(PlcSession::new(
        config.station_number,
        MemoryTransport::new(bus.clone()),
    ));

    let app = AppState::new(&config, plc).expect("无法初始化AppState");

    // 设备停止状态，允许接单
    bus.set_point(MACHINE_STATUS_POINT, 0);

    // 步骤 1: Web 下单
    let order_id = app
        .order_api
        .create_web_order("KIA_CARNIVAL", 5)
        .expect("下单失败");
    println!("✓ 步骤 1: 订单已创建 order_id={}", order_id);
    println!("  - D310={}, D315={}", bus.point("D310"), bus.point("D315"));

    // 步骤 2: 产线抬起生产启动信号
    bus.raise(PlcSignal::ProductionStart.point());
    app.scanner.tick();
    let order = app.order_repo.find_latest().unwrap().unwrap();
    let production = app.production_repo.find_open().unwrap().unwrap();
    println!(
        "✓ 步骤 2: 生产已启动 order_status={}, production_id={}",
        order.order_status, production.production_id
    );

    // 步骤 3: 工序完成/NG 信号累计计数
    bus.raise(PlcSignal::UpperProcessCompleted.point());
    app.scanner.tick();
    bus.raise(PlcSignal::LowerProcessCompleted.point());
    app.scanner.tick();
    bus.raise(PlcSignal::UpperProcessNg.point());
    app.scanner.tick();

    let production = app.production_repo.find_open().unwrap().unwrap();
    println!(
        "✓ 步骤 3: 计数完成 good={}, bad={}",
        production.good_quantity, production.bad_quantity
    );

    // 步骤 4: 视觉判定流水
    bus.raise(PlcSignal::UpperVisionOk.point());
    bus.raise(PlcSignal::LowerVisionNg.point());
    app.scanner.tick();
    println!(
        "✓ 步骤 4: 视觉判定已记录 count={}",
        app.vision_repo.count().unwrap()
    );

    // 步骤 5: 前段工序完成 → 订单完成、生产收尾
    bus.raise(PlcSignal::FrontEndCompleted.point());
    app.scanner.tick();

    let order = app.order_repo.find_latest().unwrap().unwrap();
    let open_count = app.production_repo.count_open().unwrap();
    println!(
        "✓ 步骤 5: 订单收尾 order_status={}, 进行中生产数={}",
        order.order_status, open_count
    );

    println!();
    println!("模拟完成。");
}
