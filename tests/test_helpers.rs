// ==========================================
// 集成测试辅助
// ==========================================
// 提供: 临时数据库 + 内存点位总线 + 完整装配的 AppState
// ==========================================

use std::sync::Arc;

use assembly_line_mes::app::AppState;
use assembly_line_mes::config::{MesConfig, SignalBehavior};
use assembly_line_mes::domain::order::Order;
use assembly_line_mes::domain::types::OrderStatus;
use assembly_line_mes::plc::{MemoryBus, MemoryTransport, PlcClient, PlcSession};
use chrono::NaiveDateTime;
use tempfile::TempDir;

/// 测试用的完整产线装配
pub struct TestLine {
    pub app: AppState,
    pub bus: MemoryBus,
    // 临时目录随 TestLine 一起存活，析构时自动清理数据库文件
    pub _temp_dir: TempDir,
}

/// 创建默认行为的测试产线
pub fn create_test_line() -> TestLine {
    create_test_line_with_behavior(SignalBehavior::default())
}

/// 创建指定信号行为的测试产线
pub fn create_test_line_with_behavior(behavior: SignalBehavior) -> TestLine {
    create_test_line_with(behavior, 1_000)
}

/// 创建指定信号行为与扫描周期的测试产线
pub fn create_test_line_with(behavior: SignalBehavior, tick_period_ms: u64) -> TestLine {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir
        .path()
        .join("mes_test.db")
        .to_string_lossy()
        .to_string();

    let config = MesConfig {
        db_path,
        station_number: 1,
        tick_period_ms,
        behavior,
    };

    let bus = MemoryBus::default();
    let plc: Arc<dyn PlcClient> = Arc::new(PlcSession::new(
        config.station_number,
        MemoryTransport::new(bus.clone()),
    ));

    let app = AppState::new(&config, plc).expect("Failed to create AppState");

    TestLine {
        app,
        bus,
        _temp_dir: temp_dir,
    }
}

/// 直接向台账插入一条订单（绕过接入校验，用于构造历史数据）
pub fn seed_order(line: &TestLine, order_id: i64, date: &str, status: OrderStatus) {
    let order = Order {
        order_id,
        model_code: "KIA_CARNIVAL".to_string(),
        order_quantity: 5,
        order_date: NaiveDateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S")
            .expect("bad datetime literal"),
        order_status: status,
    };
    let rows = line.app.order_repo.insert(&order).expect("seed order failed");
    assert_eq!(rows, 1);
}
