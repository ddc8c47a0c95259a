// ==========================================
// 保留归档测试
// ==========================================
// 测试目标: 活动台账 30 行上限、最旧先归档、backup_id 单调递增
// ==========================================

mod test_helpers;

use assembly_line_mes::domain::production::Production;
use assembly_line_mes::domain::types::OrderStatus;
use chrono::NaiveDateTime;

use test_helpers::{create_test_line, seed_order, TestLine};

fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

/// 按创建顺序插入 count 条订单: 1250101001, 1250101002, ...
fn seed_orders(line: &TestLine, count: i64) {
    for i in 1..=count {
        seed_order(
            line,
            1_250_101_000 + i,
            &format!("2025-01-01 {:02}:{:02}:00", 8 + i / 60, i % 60),
            OrderStatus::Completed,
        );
    }
}

fn seed_production(line: &TestLine, production_id: i64, start: &str, end: Option<&str>) {
    let production = Production {
        production_id,
        model_code: "KIA_SORENTO".to_string(),
        upper_quantity: 5,
        lower_quantity: 5,
        good_quantity: 4,
        bad_quantity: 1,
        start_date: ts(start),
        end_date: end.map(ts),
    };
    let rows = line.app.production_repo.insert(&production).unwrap();
    assert_eq!(rows, 1);
}

// ==========================================
// 订单保留
// ==========================================

#[test]
fn test_order_retention_noop_at_limit() {
    let line = create_test_line();
    seed_orders(&line, 30);

    line.app.order_service.enforce_retention().unwrap();

    assert_eq!(line.app.order_repo.count_active().unwrap(), 30);
    assert_eq!(line.app.order_repo.count_history().unwrap(), 0);
}

#[test]
fn test_order_retention_archives_oldest_with_backup_id_zero() {
    let line = create_test_line();

    // 31 条订单 (1250101001..1250101031)
    seed_orders(&line, 31);
    line.app.order_service.enforce_retention().unwrap();

    // 活动表回落到 30，最旧的一条被迁走
    assert_eq!(line.app.order_repo.count_active().unwrap(), 30);
    assert!(line.app.order_repo.find_by_id(1250101001).unwrap().is_none());

    // 归档表出现同一行，首个 backup_id 为 0
    let history = line
        .app
        .order_repo
        .find_history_by_order_id(1250101001)
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].backup_id, 0);
    assert_eq!(history[0].order_quantity, 5);
    assert_eq!(history[0].order_status, OrderStatus::Completed);

    // 现在最旧的活动行是 1250101002
    let oldest = line.app.order_repo.find_oldest().unwrap().unwrap();
    assert_eq!(oldest.order_id, 1250101002);
}

#[test]
fn test_order_retention_backup_id_increments_no_reuse() {
    let line = create_test_line();

    seed_orders(&line, 31);
    line.app.order_service.enforce_retention().unwrap();
    assert_eq!(line.app.order_repo.count_history().unwrap(), 1);

    // 再插入两条 → 超出 2 行，一次保留执行迁移两行
    seed_order(&line, 1250101032, "2025-01-01 12:00:00", OrderStatus::Completed);
    seed_order(&line, 1250101033, "2025-01-01 12:01:00", OrderStatus::Completed);
    line.app.order_service.enforce_retention().unwrap();

    assert_eq!(line.app.order_repo.count_active().unwrap(), 30);
    assert_eq!(line.app.order_repo.count_history().unwrap(), 3);

    // backup_id 连续: 0, 1, 2（无复用）
    let h2 = line
        .app
        .order_repo
        .find_history_by_order_id(1250101002)
        .unwrap();
    let h3 = line
        .app
        .order_repo
        .find_history_by_order_id(1250101003)
        .unwrap();
    assert_eq!(h2[0].backup_id, 1);
    assert_eq!(h3[0].backup_id, 2);
}

// ==========================================
// 生产保留
// ==========================================

#[test]
fn test_production_retention_archives_oldest_by_start_date() {
    let line = create_test_line();

    for i in 1..=31_i64 {
        seed_production(
            &line,
            1_250_101_000 + i,
            &format!("2025-01-01 {:02}:{:02}:00", 8 + i / 60, i % 60),
            Some("2025-01-01 23:00:00"),
        );
    }

    line.app.production_service.enforce_retention().unwrap();

    assert_eq!(line.app.production_repo.count_active().unwrap(), 30);
    assert!(line
        .app
        .production_repo
        .find_by_id(1250101001)
        .unwrap()
        .is_none());

    let history = line
        .app
        .production_repo
        .find_history_by_production_id(1250101001)
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].backup_id, 0);
    assert_eq!(history[0].good_quantity, 4);
    assert_eq!(history[0].bad_quantity, 1);
}

#[test]
fn test_production_retention_preserves_null_end_date_in_history() {
    let line = create_test_line();

    // 最旧一行仍在进行中（end_date NULL），归档时原样保留
    seed_production(&line, 1250101001, "2025-01-01 00:00:00", None);
    for i in 2..=31_i64 {
        seed_production(
            &line,
            1_250_101_000 + i,
            &format!("2025-01-01 {:02}:{:02}:00", 8 + i / 60, i % 60),
            Some("2025-01-01 23:00:00"),
        );
    }

    line.app.production_service.enforce_retention().unwrap();

    let history = line
        .app
        .production_repo
        .find_history_by_production_id(1250101001)
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].end_date, None);
}

// ==========================================
// 接入路径触发保留
// ==========================================

#[test]
fn test_intake_runs_order_retention_after_insert() {
    let line = create_test_line();

    // 预置 30 条历史订单，Web 下单为第 31 条
    seed_orders(&line, 30);
    let order_id = line
        .app
        .order_api
        .create_web_order("KIA_CARNIVAL", 5)
        .unwrap();

    // 下单路径内部已执行保留: 活动表回到 30，最旧一条进入归档
    assert_eq!(line.app.order_repo.count_active().unwrap(), 30);
    assert_eq!(line.app.order_repo.count_history().unwrap(), 1);
    assert!(line.app.order_repo.find_by_id(order_id).unwrap().is_some());
    assert!(line.app.order_repo.find_by_id(1250101001).unwrap().is_none());
}
