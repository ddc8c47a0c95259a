// ==========================================
// 装配产线 MES 服务 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态（仓储/引擎/扫描服务/PLC 会话）
// 生命周期: start 启动扫描任务；shutdown 停止任务并关闭 PLC 会话
// ==========================================

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::api::OrderApi;
use crate::config::MesConfig;
use crate::db;
use crate::engine::{OrderService, ProductionService};
use crate::plc::PlcClient;
use crate::repository::{OrderRepository, ProductionRepository, VisionJudgementRepository};
use crate::signal::{SignalDispatcher, SignalScanner};

/// 应用状态
///
/// 包含所有引擎/API 实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// PLC 会话（扫描任务与订单接入共享）
    pub plc: Arc<dyn PlcClient>,

    /// 订单接入 API
    pub order_api: Arc<OrderApi>,

    /// 订单状态引擎
    pub order_service: Arc<OrderService>,

    /// 生产台账引擎
    pub production_service: Arc<ProductionService>,

    /// 信号扫描服务
    pub scanner: Arc<SignalScanner>,

    /// 订单仓储
    pub order_repo: Arc<OrderRepository>,

    /// 生产仓储
    pub production_repo: Arc<ProductionRepository>,

    /// 视觉判定仓储
    pub vision_repo: Arc<VisionJudgementRepository>,
}

impl AppState {
    /// 创建新的 AppState 实例
    ///
    /// # 参数
    /// - config: 进程运行配置
    /// - plc: PLC 会话（由调用方注入传输实现）
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开数据库连接并建表
    /// 2. 初始化所有 Repository
    /// 3. 初始化引擎与信号层
    pub fn new(config: &MesConfig, plc: Arc<dyn PlcClient>) -> Result<Self, String> {
        tracing::info!("初始化 AppState，数据库路径: {}", config.db_path);

        // 创建数据库连接（共享连接）
        let conn = db::open_sqlite_connection(&config.db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        db::ensure_ledger_schema(&conn).map_err(|e| format!("无法初始化台账表结构: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化 Repository 层
        // ==========================================
        let order_repo = Arc::new(OrderRepository::new(conn.clone()));
        let production_repo = Arc::new(ProductionRepository::new(conn.clone()));
        let vision_repo = Arc::new(VisionJudgementRepository::new(conn.clone()));

        // ==========================================
        // 初始化引擎层
        // ==========================================
        let production_service = Arc::new(ProductionService::new(
            order_repo.clone(),
            production_repo.clone(),
            vision_repo.clone(),
        ));
        let order_service = Arc::new(OrderService::new(
            order_repo.clone(),
            production_service.clone(),
        ));

        // ==========================================
        // 初始化信号层
        // ==========================================
        let dispatcher = Arc::new(SignalDispatcher::new(
            plc.clone(),
            order_service.clone(),
            production_service.clone(),
            config.behavior,
        ));
        let scanner = Arc::new(SignalScanner::new(
            plc.clone(),
            dispatcher,
            Duration::from_millis(config.tick_period_ms),
        ));

        // ==========================================
        // 初始化 API 层
        // ==========================================
        let order_api = Arc::new(OrderApi::new(
            order_repo.clone(),
            order_service.clone(),
            plc.clone(),
        ));

        tracing::info!("AppState 初始化完成");

        Ok(Self {
            db_path: config.db_path.clone(),
            plc,
            order_api,
            order_service,
            production_service,
            scanner,
            order_repo,
            production_repo,
            vision_repo,
        })
    }

    /// 启动信号扫描任务
    pub fn start(&self) {
        self.scanner.start();
    }

    /// 停止扫描任务并关闭 PLC 会话
    pub async fn shutdown(&self) {
        self.scanner.stop().await;
        self.plc.close();
        tracing::info!("AppState 已关闭");
    }
}
