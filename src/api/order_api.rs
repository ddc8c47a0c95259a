// ==========================================
// OrderApi - 订单接入 API
// ==========================================
// 职责: 接收 Web 下单请求，校验后写台账并下发 PLC
// 并发注意: 本路径与扫描任务都会改动“最新订单”，
//           台账读写未包事务，竞态为已知缺口（不在此处修补）。
// ==========================================

use std::sync::Arc;

use chrono::Local;
use tracing::{error, info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::order::Order;
use crate::domain::types::{ModelCode, OrderStatus};
use crate::engine::order_service::OrderService;
use crate::i18n;
use crate::plc::client::PlcClient;
use crate::repository::order_repo::OrderRepository;

// ===== 接入路径使用的点位 =====

/// 设备运行状态（0 = 停止，可接单）
pub const MACHINE_STATUS_POINT: &str = "M101";
/// 订单请求信号
pub const ORDER_REQUEST_POINT: &str = "M310";
/// 请求数量
pub const REQUEST_QUANTITY_POINT: &str = "D310";
/// 作业指示数量
pub const WORK_ORDER_POINT: &str = "D315";
/// 订单下发完成信号（PLC 侧 1 秒后自行复位）
pub const ORDER_COMPLETE_POINT: &str = "M311";

pub struct OrderApi {
    order_repo: Arc<OrderRepository>,
    order_service: Arc<OrderService>,
    plc: Arc<dyn PlcClient>,
}

impl OrderApi {
    /// 创建新的订单接入 API
    pub fn new(
        order_repo: Arc<OrderRepository>,
        order_service: Arc<OrderService>,
        plc: Arc<dyn PlcClient>,
    ) -> Self {
        Self {
            order_repo,
            order_service,
            plc,
        }
    }

    /// 创建 Web 订单
    ///
    /// 校验顺序:
    /// 1. 数量必须为正
    /// 2. 车型必须在支持集合内
    /// 3. 设备必须处于停止状态（M101 = 0）
    ///
    /// 通过校验后: 取代仍处于 WAITING 的旧订单 → 分配当日订单 ID →
    /// 插入 WAITING 行 → 执行订单保留归档 → 下发 PLC
    /// (M310=1, D310=数量, D315=数量, M311=1)。
    ///
    /// # 返回
    /// - `Ok(order_id)`: 新订单 ID
    /// - `Err(ApiError)`: 用户可读的拒绝原因
    pub fn create_web_order(&self, model_code: &str, quantity: i32) -> ApiResult<i64> {
        if quantity <= 0 {
            return Err(ApiError::InvalidInput(i18n::t("order.invalid_quantity")));
        }

        let Some(model) = ModelCode::from_code(model_code) else {
            return Err(ApiError::InvalidInput(i18n::t("order.unsupported_model")));
        };

        // 设备状态确认（运行中不可接单）
        let machine_status = match self.plc.read_device(MACHINE_STATUS_POINT) {
            Ok(value) => value,
            Err(e) => {
                error!("设备状态(M101)读取发生错误: {}", e);
                return Err(ApiError::DeviceUnavailable(i18n::t(
                    "order.device_unreachable",
                )));
            }
        };
        if machine_status != 0 {
            warn!(
                "订单被拒绝: 设备运行中 (M101={}, model={}, qty={})",
                machine_status, model, quantity
            );
            return Err(ApiError::LineBusy(i18n::t("order.line_busy")));
        }

        // 1. 取代仍处于 WAITING 的旧订单
        let cancelled = self.order_repo.cancel_waiting()?;
        if cancelled > 0 {
            info!("已将之前的待产订单置为取消。cancelled_count={}", cancelled);
        }

        // 2. 分配当日订单 ID 并落库（序号耗尽向调用方传播）
        let now = Local::now();
        let order_id = self.order_repo.next_id_for_day(now.date_naive())?;

        let order = Order {
            order_id,
            model_code: model.as_code().to_string(),
            order_quantity: quantity,
            order_date: now.naive_local(),
            order_status: OrderStatus::Waiting,
        };

        let rows = self.order_repo.insert(&order)?;
        if rows != 1 {
            warn!(
                "Web 订单落库影响行数不是 1。rows={}, order_id={}, model={}, qty={}",
                rows, order_id, model, quantity
            );
            return Err(ApiError::DatabaseError(i18n::t("order.storage_failure")));
        }

        // 3. order 表只保留最新 30 条，超出部分迁入 order_history
        self.order_service.enforce_retention()?;

        // 4. 下发 PLC（车型不下发）
        if let Err(e) = self.transmit_order(quantity) {
            error!(
                "订单下发 PLC 失败。order_id={}, model={}, qty={}, err={}",
                order_id, model, quantity, e
            );
            return Err(ApiError::DeviceUnavailable(i18n::t(
                "order.transmit_failure",
            )));
        }

        info!(
            "Web 订单创建并下发 PLC 完成。order_id={}, model={}, qty={}",
            order_id, model, quantity
        );

        Ok(order_id)
    }

    /// 向设备下发订单信息
    fn transmit_order(&self, quantity: i32) -> crate::plc::PlcResult<()> {
        // 订单请求信号 ON
        self.plc.write_device(ORDER_REQUEST_POINT, 1)?;

        // 请求数量与作业指示数量
        self.plc.write_device(REQUEST_QUANTITY_POINT, quantity)?;
        self.plc.write_device(WORK_ORDER_POINT, quantity)?;

        // 订单下发完成信号 ON（PLC 侧 1 秒后自行复位）
        self.plc.write_device(ORDER_COMPLETE_POINT, 1)?;

        Ok(())
    }
}
