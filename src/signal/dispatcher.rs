// ==========================================
// SignalDispatcher - 信号分发器
// ==========================================
// 契约（对每个非 0 点位，按固定顺序执行一次）:
//   (a) 调用该信号绑定的业务处理
//   (b) 输出恰好一条固定变迁日志
//   (c) 向点位回写 0 作为确认/复位
// (a)/(b) 失败不阻止 (c)；(c) 失败只记录日志，本周期内不重试，
// 点位可能保持置位并在下个周期被重复处理（计数类处理不具幂等性）。
// 值为 0 是默认空闲状态，直接跳过。
// ==========================================

use std::sync::Arc;

use tracing::error;

use crate::config::SignalBehavior;
use crate::domain::types::{OrderStatus, VisionResult, VisionUnit};
use crate::engine::order_service::OrderService;
use crate::engine::production_service::ProductionService;
use crate::plc::client::PlcClient;
use crate::signal::table::PlcSignal;

pub struct SignalDispatcher {
    plc: Arc<dyn PlcClient>,
    order_service: Arc<OrderService>,
    production_service: Arc<ProductionService>,
    behavior: SignalBehavior,
}

impl SignalDispatcher {
    /// 创建新的信号分发器
    pub fn new(
        plc: Arc<dyn PlcClient>,
        order_service: Arc<OrderService>,
        production_service: Arc<ProductionService>,
        behavior: SignalBehavior,
    ) -> Self {
        Self {
            plc,
            order_service,
            production_service,
            behavior,
        }
    }

    /// 处理一个已读取的点位值
    pub fn dispatch(&self, signal: PlcSignal, value: i32) {
        if value == 0 {
            return;
        }

        self.handle_business(signal);
        signal.log_transition();

        if let Err(e) = self.plc.write_device(signal.point(), 0) {
            error!(
                "PLC 点位复位(OFF)写入失败。device={}, err={}",
                signal.point(),
                e
            );
        }
    }

    /// 信号 → 业务处理（封闭映射，穷尽 match）
    ///
    /// 每个分支各自捕获错误并记录日志，不向扫描循环传播。
    fn handle_business(&self, signal: PlcSignal) {
        match signal {
            // ===== 订单状态变迁 =====
            PlcSignal::ProductionStart => {
                // 先更新订单状态，成功后再创建生产记录
                let result = self
                    .order_service
                    .update_latest_status(OrderStatus::Processing)
                    .and_then(|_| self.production_service.create_for_latest_order());
                if let Err(e) = result {
                    error!(
                        "处理生产启动信号时订单/生产更新失败。signal={}, err={}",
                        signal, e
                    );
                }
            }
            PlcSignal::FrontEndCompleted => self.apply_status(signal, OrderStatus::Completed),
            PlcSignal::Paused => self.apply_status(signal, OrderStatus::Paused),
            PlcSignal::Resumed => self.apply_status(signal, OrderStatus::Processing),
            PlcSignal::CancelRequested => self.apply_status(signal, OrderStatus::Cancelled),

            // ===== 产线异常复位 =====
            PlcSignal::AbnormalLineReset => {
                if let Err(e) = self.order_service.cancel_latest_if_active() {
                    error!("[M131] 强制取消最新订单时发生错误: {}", e);
                }
            }

            // ===== 视觉判定（仅流水，开关可关） =====
            PlcSignal::UpperVisionOk => self.record_vision(VisionUnit::Upper, VisionResult::Ok),
            PlcSignal::UpperVisionNg => self.record_vision(VisionUnit::Upper, VisionResult::Ng),
            PlcSignal::LowerVisionOk => self.record_vision(VisionUnit::Lower, VisionResult::Ok),
            PlcSignal::LowerVisionNg => self.record_vision(VisionUnit::Lower, VisionResult::Ng),

            // ===== 工序计数（开关可关） =====
            PlcSignal::UpperProcessCompleted | PlcSignal::LowerProcessCompleted => {
                if self.behavior.count_process_results {
                    if let Err(e) = self.production_service.increment_good() {
                        error!("good_quantity 计数失败。signal={}, err={}", signal, e);
                    }
                }
            }
            PlcSignal::UpperProcessNg | PlcSignal::LowerProcessNg => {
                if self.behavior.count_process_results {
                    if let Err(e) = self.production_service.increment_bad() {
                        error!("bad_quantity 计数失败。signal={}, err={}", signal, e);
                    }
                }
            }

            // ===== 仅日志 =====
            PlcSignal::EmergencyStop
            | PlcSignal::EmergencyStopReleased
            | PlcSignal::AutoMode
            | PlcSignal::ManualMode => {}
        }
    }

    fn apply_status(&self, signal: PlcSignal, new_status: OrderStatus) {
        if let Err(e) = self.order_service.update_latest_status(new_status) {
            error!(
                "处理 PLC 信号的订单状态更新失败。signal={}, status={}, err={}",
                signal, new_status, e
            );
        }
    }

    fn record_vision(&self, unit: VisionUnit, result: VisionResult) {
        if !self.behavior.persist_vision_results {
            return;
        }
        if let Err(e) = self.production_service.record_vision_judgement(unit, result) {
            error!(
                "视觉判定写入失败。unit={}, result={}, err={}",
                unit, result, e
            );
        }
    }
}
