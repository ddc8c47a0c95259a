// ==========================================
// ProductionService - 生产台账引擎
// ==========================================
// 职责: 生产记录的创建/收尾/计数/视觉流水，以及生产保留归档
// 说明: “当前生产”= end_date 为 NULL 的最新一行；
//       收尾请求在没有进行中记录时被容忍（告警后返回）。
// ==========================================

use std::sync::Arc;

use chrono::Local;
use tracing::{debug, info, warn};

use crate::domain::production::Production;
use crate::domain::types::{VisionResult, VisionUnit};
use crate::engine::ACTIVE_ROW_LIMIT;
use crate::repository::error::RepositoryResult;
use crate::repository::order_repo::OrderRepository;
use crate::repository::production_repo::ProductionRepository;
use crate::repository::vision_repo::VisionJudgementRepository;

pub struct ProductionService {
    order_repo: Arc<OrderRepository>,
    production_repo: Arc<ProductionRepository>,
    vision_repo: Arc<VisionJudgementRepository>,
}

impl ProductionService {
    /// 创建新的生产台账引擎
    pub fn new(
        order_repo: Arc<OrderRepository>,
        production_repo: Arc<ProductionRepository>,
        vision_repo: Arc<VisionJudgementRepository>,
    ) -> Self {
        Self {
            order_repo,
            production_repo,
            vision_repo,
        }
    }

    // ==========================================
    // 创建与收尾
    // ==========================================

    /// 以最新订单为模板创建生产记录
    ///
    /// - 无订单数据: 记录告警后返回（不是错误）
    /// - 上/下部指示数量取订单数量，计数从 0 开始，end_date 为 NULL
    /// - 当日序号耗尽向调用方传播
    pub fn create_for_latest_order(&self) -> RepositoryResult<()> {
        let Some(order) = self.order_repo.find_latest()? else {
            warn!("试图创建生产数据，但 order 表中没有订单。");
            return Ok(());
        };

        let now = Local::now();
        let production_id = self.production_repo.next_id_for_day(now.date_naive())?;

        let production = Production {
            production_id,
            model_code: order.model_code.clone(),
            upper_quantity: order.order_quantity,
            lower_quantity: order.order_quantity,
            good_quantity: 0,
            bad_quantity: 0,
            start_date: now.naive_local(),
            end_date: None,
        };

        let rows = self.production_repo.insert(&production)?;
        if rows != 1 {
            warn!(
                "生产 INSERT 影响行数不是 1。rows={}, production_id={}, model={}, qty={}",
                rows, production_id, order.model_code, order.order_quantity
            );
        } else {
            info!(
                "已创建新生产记录。production_id={}, model={}, qty={}",
                production_id, order.model_code, order.order_quantity
            );
        }

        self.enforce_retention()?;
        Ok(())
    }

    /// 为当前生产设置结束时间
    ///
    /// 没有进行中的生产数据时告警后返回（收尾请求被容忍）。
    pub fn close_current_production(&self) -> RepositoryResult<()> {
        let Some(open) = self.production_repo.find_open()? else {
            warn!("试图设置生产结束时间，但没有进行中的生产数据 (end_date IS NULL)。");
            return Ok(());
        };

        let rows = self
            .production_repo
            .set_end_date(open.production_id, Local::now().naive_local())?;
        if rows != 1 {
            warn!(
                "production 结束时间 (end_date) 更新影响行数不是 1。rows={}, production_id={}",
                rows, open.production_id
            );
        } else {
            info!(
                "已更新生产结束时间。production_id={}",
                open.production_id
            );
        }

        Ok(())
    }

    // ==========================================
    // 计数
    // ==========================================

    /// 当前生产的良品计数 +1
    pub fn increment_good(&self) -> RepositoryResult<()> {
        let Some(open) = self.production_repo.find_open()? else {
            warn!("试图增加 good_quantity，但找不到进行中的生产记录 (end_date IS NULL)。");
            return Ok(());
        };

        let rows = self.production_repo.increment_good(open.production_id)?;
        if rows != 1 {
            warn!(
                "good_quantity 增量 UPDATE 影响行数不是 1。rows={}, production_id={}",
                rows, open.production_id
            );
        } else {
            info!(
                "production 的 good_quantity 已 +1。production_id={}",
                open.production_id
            );
        }

        Ok(())
    }

    /// 当前生产的不良计数 +1
    pub fn increment_bad(&self) -> RepositoryResult<()> {
        let Some(open) = self.production_repo.find_open()? else {
            warn!("试图增加 bad_quantity，但找不到进行中的生产记录 (end_date IS NULL)。");
            return Ok(());
        };

        let rows = self.production_repo.increment_bad(open.production_id)?;
        if rows != 1 {
            warn!(
                "bad_quantity 增量 UPDATE 影响行数不是 1。rows={}, production_id={}",
                rows, open.production_id
            );
        } else {
            info!(
                "production 的 bad_quantity 已 +1。production_id={}",
                open.production_id
            );
        }

        Ok(())
    }

    // ==========================================
    // 视觉流水
    // ==========================================

    /// 记录一条视觉判定（仅追加，不改变订单/生产状态）
    pub fn record_vision_judgement(
        &self,
        unit: VisionUnit,
        result: VisionResult,
    ) -> RepositoryResult<()> {
        let seq = self
            .vision_repo
            .insert(unit, result, Local::now().naive_local())?;
        debug!(
            "已记录视觉判定。seq={}, unit={}, result={}",
            seq, unit, result
        );
        Ok(())
    }

    // ==========================================
    // 保留归档
    // ==========================================

    /// 生产保留: 活动表只保留最新 30 行，超出部分迁入 production_history
    ///
    /// 逐行迁移，单步失败记录日志后继续处理剩余行（尽力而为，非原子批量）。
    pub fn enforce_retention(&self) -> RepositoryResult<()> {
        let total = self.production_repo.count_active()?;
        if total <= ACTIVE_ROW_LIMIT {
            return Ok(());
        }

        let to_archive = total - ACTIVE_ROW_LIMIT;
        for _ in 0..to_archive {
            match self.archive_oldest() {
                Ok(true) => {}
                Ok(false) => return Ok(()),
                Err(e) => warn!("生产归档迁移单步失败（继续处理剩余行）: {}", e),
            }
        }
        Ok(())
    }

    /// 迁移最旧的一行生产记录到归档表
    ///
    /// # 返回
    /// - `Ok(true)`: 迁移了一行
    /// - `Ok(false)`: 活动表已空
    fn archive_oldest(&self) -> RepositoryResult<bool> {
        let Some(oldest) = self.production_repo.find_oldest()? else {
            return Ok(false);
        };

        let backup_id = self.production_repo.next_backup_id()?;
        let history = oldest.to_history(backup_id, Local::now().naive_local());

        let rows = self.production_repo.insert_history(&history)?;
        if rows != 1 {
            warn!(
                "production_history 插入影响行数不是 1。rows={}, production_id={}, backup_id={}",
                rows, oldest.production_id, backup_id
            );
        }

        let rows = self.production_repo.delete(oldest.production_id)?;
        if rows != 1 {
            warn!(
                "production 删除旧记录影响行数不是 1。rows={}, production_id={}",
                rows, oldest.production_id
            );
        }

        Ok(true)
    }
}
