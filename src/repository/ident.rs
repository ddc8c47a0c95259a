// ==========================================
// 装配产线 MES 服务 - 日界 ID 分配
// ==========================================
// ID 格式: 1YYMMDDNNN（10 位整数）
// - 首位恒为 1
// - YYMMDD: 分配日期（两位年、月、日）
// - NNN: 当日序号，001 起，上限 999
// 不同日期的 ID 区间天然不相交，跨日自动重新计数。
// ==========================================

use chrono::{Datelike, NaiveDate};

use crate::repository::error::{RepositoryError, RepositoryResult};

/// 计算指定日期的 ID 闭区间 `[1YYMMDD000, 1YYMMDD999]`
pub fn day_id_range(day: NaiveDate) -> (i64, i64) {
    let yy = (day.year() % 100) as i64;
    let base = 1_000_000_000
        + yy * 10_000_000
        + (day.month() as i64) * 100_000
        + (day.day() as i64) * 1_000;
    (base, base + 999)
}

/// 基于区间内现有最大 ID 计算下一个 ID
///
/// # 参数
/// - `day`: 分配日期
/// - `current_max`: 区间内现有最大 ID（无记录时为 None）
///
/// # 返回
/// - `Ok(id)`: 下一个可用 ID，当日内严格递增
/// - `Err(DailySequenceExhausted)`: 序号超过 999
pub fn next_daily_id(day: NaiveDate, current_max: Option<i64>) -> RepositoryResult<i64> {
    let (base, _) = day_id_range(day);

    let next_sequence = match current_max {
        None => 1,
        Some(max) => (max % 1000) + 1,
    };

    if next_sequence > 999 {
        return Err(RepositoryError::DailySequenceExhausted { day });
    }

    Ok(base + next_sequence)
}
