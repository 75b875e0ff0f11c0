use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use std::sync::RwLock;

/// # Summary
/// 时间供给器接口，用于隔离物理系统时钟。
/// 筛选流水线通过此接口获取“运行当日”，测试可注入固定时间。
pub trait TimeProvider: Send + Sync {
    /// 获取当前时间
    fn now(&self) -> DateTime<Utc>;

    /// # Summary
    /// 获取指定时区下的当日日期。
    ///
    /// # Logic
    /// 1. 将 `now()` 转换到给定的固定偏移时区。
    /// 2. 截取日期部分。
    ///
    /// # Arguments
    /// * `offset`: 市场所在时区的 UTC 偏移。
    ///
    /// # Returns
    /// 该时区下的日历日期。
    fn today(&self, offset: FixedOffset) -> NaiveDate {
        self.now().with_timezone(&offset).date_naive()
    }
}

/// # Summary
/// 正常运行使用的真实时钟，直接返回操作系统当前时间。
pub struct RealTimeProvider;

impl TimeProvider for RealTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// # Summary
/// 测试专用虚拟时钟，允许主动设定当前时间。
///
/// # Invariants
/// - 内部利用 `RwLock` 提供线程安全的读写；锁中毒时沿用中毒前的值。
pub struct FakeClockProvider {
    current_time: RwLock<DateTime<Utc>>,
}

impl FakeClockProvider {
    /// 使用指定的初始时间创建虚拟时钟
    pub fn new(initial_time: DateTime<Utc>) -> Self {
        Self {
            current_time: RwLock::new(initial_time),
        }
    }

    /// 强制修改时钟的当前时间
    pub fn set_time(&self, new_time: DateTime<Utc>) {
        let mut time = self
            .current_time
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *time = new_time;
    }
}

impl TimeProvider for FakeClockProvider {
    fn now(&self) -> DateTime<Utc> {
        *self
            .current_time
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_today_respects_market_offset() {
        // UTC 2024-06-02 20:00 = JST 2024-06-03 05:00
        let clock = FakeClockProvider::new(Utc.with_ymd_and_hms(2024, 6, 2, 20, 0, 0).unwrap());
        let jst = FixedOffset::east_opt(9 * 3600).unwrap();
        let utc = FixedOffset::east_opt(0).unwrap();

        assert_eq!(clock.today(jst), NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        assert_eq!(clock.today(utc), NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());

        clock.set_time(Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap());
        assert_eq!(clock.today(utc), NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
    }
}
