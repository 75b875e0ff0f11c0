use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

pub mod time;

/// # Summary
/// 以某一天为终点、向前回溯固定自然日数的日期区间（两端均包含）。
///
/// # Invariants
/// - `start <= end`。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrailingWindow {
    // 区间起点（包含）
    pub start: NaiveDate,
    // 区间终点（包含），即运行当日
    pub end: NaiveDate,
}

impl TrailingWindow {
    /// # Summary
    /// 构造以 `end` 结束、回溯 `days` 个自然日的窗口。
    ///
    /// # Logic
    /// 1. `start = end - days`，若日期下溢则退化为 `NaiveDate::MIN`。
    ///
    /// # Arguments
    /// * `end`: 运行当日。
    /// * `days`: 回溯的自然日数。
    ///
    /// # Returns
    /// 新的窗口实例。
    pub fn ending_at(end: NaiveDate, days: u32) -> Self {
        let start = end
            .checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    /// 判断日期是否落在窗口内。
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl std::fmt::Display for TrailingWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_is_inclusive_on_both_ends() {
        let window = TrailingWindow::ending_at(date(2024, 6, 30), 40);
        assert_eq!(window.start, date(2024, 5, 21));
        assert!(window.contains(date(2024, 5, 21)));
        assert!(window.contains(date(2024, 6, 30)));
        assert!(!window.contains(date(2024, 5, 20)));
        assert!(!window.contains(date(2024, 7, 1)));
    }
}
