//! 报告文本渲染。
//!
//! 列约定（单空格分隔，行尾空白去除，宽度均按等宽字体的显示列计算，
//! 全角字符占两列）：
//! Code 左对齐 6、Name 左对齐 `name_width`（超出部分截断）、Price 右对齐 8（整数截断）、
//! MktCap 右对齐 10（亿日元，一位小数）、RSI 右对齐 6（一位小数）。

use crate::filter::ScreenPolicy;
use kabu_core::config::ScreenConfig;
use kabu_core::screen::entity::{ScreenOutcome, ScreeningResult};
use rust_decimal::{Decimal, RoundingStrategy};
use std::error::Error;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// 通知标题。
pub const REPORT_TITLE: &str = "【J-Quants Screening Bot】";
/// 错误报告标题。
pub const ERROR_TITLE: &str = "⚠️ エラーが発生しました";

const OKU: f64 = 100_000_000.0;
const FENCE: &str = "```";
const ERROR_WRAP_COLUMNS: usize = 80;

#[derive(Debug, Clone, Copy)]
pub struct ReportFormatter {
    name_width: usize,
    window_days: u32,
    policy: ScreenPolicy,
}

impl ReportFormatter {
    pub fn new(config: &ScreenConfig) -> Self {
        Self {
            name_width: config.name_width,
            window_days: config.window_days,
            policy: ScreenPolicy::from_config(config),
        }
    }

    /// # Summary
    /// 将一次运行的终态渲染为通知正文。
    ///
    /// # Logic
    /// 1. `NoData`：窗口内无数据的提示句。
    /// 2. `NoMatches`：带基准日与筛选条件的无结果提示句。
    /// 3. `Matches`：基准日行加等宽表格，按 RSI 升序。
    pub fn render(&self, outcome: &ScreenOutcome) -> String {
        match outcome {
            ScreenOutcome::NoData => {
                format!("直近{}日間の株価データがありません。", self.window_days)
            }
            ScreenOutcome::NoMatches { reference_date } => format!(
                "基準日 {}: 条件 (時価総額 ≤ {}億円, RSI ≤ {}) に該当する銘柄はありませんでした。",
                reference_date.format("%Y-%m-%d"),
                plain_number(self.policy.market_cap_ceiling / OKU),
                plain_number(self.policy.rsi_ceiling),
            ),
            ScreenOutcome::Matches {
                reference_date,
                results,
            } => format!(
                "基準日: {}\n{}",
                reference_date.format("%Y-%m-%d"),
                self.render_table(results)
            ),
        }
    }

    fn render_table(&self, results: &[ScreeningResult]) -> String {
        let mut ordered: Vec<&ScreeningResult> = results.iter().collect();
        ordered.sort_by(|a, b| a.rsi.total_cmp(&b.rsi).then_with(|| a.code.cmp(&b.code)));

        let mut lines = Vec::with_capacity(ordered.len() + 3);
        lines.push(FENCE.to_string());
        lines.push(self.row("Code", "Name", "Price", "MktCap", "RSI"));
        for result in ordered {
            lines.push(self.row(
                &result.code,
                &result.name,
                &format!("{:.0}", result.price.trunc()),
                &format!("{}億", one_decimal(result.market_cap / OKU)),
                &one_decimal(result.rsi),
            ));
        }
        lines.push(FENCE.to_string());
        lines.join("\n")
    }

    fn row(&self, code: &str, name: &str, price: &str, market_cap: &str, rsi: &str) -> String {
        let cells = [
            pad_right(code, 6),
            pad_right(&fit_width(name, self.name_width), self.name_width),
            pad_left(price, 8),
            pad_left(market_cap, 10),
            pad_left(rsi, 6),
        ];
        cells.join(" ").trim_end().to_string()
    }
}

// 截取不超过 `width` 显示列的前缀，不拆开全角字符
fn fit_width(text: &str, width: usize) -> String {
    let mut used = 0;
    text.chars()
        .take_while(|c| {
            used += c.width().unwrap_or(0);
            used <= width
        })
        .collect()
}

fn pad_right(text: &str, width: usize) -> String {
    format!("{text}{}", " ".repeat(width.saturating_sub(text.width())))
}

fn pad_left(text: &str, width: usize) -> String {
    format!("{}{text}", " ".repeat(width.saturating_sub(text.width())))
}

/// # Summary
/// 将故障渲染为错误报告正文。
///
/// # Logic
/// 1. 沿 `source()` 链收集消息，已包含在上一条消息中的来源不重复输出。
/// 2. 每行按 80 字符折行，整体置于代码块内。
pub fn render_error(error: &dyn Error) -> String {
    let mut messages = vec![error.to_string()];
    let mut source = error.source();
    while let Some(cause) = source {
        let message = cause.to_string();
        if messages.last().is_none_or(|previous| !previous.contains(&message)) {
            messages.push(message);
        }
        source = cause.source();
    }

    let mut lines = vec![FENCE.to_string()];
    for message in messages.join("\ncaused by: ").lines() {
        lines.extend(wrap(message, ERROR_WRAP_COLUMNS));
    }
    lines.push(FENCE.to_string());
    lines.join("\n")
}

fn wrap(line: &str, columns: usize) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars.chunks(columns).map(|chunk| chunk.iter().collect()).collect()
}

// 半数远离零舍入到一位小数
fn one_decimal(value: f64) -> String {
    match Decimal::from_f64_retain(value) {
        Some(decimal) => {
            let mut rounded = decimal.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
            rounded.rescale(1);
            rounded.to_string()
        }
        None => "-".to_string(),
    }
}

// 去掉多余小数位：300.0 -> "300"，0.5 -> "0.5"
fn plain_number(value: f64) -> String {
    match Decimal::from_f64_retain(value) {
        Some(decimal) => decimal.normalize().to_string(),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 28).unwrap()
    }

    fn result(code: &str, name: &str, rsi: f64) -> ScreeningResult {
        ScreeningResult {
            code: code.into(),
            name: name.into(),
            price: 1234.0,
            market_cap: 2_345_678_901.0,
            rsi,
        }
    }

    #[test]
    fn test_no_data_and_no_matches_are_distinct() {
        let formatter = ReportFormatter::new(&ScreenConfig::default());
        let no_data = formatter.render(&ScreenOutcome::NoData);
        let no_matches = formatter.render(&ScreenOutcome::NoMatches { reference_date: date() });
        assert_eq!(no_data, "直近40日間の株価データがありません。");
        assert_eq!(
            no_matches,
            "基準日 2024-06-28: 条件 (時価総額 ≤ 300億円, RSI ≤ 30) に該当する銘柄はありませんでした。"
        );
        assert!(!no_data.contains(FENCE));
    }

    #[test]
    fn test_table_layout() {
        let formatter = ReportFormatter::new(&ScreenConfig::default());
        let text = formatter.render(&ScreenOutcome::Matches {
            reference_date: date(),
            results: vec![result("1001", "極洋", 12.25)],
        });
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "基準日: 2024-06-28");
        assert_eq!(lines[1], "```");
        assert_eq!(lines[2], "Code   Name          Price     MktCap    RSI");
        assert_eq!(lines[3], "1001   極洋           1234     23.5億   12.3");
        assert_eq!(lines[4], "```");
    }

    #[test]
    fn test_rows_sorted_by_rsi_and_render_is_idempotent() {
        let formatter = ReportFormatter::new(&ScreenConfig::default());
        let outcome = ScreenOutcome::Matches {
            reference_date: date(),
            results: vec![result("3003", "C", 25.0), result("1001", "A", 5.0), result("2002", "B", 25.0)],
        };
        let text = formatter.render(&outcome);
        let codes: Vec<&str> = text
            .lines()
            .skip(3)
            .filter(|l| *l != "```")
            .map(|l| &l[..4])
            .collect();
        assert_eq!(codes, vec!["1001", "2002", "3003"]);
        assert_eq!(text, formatter.render(&outcome));
    }

    #[test]
    fn test_wide_names_keep_columns_aligned() {
        let formatter = ReportFormatter::new(&ScreenConfig::default());
        let text = formatter.render(&ScreenOutcome::Matches {
            reference_date: date(),
            results: vec![
                result("1001", "ABC", 12.3),
                result("1002", "極洋", 12.3),
                result("1003", "極洋水産ホールディングス", 12.3),
            ],
        });
        let lines: Vec<&str> = text.lines().skip(2).filter(|l| *l != "```").collect();
        assert_eq!(lines.len(), 4);
        for line in &lines {
            assert_eq!(line.width(), 44, "{line}");
        }
        assert!(lines[3].starts_with("1003   極洋水産ホ "), "{}", lines[3]);
    }

    #[test]
    fn test_fit_width_never_splits_wide_chars() {
        assert_eq!(fit_width("極洋水産ホールディングス", 10), "極洋水産ホ");
        assert_eq!(fit_width("a極洋水産ホ", 10), "a極洋水産");
        assert_eq!(pad_right("a極洋水産", 10).width(), 10);
        assert_eq!(fit_width("ABC", 10), "ABC");
        assert_eq!(pad_left("23.5億", 10), "    23.5億");
    }

    #[test]
    fn test_rounding_is_half_away_from_zero() {
        assert_eq!(one_decimal(0.25), "0.3");
        assert_eq!(one_decimal(30.0), "30.0");
        assert_eq!(one_decimal(f64::NAN), "-");
        assert_eq!(plain_number(300.0), "300");
        assert_eq!(plain_number(0.5), "0.5");
    }

    #[derive(Debug)]
    struct Outer(std::io::Error);

    impl std::fmt::Display for Outer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "failed to load quotes")
        }
    }

    impl Error for Outer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_error_report_includes_cause_chain_and_wraps() {
        let error = Outer(std::io::Error::other("x".repeat(100)));
        let text = render_error(&error);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.first(), Some(&"```"));
        assert_eq!(lines.last(), Some(&"```"));
        assert_eq!(lines[1], "failed to load quotes");
        assert!(lines[2].starts_with("caused by: "));
        assert!(lines.iter().all(|l| l.chars().count() <= 80));
    }
}
