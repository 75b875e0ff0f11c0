use chrono::NaiveDate;
use kabu_core::common::TrailingWindow;
use kabu_core::market::entity::{FinancialsRow, JoinedRecord, MasterRow, QuoteRow};
use std::collections::BTreeMap;
use tracing::debug;

/// # Summary
/// 将窗口内的行情与当期参考数据关联，计算市值。
///
/// # Invariants
/// - 只保留 `window` 内的行情；同一 (code, date) 重复时后出现者胜出。
/// - 财报为内连接：没有快照或最新快照股数为 `None` 的证券整体排除。
/// - 主档为左连接：缺少主档时公司名为 `None`。
/// - `market_cap = close * shares_outstanding`。
/// - 输出按 (code, date) 升序。
///
/// # Arguments
/// * `quotes`: 原始行情行。
/// * `window`: 运行当日的回溯窗口。
/// * `masters`: 已解析的最新主档。
/// * `financials`: 已解析的最新财报。
///
/// # Returns
/// 关联后的记录，可能为空（“无数据”终态，不是错误）。
pub fn join_quotes(
    quotes: Vec<QuoteRow>,
    window: &TrailingWindow,
    masters: &BTreeMap<String, MasterRow>,
    financials: &BTreeMap<String, FinancialsRow>,
) -> Vec<JoinedRecord> {
    let mut in_window: BTreeMap<(String, NaiveDate), f64> = BTreeMap::new();
    for quote in quotes {
        if window.contains(quote.date) {
            in_window.insert((quote.code, quote.date), quote.close);
        }
    }

    let mut excluded = 0usize;
    let records: Vec<JoinedRecord> = in_window
        .into_iter()
        .filter_map(|((code, date), close)| {
            let Some(shares) = financials.get(&code).and_then(|f| f.shares_outstanding) else {
                excluded += 1;
                return None;
            };
            let company_name = masters.get(&code).and_then(|m| m.company_name.clone());
            Some(JoinedRecord {
                date,
                code,
                close,
                company_name,
                market_cap: close * shares,
            })
        })
        .collect();

    debug!(
        joined = records.len(),
        excluded_without_shares = excluded,
        "Quotes joined with reference data"
    );
    records
}
