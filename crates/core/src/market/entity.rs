use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// # Summary
/// 日线行情行，来自每日行情数据源。
///
/// # Invariants
/// - 每个 (code, date) 仅一行。
/// - `close` 为正数。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRow {
    // 交易日
    pub date: NaiveDate,
    // 证券代码
    pub code: String,
    // 收盘价
    pub close: f64,
}

/// # Summary
/// 上市公司主档快照行。同一代码可能存在多个历史快照，仅 `as_of` 最大者有效。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterRow {
    pub code: String,
    // 公司名称，可能缺失
    pub company_name: Option<String>,
    // 快照适用日
    pub as_of: NaiveDate,
}

/// # Summary
/// 财报摘要快照行。同一代码可能存在多次披露，仅 `disclosed` 最大者有效。
///
/// # Invariants
/// - `shares_outstanding` 无法解析时为 `None`，绝不以 0 代替。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialsRow {
    pub code: String,
    // 披露日
    pub disclosed: NaiveDate,
    // 期末发行股数（含库存股）
    pub shares_outstanding: Option<f64>,
}

/// # Summary
/// 行情与当期参考数据关联后的记录。
///
/// # Invariants
/// - `market_cap == close * shares_outstanding`，均取自本次运行的最新值。
/// - 集合内按 (code, date) 升序排列。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedRecord {
    pub date: NaiveDate,
    pub code: String,
    pub close: f64,
    pub company_name: Option<String>,
    pub market_cap: f64,
}
