use crate::market::entity::JoinedRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// # Summary
/// 单只通过筛选的证券，仅在一次运行期间存在。
///
/// # Invariants
/// - `name` 为去除首尾空白的完整公司名，缺失时退化为代码；显示宽度的截断由报告渲染负责。
/// - `price` 为收盘价的整数截断值。
/// - `market_cap` 与 `rsi` 保留原始精度，由报告渲染时统一舍入。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub code: String,
    pub name: String,
    pub price: f64,
    pub market_cap: f64,
    pub rsi: f64,
}

impl ScreeningResult {
    /// # Summary
    /// 由证券最新一条关联记录与其最新 RSI 构造结果。
    ///
    /// # Logic
    /// 1. 公司名缺失或为空白时使用代码。
    /// 2. 收盘价向零截断。
    ///
    /// # Arguments
    /// * `latest`: 该证券窗口内日期最大的记录。
    /// * `rsi`: 该证券最新的 RSI 值。
    ///
    /// # Returns
    /// 新的 `ScreeningResult`。
    pub fn from_latest(latest: &JoinedRecord, rsi: f64) -> Self {
        let full_name = latest
            .company_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&latest.code);
        Self {
            code: latest.code.clone(),
            name: full_name.to_string(),
            price: latest.close.trunc(),
            market_cap: latest.market_cap,
            rsi,
        }
    }
}

/// # Summary
/// 一次筛选运行的终态。三种终态对运维人员必须可区分。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScreenOutcome {
    // 过滤前即没有任何关联记录
    NoData,
    // 有数据但没有证券通过筛选
    NoMatches { reference_date: NaiveDate },
    // 通过筛选的证券，按 RSI 升序
    Matches {
        reference_date: NaiveDate,
        results: Vec<ScreeningResult>,
    },
}
