use kabu_core::config::ScreenConfig;

/// # Summary
/// 价值/动量联合筛选条件。
///
/// # Invariants
/// - 两个上限均为闭区间：等于上限视为通过。
/// - 任一输入缺失或非有限值时一律拒绝，不会被当作 0 而误通过。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPolicy {
    pub market_cap_ceiling: f64,
    pub rsi_ceiling: f64,
}

impl ScreenPolicy {
    pub fn from_config(config: &ScreenConfig) -> Self {
        Self {
            market_cap_ceiling: config.market_cap_ceiling,
            rsi_ceiling: config.rsi_ceiling,
        }
    }

    /// 判断一只证券是否通过筛选。
    pub fn accepts(&self, market_cap: f64, rsi: Option<f64>) -> bool {
        let Some(rsi) = rsi.filter(|v| v.is_finite()) else {
            return false;
        };
        market_cap.is_finite() && market_cap <= self.market_cap_ceiling && rsi <= self.rsi_ceiling
    }
}

impl Default for ScreenPolicy {
    fn default() -> Self {
        Self::from_config(&ScreenConfig::default())
    }
}
