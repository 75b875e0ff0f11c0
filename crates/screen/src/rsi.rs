/// # Summary
/// Wilder 平滑的相对强弱指数（RSI）计算器。
///
/// # Invariants
/// - 至少需要 `period + 1` 个收盘价（即 `period` 个价格变动）。
/// - 首个平均值为前 `period` 个变动的简单平均，其后按 `1/period` 权重平滑。
/// - 输出值始终位于 [0, 100]。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rsi {
    // 回溯周期
    period: u32,
}

impl Rsi {
    pub fn new(period: u32) -> Self {
        Self { period }
    }

    /// 计算一个 RSI 值所需的最少观测数。
    pub fn min_observations(&self) -> usize {
        usize::try_from(self.period)
            .unwrap_or(usize::MAX)
            .saturating_add(1)
    }

    /// # Summary
    /// 计算完整的 RSI 序列。
    ///
    /// # Logic
    /// 1. 观测不足、周期为 0 或存在非有限价格时返回空序列。
    /// 2. 计算逐期价格变动并拆分为涨幅与跌幅。
    /// 3. 以前 `period` 期的简单平均作为初值，之后逐期 Wilder 平滑。
    /// 4. 每期得到一个值；涨跌均为 0 的期无法定义，记为 `None`。
    ///
    /// # Arguments
    /// * `closes`: 按日期升序的收盘价。
    ///
    /// # Returns
    /// 从第 `period + 1` 个观测开始、每期一个的 RSI，长度为 `closes.len() - period`。
    pub fn series(&self, closes: &[f64]) -> Vec<Option<f64>> {
        let Ok(period) = usize::try_from(self.period) else {
            return Vec::new();
        };
        if period == 0 || closes.len() < self.min_observations() {
            return Vec::new();
        }
        if closes.iter().any(|c| !c.is_finite()) {
            return Vec::new();
        }

        let weight = f64::from(self.period);
        let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

        let (gain_sum, loss_sum) = deltas[..period]
            .iter()
            .fold((0.0, 0.0), |(g, l), d| (g + d.max(0.0), l + (-d).max(0.0)));
        let mut avg_gain = gain_sum / weight;
        let mut avg_loss = loss_sum / weight;

        let mut values = Vec::with_capacity(deltas.len() - period + 1);
        values.push(relative_strength_index(avg_gain, avg_loss));
        for delta in &deltas[period..] {
            avg_gain = (avg_gain * (weight - 1.0) + delta.max(0.0)) / weight;
            avg_loss = (avg_loss * (weight - 1.0) + (-delta).max(0.0)) / weight;
            values.push(relative_strength_index(avg_gain, avg_loss));
        }
        values
    }

    /// 最新一期的 RSI；无法计算时返回 `None`（该证券被跳过）。
    pub fn latest(&self, closes: &[f64]) -> Option<f64> {
        self.series(closes).last().copied().flatten()
    }
}

/// # Summary
/// 由平均涨幅与平均跌幅得出 RSI。
///
/// # Logic
/// 1. 平均跌幅为 0：若平均涨幅也为 0 则无定义，否则饱和为 100。
/// 2. 否则 `RSI = 100 - 100 / (1 + gain / loss)`。
pub fn relative_strength_index(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        return (avg_gain > 0.0).then_some(100.0);
    }
    let rs = avg_gain / avg_loss;
    let value = 100.0 - 100.0 / (1.0 + rs);
    value.is_finite().then(|| value.clamp(0.0, 100.0))
}
