use crate::filter::ScreenPolicy;
use crate::join::join_quotes;
use crate::report::ReportFormatter;
use crate::rsi::Rsi;
use crate::snapshot::resolve_latest;
use crate::source::{Decoded, decode_financials, decode_master, decode_quotes};
use arrow::array::RecordBatch;
use chrono::{Offset, Utc};
use kabu_core::common::TrailingWindow;
use kabu_core::common::time::TimeProvider;
use kabu_core::config::{AppConfig, ScreenConfig, SourceConfig, SourcesConfig};
use kabu_core::lake::entity::LakeObject;
use kabu_core::lake::error::LakeError;
use kabu_core::lake::port::DataLake;
use kabu_core::market::entity::JoinedRecord;
use kabu_core::screen::entity::{ScreenOutcome, ScreeningResult};
use kabu_core::screen::error::ScreenError;
use std::sync::Arc;
use tracing::{debug, info, warn};

type Decoder<T> = fn(&str, &[RecordBatch], &SourceConfig) -> Result<Decoded<T>, ScreenError>;

/// # Summary
/// 筛选流水线：读取 → 快照解析 → 关联 → RSI → 过滤。
///
/// # Invariants
/// - 一次 `run` 只读取数据湖快照，不持有跨运行的状态。
/// - 数据质量缺口以 `ScreenOutcome` 表达，只有访问/解码故障返回 `Err`。
pub struct Screener {
    // 数据湖驱动
    lake: Arc<dyn DataLake>,
    // 时钟，决定“运行当日”
    clock: Arc<dyn TimeProvider>,
    sources: SourcesConfig,
    screen: ScreenConfig,
}

impl Screener {
    pub fn new(lake: Arc<dyn DataLake>, clock: Arc<dyn TimeProvider>, config: &AppConfig) -> Self {
        Self {
            lake,
            clock,
            sources: config.sources.clone(),
            screen: config.screen.clone(),
        }
    }

    /// 与本流水线参数一致的报告渲染器。
    pub fn formatter(&self) -> ReportFormatter {
        ReportFormatter::new(&self.screen)
    }

    /// 以市场时区的当日为终点的回溯窗口。
    pub fn window(&self) -> TrailingWindow {
        let offset = self.screen.market_offset().unwrap_or_else(|| Utc.fix());
        TrailingWindow::ending_at(self.clock.today(offset), self.screen.window_days)
    }

    /// # Summary
    /// 执行一次完整筛选。
    ///
    /// # Logic
    /// 1. 计算回溯窗口，加载日期不早于窗口起点的行情文件（每个带日期的文件只含当日行情，
    ///    文件名日期等于窗口起点的文件照常加载）。
    /// 2. 加载主档与财报并各自解析出每个代码的最新快照。
    /// 3. 关联并计算市值；无记录时返回 `NoData`。
    /// 4. 按代码分组计算 RSI，历史不足或无法计算的证券跳过。
    /// 5. 以最新一条记录套用筛选条件，结果按 RSI 升序。
    ///
    /// # Returns
    /// * `Ok(ScreenOutcome)`：三种终态之一。
    /// * `Err(ScreenError)`：数据源不可达、无匹配文件或文件无法解码。
    pub async fn run(&self) -> Result<ScreenOutcome, ScreenError> {
        let window = self.window();
        info!("Screening window {}", window);

        let quotes = self
            .load_source("quotes", &self.sources.quotes, decode_quotes, |object| {
                object.date.is_none_or(|date| date >= window.start)
            })
            .await?;
        if quotes.is_empty() {
            info!("No quote rows loaded, nothing to screen");
            return Ok(ScreenOutcome::NoData);
        }

        let masters = self
            .load_source("master", &self.sources.master, decode_master, |_| true)
            .await?;
        let financials = self
            .load_source("financials", &self.sources.financials, decode_financials, |_| true)
            .await?;
        if financials.is_empty() {
            info!("No financial rows loaded, market cap cannot be derived");
            return Ok(ScreenOutcome::NoData);
        }

        let masters = resolve_latest(masters);
        let financials = resolve_latest(financials);
        let records = join_quotes(quotes, &window, &masters, &financials);
        let Some(reference_date) = records.iter().map(|r| r.date).max() else {
            info!("No joined records inside {}", window);
            return Ok(ScreenOutcome::NoData);
        };

        let results = self.screen_records(&records);
        info!(
            "Screening finished: {} securities matched, reference date {}",
            results.len(),
            reference_date
        );
        if results.is_empty() {
            Ok(ScreenOutcome::NoMatches { reference_date })
        } else {
            Ok(ScreenOutcome::Matches {
                reference_date,
                results,
            })
        }
    }

    // records 必须按 (code, date) 升序
    fn screen_records(&self, records: &[JoinedRecord]) -> Vec<ScreeningResult> {
        let rsi = Rsi::new(self.screen.rsi_period);
        let policy = ScreenPolicy::from_config(&self.screen);

        let mut results = Vec::new();
        for group in records.chunk_by(|a, b| a.code == b.code) {
            let Some(latest) = group.last() else {
                continue;
            };
            if group.len() < rsi.min_observations() {
                debug!(
                    "Skipping {}: {} observations, {} required",
                    latest.code,
                    group.len(),
                    rsi.min_observations()
                );
                continue;
            }
            let closes: Vec<f64> = group.iter().map(|r| r.close).collect();
            let Some(value) = rsi.latest(&closes) else {
                debug!("Skipping {}: RSI undefined", latest.code);
                continue;
            };
            if policy.accepts(latest.market_cap, Some(value)) {
                results.push(ScreeningResult::from_latest(latest, value));
            }
        }
        results.sort_by(|a, b| a.rsi.total_cmp(&b.rsi).then_with(|| a.code.cmp(&b.code)));
        results
    }

    /// # Summary
    /// 解析模式、逐个加载并解码一个数据源的全部文件。
    ///
    /// # Logic
    /// 1. 模式无匹配对象视为故障（`LakeError::NoObjects`）。
    /// 2. `keep` 返回 false 的对象不加载。
    /// 3. 汇总被跳过与无法转换的行数并记录日志。
    async fn load_source<T>(
        &self,
        name: &str,
        source: &SourceConfig,
        decode: Decoder<T>,
        keep: impl Fn(&LakeObject) -> bool,
    ) -> Result<Vec<T>, ScreenError> {
        let objects = self.lake.resolve(&source.pattern).await?;
        if objects.is_empty() {
            return Err(LakeError::NoObjects(source.pattern.clone()).into());
        }

        let selected: Vec<&LakeObject> = objects.iter().filter(|object| keep(*object)).collect();
        debug!(
            "Source {}: {} objects matched, {} selected",
            name,
            objects.len(),
            selected.len()
        );

        let mut rows = Vec::new();
        let (mut skipped, mut uncoerced) = (0usize, 0usize);
        for object in selected {
            let table = self.lake.load(object).await?;
            let decoded = decode(&object.location, &table, source)?;
            skipped += decoded.skipped;
            uncoerced += decoded.uncoerced;
            rows.extend(decoded.rows);
        }

        if uncoerced > 0 {
            warn!("Source {}: {} rows with values that could not be coerced", name, uncoerced);
        }
        info!("Source {}: {} rows loaded, {} rows skipped", name, rows.len(), skipped);
        Ok(rows)
    }
}
