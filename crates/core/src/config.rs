use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// # Summary
/// 配置错误，在访问任何数据之前即终止进程。
///
/// # Invariants
/// - 不经由 Notifier 上报（此时通知端点可能尚未确定）。
#[derive(Error, Debug)]
pub enum ConfigError {
    // 必填项缺失，携带对外可见的变量名
    #[error("Missing required configuration: {0}")]
    Missing(String),
    // 取值非法
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    // 配置源读取或反序列化失败
    #[error("Failed to load configuration: {0}")]
    Load(String),
}

/// 全局应用配置，进程启动时构建一次并以引用传入各组件。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub notify: NotifyConfig,
    pub sources: SourcesConfig,
    pub screen: ScreenConfig,
    pub logging: LoggingConfig,
}

/// # Summary
/// 对象存储（S3 兼容 / Cloudflare R2）连接配置。
///
/// # Invariants
/// - `account_id`、`access_key_id`、`secret_access_key`、`bucket` 均为必填。
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub account_id: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    pub region: String,
    // 为空时按 account_id 推导 R2 端点
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl StorageConfig {
    /// 返回实际使用的端点 URL。
    pub fn endpoint_url(&self) -> String {
        match self.endpoint.as_deref().map(str::trim) {
            Some(endpoint) if !endpoint.is_empty() => endpoint.to_string(),
            _ => format!("https://{}.r2.cloudflarestorage.com", self.account_id),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            account_id: String::new(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            bucket: String::new(),
            region: "auto".to_string(),
            endpoint: None,
            timeout_secs: 60,
        }
    }
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("account_id", &self.account_id)
            .field("access_key_id", &"<redacted>")
            .field("secret_access_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// 通知端配置。`webhook_url` 缺省时只写本地日志。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub webhook_url: Option<String>,
    pub max_chars: usize,
    pub timeout_secs: u64,
}

impl NotifyConfig {
    /// 返回去除空白后的有效 webhook 地址，空串视为未配置。
    pub fn webhook(&self) -> Option<&str> {
        self.webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            max_chars: 1900,
            timeout_secs: 10,
        }
    }
}

/// # Summary
/// 单个数据源的定位方式与列名映射。
///
/// # Invariants
/// - 列名候选按顺序匹配，取第一个存在于文件中的列。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceConfig {
    // 相对 bucket 根目录的 glob 模式，`*` 不跨目录，`**` 跨目录
    pub pattern: String,
    pub code_columns: Vec<String>,
    pub date_columns: Vec<String>,
    // 行情为收盘价，主档为公司名，财报为发行股数
    pub value_columns: Vec<String>,
}

impl SourceConfig {
    fn new(pattern: &str, code: &[&str], date: &[&str], value: &[&str]) -> Self {
        let owned = |names: &[&str]| -> Vec<String> { names.iter().map(|n| n.to_string()).collect() };
        Self {
            pattern: pattern.to_string(),
            code_columns: owned(code),
            date_columns: owned(date),
            value_columns: owned(value),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub quotes: SourceConfig,
    pub master: SourceConfig,
    pub financials: SourceConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            quotes: SourceConfig::new(
                "daily_quotes/**/*.parquet",
                &["Code"],
                &["Date"],
                &["Close", "C"],
            ),
            master: SourceConfig::new(
                "equities_master/**/*.parquet",
                &["Code"],
                &["Date"],
                &["CompanyName", "CoName"],
            ),
            financials: SourceConfig::new(
                "fins_summary/**/*.parquet",
                &["Code"],
                &["DisclosedDate", "DiscDate"],
                &[
                    "NumberOfIssuedAndOutstandingSharesAtTheEndOfFiscalYearIncludingTreasuryStock",
                    "ShOutFY",
                    "SharesOutstanding",
                ],
            ),
        }
    }
}

/// # Summary
/// 筛选策略参数。默认值即参考策略：40 日窗口、14 期 RSI、
/// 市值上限 300 亿、RSI 上限 30。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub window_days: u32,
    pub rsi_period: u32,
    pub market_cap_ceiling: f64,
    pub rsi_ceiling: f64,
    pub name_width: usize,
    // 市场所在时区（JST = +9），用于确定“运行当日”
    pub utc_offset_hours: i32,
}

impl ScreenConfig {
    /// 市场时区偏移，超出合法范围时返回 None。
    pub fn market_offset(&self) -> Option<FixedOffset> {
        self.utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
    }
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            window_days: 40,
            rsi_period: 14,
            market_cap_ceiling: 30_000_000_000.0,
            rsi_ceiling: 30.0,
            name_width: 10,
            utc_offset_hours: 9,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    // 设置后额外写入按日滚动的日志文件
    pub dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
        }
    }
}

impl AppConfig {
    /// # Summary
    /// 校验配置的完整性与取值范围。
    ///
    /// # Logic
    /// 1. 检查对象存储的四个必填项非空，缺失时报告对应的环境变量名。
    /// 2. 检查数值参数的取值范围。
    ///
    /// # Returns
    /// * 合法返回 `Ok(())`，否则返回首个发现的 `ConfigError`。
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("R2_ACCOUNT_ID", &self.storage.account_id),
            ("R2_ACCESS_KEY_ID", &self.storage.access_key_id),
            ("R2_SECRET_ACCESS_KEY", &self.storage.secret_access_key),
            ("R2_BUCKET_NAME", &self.storage.bucket),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing(name.to_string()));
            }
        }

        if self.notify.max_chars < 64 {
            return Err(ConfigError::Invalid(format!(
                "notify.max_chars must be at least 64, got {}",
                self.notify.max_chars
            )));
        }
        if self.screen.rsi_period == 0 {
            return Err(ConfigError::Invalid("screen.rsi_period must be positive".into()));
        }
        if self.screen.window_days == 0 {
            return Err(ConfigError::Invalid("screen.window_days must be positive".into()));
        }
        if self.screen.name_width == 0 {
            return Err(ConfigError::Invalid("screen.name_width must be positive".into()));
        }
        if !self.screen.market_cap_ceiling.is_finite() || !self.screen.rsi_ceiling.is_finite() {
            return Err(ConfigError::Invalid("screen thresholds must be finite".into()));
        }
        if self.screen.market_offset().is_none() {
            return Err(ConfigError::Invalid(format!(
                "screen.utc_offset_hours out of range: {}",
                self.screen.utc_offset_hours
            )));
        }
        for (name, source) in [
            ("quotes", &self.sources.quotes),
            ("master", &self.sources.master),
            ("financials", &self.sources.financials),
        ] {
            if source.pattern.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("sources.{name}.pattern is empty")));
            }
            if source.code_columns.is_empty()
                || source.date_columns.is_empty()
                || source.value_columns.is_empty()
            {
                return Err(ConfigError::Invalid(format!(
                    "sources.{name} needs at least one candidate per column"
                )));
            }
        }
        Ok(())
    }
}
