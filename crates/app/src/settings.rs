use config::{Config, Environment, File};
use kabu_core::config::{AppConfig, ConfigError};
use std::collections::HashMap;

/// 指定配置文件路径的环境变量；缺省时查找工作目录下的 `kabu.{toml,yaml,json}`。
pub const CONFIG_PATH_VAR: &str = "KABU_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "kabu";

// 部署环境沿用的扁平变量名 -> 配置键
const FLAT_OVERRIDES: [(&str, &str); 5] = [
    ("R2_ACCOUNT_ID", "storage.account_id"),
    ("R2_ACCESS_KEY_ID", "storage.access_key_id"),
    ("R2_SECRET_ACCESS_KEY", "storage.secret_access_key"),
    ("R2_BUCKET_NAME", "storage.bucket"),
    ("DISCORD_WEBHOOK_URL", "notify.webhook_url"),
];

/// # Summary
/// 按层叠顺序构建并校验应用配置。
///
/// # Logic
/// 1. 以 `AppConfig::default()` 为最底层。
/// 2. 叠加可选的配置文件。
/// 3. 叠加 `KABU__SECTION__KEY` 形式的环境变量。
/// 4. 以扁平变量名（`R2_*`、`DISCORD_WEBHOOK_URL`）覆盖，空值忽略。
/// 5. 反序列化并执行 `AppConfig::validate`。
///
/// # Arguments
/// * `env`: 进程环境变量快照，测试中可传入任意映射。
///
/// # Returns
/// 校验通过的配置，或 `ConfigError`。
pub fn load(env: &HashMap<String, String>) -> Result<AppConfig, ConfigError> {
    let file = env
        .get(CONFIG_PATH_VAR)
        .map(String::as_str)
        .unwrap_or(DEFAULT_CONFIG_FILE);
    let defaults = Config::try_from(&AppConfig::default()).map_err(load_error)?;

    let mut builder = Config::builder()
        .add_source(defaults)
        .add_source(File::with_name(file).required(false))
        .add_source(
            Environment::with_prefix("KABU")
                .separator("__")
                .try_parsing(true)
                .source(Some(env.clone())),
        );
    for (var, key) in FLAT_OVERRIDES {
        if let Some(value) = env.get(var).map(|v| v.trim()).filter(|v| !v.is_empty()) {
            builder = builder.set_override(key, value.to_string()).map_err(load_error)?;
        }
    }

    let config: AppConfig = builder
        .build()
        .and_then(|built| built.try_deserialize())
        .map_err(load_error)?;
    config.validate()?;
    Ok(config)
}

fn load_error(e: config::ConfigError) -> ConfigError {
    ConfigError::Load(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn credentials() -> Vec<(&'static str, &'static str)> {
        vec![
            ("R2_ACCOUNT_ID", "acct"),
            ("R2_ACCESS_KEY_ID", "key"),
            ("R2_SECRET_ACCESS_KEY", "secret"),
            ("R2_BUCKET_NAME", "jquants"),
            ("KABU_CONFIG", "does-not-exist"),
        ]
    }

    #[test]
    fn test_flat_variables_fill_storage_and_webhook() {
        let mut pairs = credentials();
        pairs.push(("DISCORD_WEBHOOK_URL", "https://discord.test/api/webhooks/1/x"));
        let config = load(&env(&pairs)).unwrap();

        assert_eq!(config.storage.account_id, "acct");
        assert_eq!(config.storage.bucket, "jquants");
        assert_eq!(config.storage.region, "auto");
        assert_eq!(config.notify.webhook(), Some("https://discord.test/api/webhooks/1/x"));
        assert_eq!(config.screen.rsi_period, 14);
    }

    #[test]
    fn test_missing_credentials_is_config_error() {
        let result = load(&env(&[("KABU_CONFIG", "does-not-exist")]));
        match result {
            Err(ConfigError::Missing(name)) => assert_eq!(name, "R2_ACCOUNT_ID"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_prefixed_variables_override_defaults() {
        let mut pairs = credentials();
        pairs.push(("KABU__SCREEN__RSI_CEILING", "25"));
        pairs.push(("KABU__SCREEN__WINDOW_DAYS", "60"));
        pairs.push(("KABU__STORAGE__ENDPOINT", "http://localhost:9000"));
        let config = load(&env(&pairs)).unwrap();

        assert_eq!(config.screen.rsi_ceiling, 25.0);
        assert_eq!(config.screen.window_days, 60);
        assert_eq!(config.storage.endpoint_url(), "http://localhost:9000");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut pairs = credentials();
        pairs.push(("KABU__NOTIFY__MAX_CHARS", "10"));
        assert!(matches!(load(&env(&pairs)), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_blank_webhook_means_unconfigured() {
        let mut pairs = credentials();
        pairs.push(("DISCORD_WEBHOOK_URL", "   "));
        assert!(load(&env(&pairs)).unwrap().notify.webhook().is_none());
    }
}
