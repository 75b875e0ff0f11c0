mod logging;
mod settings;

use kabu_core::common::time::RealTimeProvider;
use kabu_core::notify::port::Notifier;
use kabu_lake::object::ObjectLake;
use kabu_notify::discord::DiscordNotifier;
use kabu_notify::log::LogNotifier;
use kabu_screen::job::{report_failure, run_job};
use kabu_screen::pipeline::Screener;
use std::collections::HashMap;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

// 配置错误在访问任何数据前退出，与流水线故障区分
const CONFIG_FAILURE: u8 = 2;

/// # Summary
/// 定时任务入口，纯粹的装配层。
///
/// # Logic
/// 1. 加载 `.env` 与层叠配置，失败时以退出码 2 结束。
/// 2. 初始化日志。
/// 3. 构建通知端：配置了 webhook 用 Discord，否则只写日志。
/// 4. 构建数据湖与流水线，运行一次并把状态映射为退出码。
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("failed to read .env: {e}");
        }
    }

    let env: HashMap<String, String> = std::env::vars().collect();
    let config = match settings::load(&env) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("kabu: {e}");
            return ExitCode::from(CONFIG_FAILURE);
        }
    };
    let _log_guard = logging::init(&config.logging);
    info!("Kabu screening job starting (bucket {})", config.storage.bucket);

    let notifier = build_notifier(&config.notify);
    let status = match ObjectLake::from_config(&config.storage) {
        Ok(lake) => {
            let screener = Screener::new(Arc::new(lake), Arc::new(RealTimeProvider), &config);
            run_job(&screener, notifier.as_ref()).await
        }
        Err(e) => report_failure(notifier.as_ref(), &e).await,
    };

    info!("Kabu screening job finished: {:?}", status);
    ExitCode::from(status)
}

fn build_notifier(config: &kabu_core::config::NotifyConfig) -> Box<dyn Notifier> {
    let Some(url) = config.webhook() else {
        info!("DISCORD_WEBHOOK_URL not set, reports are only logged");
        return Box::new(LogNotifier::new());
    };
    match DiscordNotifier::new(
        url.to_string(),
        config.max_chars,
        Duration::from_secs(config.timeout_secs),
    ) {
        Ok(notifier) => Box::new(notifier),
        Err(e) => {
            warn!("Discord notifier unavailable, falling back to log output: {}", e);
            Box::new(LogNotifier::new())
        }
    }
}
