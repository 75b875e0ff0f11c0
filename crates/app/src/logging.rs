use kabu_core::config::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

// 依赖库的连接池、TLS 等日志默认压到 warn
const NOISY_MODULES: [&str; 5] = ["hyper", "hyper_util", "reqwest", "h2", "rustls"];
const LOG_FILE_PREFIX: &str = "kabu.log";

/// # Summary
/// 初始化全局日志订阅器。
///
/// # Logic
/// 1. `RUST_LOG` 优先，否则使用配置的级别并抑制噪声模块。
/// 2. 始终输出到标准输出。
/// 3. 配置了 `dir` 时额外写入按日滚动的文件（非阻塞写入）。
///
/// # Returns
/// 文件写入器的 guard，须持有到进程结束以保证日志落盘。
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directives = NOISY_MODULES
            .iter()
            .fold(config.level.clone(), |acc, module| format!("{acc},{module}=warn"));
        EnvFilter::new(directives)
    });

    let (file_layer, guard) = match config.dir.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(dir) => {
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX));
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .try_init();
    if let Err(e) = installed {
        eprintln!("logging already initialized: {e}");
    }
    guard
}
