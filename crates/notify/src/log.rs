use async_trait::async_trait;
use kabu_core::notify::error::NotifyError;
use kabu_core::notify::port::Notifier;
use tracing::info;

/// # Summary
/// 未配置通知端点时使用的 Notifier：不做任何投递，只写本地日志。
///
/// # Invariants
/// - 永远返回 `Ok(())`，流水线不会因未配置通知而失败。
#[derive(Debug, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, subject: &str, content: &str) -> Result<(), NotifyError> {
        info!(subject, "Notification target not configured, skipping delivery:\n{}", content);
        Ok(())
    }
}
