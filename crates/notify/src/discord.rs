use crate::payload::fit_payload;
use async_trait::async_trait;
use kabu_core::notify::error::NotifyError;
use kabu_core::notify::port::Notifier;
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// # Summary
/// 通过 Discord Webhook 发送通知的实现。
///
/// # Invariants
/// * `webhook_url` 必须是完整的 Webhook 地址。
/// * 仅 HTTP 204 视为投递成功。
/// * 发送的正文不超过 `max_chars` 个字符。
pub struct DiscordNotifier {
    /// Webhook 地址
    webhook_url: String,
    /// 单条消息的字符上限
    max_chars: usize,
    /// 带超时的 HTTP 客户端
    client: reqwest::Client,
}

/// # Summary
/// Discord Webhook 请求体。
#[derive(Serialize)]
struct WebhookMessage {
    content: String,
}

impl DiscordNotifier {
    /// # Summary
    /// 创建一个新的 `DiscordNotifier`。
    ///
    /// # Logic
    /// 构建带请求超时的 HTTP 客户端。
    ///
    /// # Arguments
    /// * `webhook_url` - Discord Webhook 地址。
    /// * `max_chars` - 单条消息的字符上限。
    /// * `timeout` - 单次请求超时。
    ///
    /// # Returns
    /// * 新的 `DiscordNotifier`，客户端构建失败时返回 `NotifyError::Config`。
    pub fn new(webhook_url: String, max_chars: usize, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            webhook_url,
            max_chars,
            client,
        })
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    /// # Summary
    /// 向配置的 Webhook 发送通知。
    ///
    /// # Logic
    /// 1. 拼接粗体标题与正文，并截断到字符上限。
    /// 2. 以 JSON `{"content": ...}` 发送 POST 请求。
    /// 3. 204 返回成功，其余状态连同响应体返回平台错误。
    ///
    /// # Returns
    /// * `Ok(())` 表示投递成功。
    /// * `Err(NotifyError)` 表示网络错误或平台拒绝。
    async fn notify(&self, subject: &str, content: &str) -> Result<(), NotifyError> {
        let text = format!("**{}**\n{}", subject, content);
        let payload = WebhookMessage {
            content: fit_payload(&text, self.max_chars),
        };

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::NO_CONTENT {
            let error_text = response.text().await.unwrap_or_default();
            return Err(NotifyError::Platform(format!(
                "Discord webhook returned {}: {}",
                status, error_text
            )));
        }

        debug!(chars = payload.content.chars().count(), "Discord notification delivered");
        Ok(())
    }
}
