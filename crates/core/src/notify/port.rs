use crate::notify::error::NotifyError;
use async_trait::async_trait;

/// # Summary
/// 向外部聊天端点推送文本的接口定义。
///
/// # Invariants
/// - 实现必须是 `Send` 和 `Sync`。
/// - 超出传输上限的内容由实现负责截断，且截断标记不可丢失。
/// - 投递是一次性的：实现不做重试。
#[async_trait]
pub trait Notifier: Send + Sync {
    /// # Summary
    /// 发送带有标题和正文的通知。
    ///
    /// # Logic
    /// 1. 按目标平台要求拼接标题与正文。
    /// 2. 必要时截断到平台上限。
    /// 3. 通过底层传输发送并返回投递结果。
    ///
    /// # Arguments
    /// * `subject` - 通知标题。
    /// * `content` - 通知正文（报告或错误摘要）。
    ///
    /// # Returns
    /// * 成功返回 `Ok(())`。
    /// * 失败返回 `Err(NotifyError)`。
    async fn notify(&self, subject: &str, content: &str) -> Result<(), NotifyError>;
}
