use thiserror::Error;

/// # Summary
/// 通知投递错误枚举。调用方只记录日志，从不重试、从不向上升级。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
#[derive(Error, Debug)]
pub enum NotifyError {
    /// 网络连接、超时或传输错误
    #[error("Network error: {0}")]
    Network(String),

    /// 客户端构建失败或端点非法
    #[error("Configuration error: {0}")]
    Config(String),

    /// Webhook 返回了非成功状态
    #[error("Platform error: {0}")]
    Platform(String),
}
