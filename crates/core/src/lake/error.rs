use thiserror::Error;

/// # Summary
/// 数据湖访问错误枚举，覆盖连接、列举、下载与文件解码等故障。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
#[derive(Error, Debug)]
pub enum LakeError {
    // 客户端构建失败（端点、凭证、bucket 非法）
    #[error("Configuration error: {0}")]
    Config(String),
    // 网络或对象存储服务错误
    #[error("Network error: {0}")]
    Network(String),
    // glob 模式未匹配到任何对象，视为必需数据源缺失
    #[error("No objects match pattern: {0}")]
    NoObjects(String),
    // 文件内容无法按 parquet 解码
    #[error("Format error in {location}: {message}")]
    Format { location: String, message: String },
    // glob 模式本身非法
    #[error("Invalid pattern {pattern}: {message}")]
    Pattern { pattern: String, message: String },
}
