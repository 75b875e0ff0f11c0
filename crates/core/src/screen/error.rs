use crate::lake::error::LakeError;
use thiserror::Error;

/// # Summary
/// 筛选流水线的故障。数据质量缺口（历史不足、股数缺失等）不属于错误，
/// 它们以 `Option` 或 `ScreenOutcome` 的终态表达。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
#[derive(Error, Debug)]
pub enum ScreenError {
    // 数据湖访问失败
    #[error("Data lake error: {0}")]
    Lake(#[from] LakeError),
    // 文件缺少必需列或列类型无法转换
    #[error("Decode error in {location}: {message}")]
    Decode { location: String, message: String },
}
