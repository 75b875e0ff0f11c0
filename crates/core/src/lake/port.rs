use crate::lake::entity::{LakeObject, LakeTable};
use crate::lake::error::LakeError;
use async_trait::async_trait;

/// # Summary
/// 数据湖读取接口：将 glob 模式展开为对象列表，并把单个对象加载为内存表。
///
/// # Invariants
/// - `resolve` 的结果按 `location` 升序排列，保证下游处理顺序确定。
/// - 实现必须为 I/O 设置有限的超时。
#[async_trait]
pub trait DataLake: Send + Sync {
    /// # Summary
    /// 展开 glob 模式。
    ///
    /// # Logic
    /// 1. 以模式中首个通配符之前的目录作为前缀列举对象。
    /// 2. 保留与模式完全匹配的对象，并推断其日期。
    /// 3. 按路径升序返回。
    ///
    /// # Arguments
    /// * `pattern`: 相对 bucket 根目录的 glob 模式。
    ///
    /// # Returns
    /// 成功返回对象列表（可能为空），失败返回 `LakeError`。
    async fn resolve(&self, pattern: &str) -> Result<Vec<LakeObject>, LakeError>;

    /// # Summary
    /// 加载单个对象为 Arrow 记录批。
    ///
    /// # Arguments
    /// * `object`: 由 `resolve` 返回的对象。
    ///
    /// # Returns
    /// 成功返回记录批列表，失败返回 `LakeError`。
    async fn load(&self, object: &LakeObject) -> Result<LakeTable, LakeError>;
}
