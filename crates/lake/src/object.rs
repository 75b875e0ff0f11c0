use crate::pattern::LakePattern;
use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use kabu_core::config::StorageConfig;
use kabu_core::lake::entity::{LakeObject, LakeTable};
use kabu_core::lake::error::LakeError;
use kabu_core::lake::port::DataLake;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path;
use object_store::{ClientOptions, ObjectMeta, ObjectStore};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// # Summary
/// 基于 `object_store` 的数据湖实现，读取 bucket 中的 parquet 文件。
///
/// # Invariants
/// - 所有对象路径均相对于 bucket 根目录。
/// - 生产环境的客户端带有请求超时与连接超时。
#[derive(Clone)]
pub struct ObjectLake {
    /// 底层对象存储
    store: Arc<dyn ObjectStore>,
}

impl ObjectLake {
    /// 使用任意对象存储构造（测试中常用 `InMemory`）。
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// # Summary
    /// 按存储配置构造 S3 兼容（Cloudflare R2）客户端。
    ///
    /// # Logic
    /// 1. 配置请求超时，连接超时取其与 10 秒中的较小值。
    /// 2. 以路径风格访问端点，注入 bucket 与凭证。
    ///
    /// # Arguments
    /// * `config`: 已校验的存储配置。
    ///
    /// # Returns
    /// 成功返回 `ObjectLake`，配置非法时返回 `LakeError::Config`。
    pub fn from_config(config: &StorageConfig) -> Result<Self, LakeError> {
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let options = ClientOptions::new()
            .with_timeout(timeout)
            .with_connect_timeout(timeout.min(Duration::from_secs(10)));

        let store = AmazonS3Builder::new()
            .with_endpoint(config.endpoint_url())
            .with_region(config.region.as_str())
            .with_bucket_name(config.bucket.as_str())
            .with_access_key_id(config.access_key_id.as_str())
            .with_secret_access_key(config.secret_access_key.as_str())
            .with_client_options(options)
            .build()
            .map_err(|e| LakeError::Config(e.to_string()))?;

        Ok(Self::new(Arc::new(store)))
    }
}

#[async_trait]
impl DataLake for ObjectLake {
    /// # Summary
    /// 展开 glob 模式为对象列表。
    ///
    /// # Logic
    /// 1. 解析模式并取得字面前缀。
    /// 2. 以前缀递归列举对象。
    /// 3. 过滤出完整匹配的路径，按路径升序返回。
    async fn resolve(&self, pattern: &str) -> Result<Vec<LakeObject>, LakeError> {
        let pattern = LakePattern::parse(pattern)?;
        let prefix = pattern.prefix().trim_end_matches('/');
        let prefix = (!prefix.is_empty()).then(|| Path::from(prefix));

        let metas: Vec<ObjectMeta> = self
            .store
            .list(prefix.as_ref())
            .try_collect()
            .await
            .map_err(|e| LakeError::Network(e.to_string()))?;
        let listed = metas.len();

        let mut objects: Vec<LakeObject> = metas
            .into_iter()
            .map(|meta| meta.location.to_string())
            .filter(|location| pattern.matches(location))
            .map(LakeObject::new)
            .collect();
        objects.sort();

        debug!(pattern = %pattern, listed, matched = objects.len(), "Pattern resolved");
        Ok(objects)
    }

    /// # Summary
    /// 下载对象并按 parquet 解码。
    async fn load(&self, object: &LakeObject) -> Result<LakeTable, LakeError> {
        let path = Path::parse(&object.location)
            .unwrap_or_else(|_| Path::from(object.location.as_str()));

        let bytes = self
            .store
            .get(&path)
            .await
            .map_err(|e| LakeError::Network(format!("{}: {}", object.location, e)))?
            .bytes()
            .await
            .map_err(|e| LakeError::Network(format!("{}: {}", object.location, e)))?;

        let table = decode_parquet(&object.location, bytes)?;
        debug!(
            location = %object.location,
            batches = table.len(),
            rows = table.iter().map(|b| b.num_rows()).sum::<usize>(),
            "Object loaded"
        );
        Ok(table)
    }
}

/// # Summary
/// 将完整的 parquet 文件内容解码为 Arrow 记录批。
///
/// # Arguments
/// * `location`: 对象路径，仅用于错误信息。
/// * `bytes`: 文件内容。
///
/// # Returns
/// 成功返回记录批列表，文件损坏时返回 `LakeError::Format`。
pub fn decode_parquet(location: &str, bytes: Bytes) -> Result<LakeTable, LakeError> {
    let format_error = |message: String| LakeError::Format {
        location: location.to_string(),
        message,
    };

    let reader = ParquetRecordBatchReaderBuilder::try_new(bytes)
        .map_err(|e| format_error(e.to_string()))?
        .build()
        .map_err(|e| format_error(e.to_string()))?;

    reader
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format_error(e.to_string()))
}
