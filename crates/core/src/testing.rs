//! 供下游 crate 测试使用的内存实现。

use crate::lake::entity::{LakeObject, LakeTable};
use crate::lake::error::LakeError;
use crate::lake::port::DataLake;
use crate::notify::error::NotifyError;
use crate::notify::port::Notifier;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

/// # Summary
/// 内存数据湖：按模式登记对象，`resolve` 按模式原样查找，不做 glob 匹配。
///
/// # Invariants
/// - 同一模式下的对象按路径升序返回。
#[derive(Default)]
pub struct StaticLake {
    objects: HashMap<String, BTreeMap<String, LakeTable>>,
    failing: HashSet<String>,
    loads: Mutex<Vec<String>>,
}

impl StaticLake {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在模式下登记一个对象及其内容。
    pub fn with_object(mut self, pattern: &str, location: &str, table: LakeTable) -> Self {
        self.objects
            .entry(pattern.to_string())
            .or_default()
            .insert(location.to_string(), table);
        self
    }

    /// 令该模式的 `resolve` 返回网络错误。
    pub fn failing(mut self, pattern: &str) -> Self {
        self.failing.insert(pattern.to_string());
        self
    }

    /// 已被加载过的对象路径，按加载顺序。
    pub fn loaded(&self) -> Vec<String> {
        self.loads
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl DataLake for StaticLake {
    async fn resolve(&self, pattern: &str) -> Result<Vec<LakeObject>, LakeError> {
        if self.failing.contains(pattern) {
            return Err(LakeError::Network(format!("unreachable: {pattern}")));
        }
        Ok(self
            .objects
            .get(pattern)
            .map(|objects| objects.keys().map(LakeObject::new).collect())
            .unwrap_or_default())
    }

    async fn load(&self, object: &LakeObject) -> Result<LakeTable, LakeError> {
        self.loads
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(object.location.clone());
        self.objects
            .values()
            .find_map(|objects| objects.get(&object.location))
            .cloned()
            .ok_or_else(|| LakeError::Network(format!("missing object: {}", object.location)))
    }
}

/// # Summary
/// 记录所有通知的 Notifier，可配置为总是投递失败。
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// 每次投递都返回平台错误，但仍记录内容。
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// 已记录的 (subject, content) 列表。
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, subject: &str, content: &str) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((subject.to_string(), content.to_string()));
        if self.fail {
            return Err(NotifyError::Platform("500 Internal Server Error".to_string()));
        }
        Ok(())
    }
}
