// 列表偏好存储
//
// 每个列表领域保存一份偏好快照：
// - MemoryPreferenceStore: 进程内存储（moka）
// - JsonFilePreferenceStore: 单个 JSON 文件，按领域名索引

use async_trait::async_trait;
use moka::future::Cache;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;

use crate::models::{ListDomain, PreferenceSnapshot};
use crate::services::error::PreferenceError;

/// 偏好存储接口
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get(&self, domain: ListDomain) -> Result<Option<PreferenceSnapshot>, PreferenceError>;
    async fn set(&self, domain: ListDomain, snapshot: PreferenceSnapshot) -> Result<(), PreferenceError>;
}

/// 内存偏好存储
#[derive(Clone)]
pub struct MemoryPreferenceStore {
    cache: Cache<ListDomain, PreferenceSnapshot>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self {
            cache: Cache::new(ListDomain::ALL.len() as u64),
        }
    }
}

impl Default for MemoryPreferenceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn get(&self, domain: ListDomain) -> Result<Option<PreferenceSnapshot>, PreferenceError> {
        Ok(self.cache.get(&domain).await)
    }

    async fn set(&self, domain: ListDomain, snapshot: PreferenceSnapshot) -> Result<(), PreferenceError> {
        self.cache.insert(domain, snapshot).await;
        Ok(())
    }
}

/// JSON 文件偏好存储
///
/// 整个文件是一个对象，键为领域名（`scenes`、`performers` ...）。
/// 每次写入都会重写整个文件。
pub struct JsonFilePreferenceStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, PreferenceSnapshot>>,
}

impl JsonFilePreferenceStore {
    /// 默认偏好文件路径
    pub const DEFAULT_PATH: &'static str = "list_preferences.json";

    /// 加载偏好文件
    ///
    /// # 行为
    /// - 文件不存在时返回空存储，首次写入时创建
    /// - 文件损坏时返回空存储并记录警告，下次写入会覆盖
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, PreferenceError> {
        let path = path.into();

        let entries = if fs::try_exists(&path).await? {
            let content = fs::read_to_string(&path).await?;
            match serde_json::from_str::<BTreeMap<String, PreferenceSnapshot>>(&content) {
                Ok(entries) => {
                    tracing::info!("Loaded list preferences from {:?}", path);
                    entries
                }
                Err(e) => {
                    tracing::warn!("偏好文件损坏，使用空偏好: {}", e);
                    BTreeMap::new()
                }
            }
        } else {
            tracing::info!("偏好文件不存在，使用空偏好: {:?}", path);
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn save(&self, entries: &BTreeMap<String, PreferenceSnapshot>) -> Result<(), PreferenceError> {
        let json = serde_json::to_string_pretty(entries)?;

        // 确保父目录存在
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !fs::try_exists(parent).await? {
                fs::create_dir_all(parent).await?;
            }
        }

        fs::write(&self.path, json).await?;
        tracing::debug!("Saved list preferences to {:?}", self.path);
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for JsonFilePreferenceStore {
    async fn get(&self, domain: ListDomain) -> Result<Option<PreferenceSnapshot>, PreferenceError> {
        let entries = self.entries.read().await;
        Ok(entries.get(domain.as_str()).cloned())
    }

    async fn set(&self, domain: ListDomain, snapshot: PreferenceSnapshot) -> Result<(), PreferenceError> {
        let mut entries = self.entries.write().await;
        entries.insert(domain.as_str().to_string(), snapshot);
        self.save(&entries).await
    }
}
