//! 存储管理模块
//!
//! 提供可注入的键值存储能力和时钟能力，核心逻辑无需真实持久化环境即可测试。

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{TranslationError, TranslationResult};

/// 键值存储能力
///
/// 对应浏览器端localStorage的语义：按键读写字符串，删除不存在的键不算错误。
pub trait CacheStore {
    fn get(&self, key: &str) -> TranslationResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> TranslationResult<()>;
    fn remove(&self, key: &str) -> TranslationResult<()>;
}

/// 时钟能力，注入后可在测试中模拟时间流逝
pub trait Clock {
    /// 当前时间的epoch毫秒数
    fn now_millis(&self) -> u64;
}

/// 系统时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// 内存存储
///
/// 克隆后共享同一份数据，主要用于测试和一次性会话。
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> TranslationResult<Option<String>> {
        let entries = self.entries.read().unwrap();
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> TranslationResult<()> {
        let mut entries = self.entries.write().unwrap();
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> TranslationResult<()> {
        let mut entries = self.entries.write().unwrap();
        entries.remove(key);
        Ok(())
    }
}

/// 文件存储
///
/// 所有条目保存在单个JSON对象文件中，每次操作读改写整个文件。
/// 文件不存在视为空存储。
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> TranslationResult<HashMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                serde_json::from_str(&content).map_err(TranslationError::from)
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(error) => Err(TranslationError::Storage(error.to_string())),
        }
    }

    fn write_all(&self, entries: &HashMap<String, String>) -> TranslationResult<()> {
        let serialized = serde_json::to_string(entries)?;
        fs::write(&self.path, serialized).map_err(TranslationError::from)
    }
}

impl CacheStore for FileStore {
    fn get(&self, key: &str) -> TranslationResult<Option<String>> {
        let entries = self.read_all()?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> TranslationResult<()> {
        let mut entries = self.read_all().unwrap_or_default();
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> TranslationResult<()> {
        let mut entries = match self.read_all() {
            Ok(entries) => entries,
            // 读不出来就没有可删的条目
            Err(_) => return Ok(()),
        };
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);

        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap(), Some("1".to_string()));

        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);

        // 删除不存在的键不算错误
        store.remove("missing").unwrap();
    }

    #[test]
    fn test_memory_store_shared_on_clone() {
        let store = MemoryStore::new();
        let shared = store.clone();

        store.set("key", "value").unwrap();
        assert_eq!(shared.get("key").unwrap(), Some("value".to_string()));
    }

    #[test]
    fn test_file_store_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("cache.json"));

        assert_eq!(store.get("anything").unwrap(), None);
        store.remove("anything").unwrap();
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let store = FileStore::new(&path);

        store.set("translation_cache", "{}").unwrap();
        store.set("translation_cache_expiry", "12345").unwrap();

        // 重新打开同一文件仍可读到
        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get("translation_cache_expiry").unwrap(),
            Some("12345".to_string())
        );

        reopened.remove("translation_cache").unwrap();
        assert_eq!(reopened.get("translation_cache").unwrap(), None);
    }

    #[test]
    fn test_file_store_malformed_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "not json at all").unwrap();

        let store = FileStore::new(&path);
        assert!(store.get("translation_cache").is_err());
    }

    #[test]
    fn test_system_clock_monotonic_enough() {
        let clock = SystemClock;
        let now = clock.now_millis();
        // 2020-01-01之后
        assert!(now > 1_577_836_800_000);
    }
}
