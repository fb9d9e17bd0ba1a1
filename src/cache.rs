//! 翻译缓存模块
//!
//! 缓存是一个 "text|lang" 到译文的映射，整个映射共享单一过期时间戳：
//! 当前时间一旦超过该时间戳，整个映射在下一次读写前被整体丢弃。
//! 每次成功写入会把过期时间刷新为当前时间加上有效期。
//!
//! 持久化存储中只占两个条目：序列化后的映射和过期时间戳字符串。
//! 存储的缺失或损坏一律按空缓存处理，不向上传播。

use std::collections::{HashMap, HashSet};

use crate::config::constants;
use crate::storage::{CacheStore, Clock};

/// 生成缓存键，格式为 text|lang 的字面拼接
pub fn cache_key(text: &str, target_lang: &str) -> String {
    format!("{}{}{}", text, constants::CACHE_KEY_SEPARATOR, target_lang)
}

/// 缓存统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// 缓存的不同键数量
    pub size: usize,
    /// 共享过期时间戳（epoch毫秒），未设置时为None
    pub expires_at: Option<u64>,
    /// 缓存键中出现过的目标语言集合
    pub languages: HashSet<String>,
}

/// 翻译缓存
///
/// 存储和时钟均为注入的能力，过期判断不依赖真实墙钟。
pub struct TranslationCache<S, C> {
    store: S,
    clock: C,
    ttl_millis: u64,
}

impl<S: CacheStore, C: Clock> TranslationCache<S, C> {
    pub fn new(store: S, clock: C, ttl_millis: u64) -> Self {
        Self {
            store,
            clock,
            ttl_millis,
        }
    }

    /// 读取整个缓存映射
    ///
    /// 过期时丢弃持久化条目并返回空映射；过期时间缺失或无法解析时
    /// 持久化内容视为损坏，同样按空缓存处理。
    pub fn load(&self) -> HashMap<String, String> {
        let expires_at = match self.store.get(constants::EXPIRY_STORAGE_KEY) {
            Ok(Some(raw)) => raw.trim().parse::<u64>().ok(),
            Ok(None) => None,
            Err(error) => {
                tracing::warn!("读取缓存过期时间失败: {}", error);
                None
            }
        };

        match expires_at {
            Some(timestamp) if self.clock.now_millis() <= timestamp => {}
            Some(_) => {
                tracing::debug!("翻译缓存已过期，整体丢弃");
                self.discard();
                return HashMap::new();
            }
            None => {
                self.discard();
                return HashMap::new();
            }
        }

        match self.store.get(constants::CACHE_STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(error) => {
                    tracing::warn!("翻译缓存内容损坏，按空缓存处理: {}", error);
                    HashMap::new()
                }
            },
            Ok(None) => HashMap::new(),
            Err(error) => {
                tracing::warn!("读取翻译缓存失败: {}", error);
                HashMap::new()
            }
        }
    }

    /// 持久化整个映射并刷新过期时间
    ///
    /// 写入失败只记录日志；译文仍会返回给调用方，只是不被缓存。
    pub fn save(&self, entries: &HashMap<String, String>) {
        let serialized = match serde_json::to_string(entries) {
            Ok(serialized) => serialized,
            Err(error) => {
                tracing::warn!("序列化翻译缓存失败: {}", error);
                return;
            }
        };

        if let Err(error) = self.store.set(constants::CACHE_STORAGE_KEY, &serialized) {
            tracing::warn!("写入翻译缓存失败: {}", error);
            return;
        }

        let expires_at = self.clock.now_millis() + self.ttl_millis;
        if let Err(error) = self
            .store
            .set(constants::EXPIRY_STORAGE_KEY, &expires_at.to_string())
        {
            tracing::warn!("写入缓存过期时间失败: {}", error);
        }
    }

    /// 清空缓存，映射和过期时间一并删除
    pub fn clear(&self) {
        self.discard();
    }

    /// 只读统计：键数量、共享过期时间、出现过的目标语言
    ///
    /// 不触发过期淘汰，已过期的映射按空缓存上报但不删除持久化条目。
    pub fn stats(&self) -> CacheStats {
        let expires_at = self
            .store
            .get(constants::EXPIRY_STORAGE_KEY)
            .ok()
            .flatten()
            .and_then(|raw| raw.trim().parse::<u64>().ok());

        let valid = match expires_at {
            Some(timestamp) => self.clock.now_millis() <= timestamp,
            None => false,
        };
        if !valid {
            return CacheStats::default();
        }

        let entries: HashMap<String, String> = self
            .store
            .get(constants::CACHE_STORAGE_KEY)
            .ok()
            .flatten()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();

        let languages = entries
            .keys()
            .filter_map(|key| {
                key.rsplit_once(constants::CACHE_KEY_SEPARATOR)
                    .map(|(_, lang)| lang.to_string())
            })
            .collect();

        CacheStats {
            size: entries.len(),
            expires_at,
            languages,
        }
    }

    fn discard(&self) {
        if let Err(error) = self.store.remove(constants::CACHE_STORAGE_KEY) {
            tracing::debug!("删除翻译缓存条目失败: {}", error);
        }
        if let Err(error) = self.store.remove(constants::EXPIRY_STORAGE_KEY) {
            tracing::debug!("删除缓存过期条目失败: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    const WEEK_MS: u64 = 7 * 24 * 60 * 60 * 1000;

    /// 手动时钟，测试中模拟时间流逝
    #[derive(Clone, Default)]
    struct ManualClock {
        now: Arc<AtomicU64>,
    }

    impl ManualClock {
        fn advance(&self, millis: u64) {
            self.now.fetch_add(millis, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_millis(&self) -> u64 {
            self.now.load(Ordering::SeqCst)
        }
    }

    fn test_cache() -> (TranslationCache<MemoryStore, ManualClock>, MemoryStore, ManualClock) {
        let store = MemoryStore::new();
        let clock = ManualClock::default();
        let cache = TranslationCache::new(store.clone(), clock.clone(), WEEK_MS);
        (cache, store, clock)
    }

    #[test]
    fn test_cache_key_format() {
        assert_eq!(cache_key("Sweetness", "fr"), "Sweetness|fr");
        // 文本本身包含分隔符时语言码仍取最后一段
        assert_eq!(cache_key("a|b", "fr"), "a|b|fr");
    }

    #[test]
    fn test_empty_store_loads_empty() {
        let (cache, _, _) = test_cache();
        assert!(cache.load().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let (cache, _, _) = test_cache();

        let mut entries = HashMap::new();
        entries.insert(cache_key("Sweetness", "fr"), "Douceur".to_string());
        cache.save(&entries);

        let loaded = cache.load();
        assert_eq!(loaded.get("Sweetness|fr"), Some(&"Douceur".to_string()));
    }

    #[test]
    fn test_expiry_discards_whole_mapping() {
        let (cache, store, clock) = test_cache();

        let mut entries = HashMap::new();
        entries.insert(cache_key("Ice", "fr"), "Glace".to_string());
        cache.save(&entries);

        // 有效期内可读
        clock.advance(WEEK_MS);
        assert_eq!(cache.load().len(), 1);

        // 刚好超过过期时间后整体失效，持久化条目被丢弃
        clock.advance(1);
        assert!(cache.load().is_empty());
        assert_eq!(
            store.get(constants::CACHE_STORAGE_KEY).unwrap(),
            None
        );
        assert_eq!(
            store.get(constants::EXPIRY_STORAGE_KEY).unwrap(),
            None
        );
    }

    #[test]
    fn test_write_refreshes_expiry() {
        let (cache, store, clock) = test_cache();

        cache.save(&HashMap::new());
        let first_expiry: u64 = store
            .get(constants::EXPIRY_STORAGE_KEY)
            .unwrap()
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(first_expiry, WEEK_MS);

        clock.advance(1000);
        cache.save(&HashMap::new());
        let second_expiry: u64 = store
            .get(constants::EXPIRY_STORAGE_KEY)
            .unwrap()
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(second_expiry, WEEK_MS + 1000);
    }

    #[test]
    fn test_malformed_mapping_treated_as_empty() {
        let (cache, store, _) = test_cache();

        store.set(constants::CACHE_STORAGE_KEY, "{{{not json").unwrap();
        store.set(constants::EXPIRY_STORAGE_KEY, &WEEK_MS.to_string()).unwrap();

        assert!(cache.load().is_empty());
    }

    #[test]
    fn test_mapping_without_expiry_treated_as_empty() {
        let (cache, store, _) = test_cache();

        store
            .set(constants::CACHE_STORAGE_KEY, r#"{"Ice|fr":"Glace"}"#)
            .unwrap();

        // 过期时间缺失，持久化内容视为损坏
        assert!(cache.load().is_empty());
    }

    #[test]
    fn test_clear_removes_both_entries() {
        let (cache, store, _) = test_cache();

        let mut entries = HashMap::new();
        entries.insert(cache_key("Ice", "fr"), "Glace".to_string());
        cache.save(&entries);

        cache.clear();
        assert_eq!(store.get(constants::CACHE_STORAGE_KEY).unwrap(), None);
        assert_eq!(store.get(constants::EXPIRY_STORAGE_KEY).unwrap(), None);
        assert!(cache.load().is_empty());
    }

    #[test]
    fn test_stats_counts_keys_and_languages() {
        let (cache, _, _) = test_cache();

        let mut entries = HashMap::new();
        entries.insert(cache_key("Ice", "fr"), "Glace".to_string());
        entries.insert(cache_key("Toppings", "fr"), "Garnitures".to_string());
        entries.insert(cache_key("Ice", "de"), "Eis".to_string());
        cache.save(&entries);

        let stats = cache.stats();
        assert_eq!(stats.size, 3);
        assert_eq!(stats.expires_at, Some(WEEK_MS));
        assert_eq!(
            stats.languages,
            HashSet::from(["fr".to_string(), "de".to_string()])
        );
    }

    #[test]
    fn test_stats_does_not_mutate_store() {
        let (cache, store, clock) = test_cache();

        let mut entries = HashMap::new();
        entries.insert(cache_key("Ice", "fr"), "Glace".to_string());
        cache.save(&entries);

        clock.advance(WEEK_MS + 1);

        // 过期后统计按空缓存上报，但条目仍留在存储中
        let stats = cache.stats();
        assert_eq!(stats, CacheStats::default());
        assert!(store.get(constants::CACHE_STORAGE_KEY).unwrap().is_some());
    }
}
