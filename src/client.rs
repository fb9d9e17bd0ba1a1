//! 翻译客户端核心实现
//!
//! 协调缓存查询、网络请求和批量到逐条的回退流程。对外的翻译接口
//! 永远不抛错：任何失败路径最终都降级为返回原文，最坏的可观察结果
//! 是界面显示未翻译的文本。
//!
//! 每次调用内的缓存生命周期是「读取整个映射、在本地副本上修改、
//! 整体写回」；多个逻辑调用方之间不做同步，持久化映射上的
//! 后写覆盖是可接受的（缓存是优化而非正确性来源）。

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::api::{HttpApi, TranslationApi};
use crate::cache::{cache_key, CacheStats, TranslationCache};
use crate::config::TranslationConfig;
use crate::error::{TranslationError, TranslationResult};
use crate::storage::{CacheStore, Clock, FileStore, SystemClock};

/// 翻译客户端
///
/// API、存储和时钟均为注入的能力，便于在无网络、无持久化环境下测试。
pub struct TranslationClient<A, S, C> {
    api: A,
    cache: TranslationCache<S, C>,
    config: TranslationConfig,
    stats: ClientStats,
}

impl TranslationClient<HttpApi, FileStore, SystemClock> {
    /// 使用默认的HTTP实现、文件存储和系统时钟创建客户端
    pub fn create_default(config: TranslationConfig) -> TranslationResult<Self> {
        let api = HttpApi::new(config.api_url.clone(), config.request_timeout)?;
        let store = FileStore::new(config.cache_file.clone());
        Ok(Self::new(config, api, store, SystemClock))
    }
}

impl<A: TranslationApi, S: CacheStore, C: Clock> TranslationClient<A, S, C> {
    pub fn new(config: TranslationConfig, api: A, store: S, clock: C) -> Self {
        let ttl_millis = config.cache_ttl_millis();
        Self {
            api,
            cache: TranslationCache::new(store, clock, ttl_millis),
            config,
            stats: ClientStats::default(),
        }
    }

    /// 翻译单条文本
    ///
    /// 目标语言等于源语言、或文本/目标语言为空时直接返回原文，
    /// 不访问缓存也不发请求。缓存命中时零网络调用。
    /// 翻译失败静默降级为原文，不向调用方抛错。
    pub async fn translate_one(&self, text: &str, target_lang: &str) -> String {
        if self.is_identity(text, target_lang) {
            return text.to_string();
        }

        let mut entries = self.cache.load();
        let key = cache_key(text, target_lang);

        if let Some(hit) = entries.get(&key) {
            self.stats.inc_cache_hits();
            return hit.clone();
        }
        self.stats.inc_cache_misses();

        match self.request_one(text, target_lang).await {
            Ok(translated) => {
                entries.insert(key, translated.clone());
                self.cache.save(&entries);
                translated
            }
            Err(error) => {
                self.stats.inc_errors();
                tracing::warn!("翻译失败，返回原文: {}", error);
                text.to_string()
            }
        }
    }

    /// 批量翻译，输出与输入等长且顺序一致
    ///
    /// 先按缓存命中情况分组，命中的就地填充；未命中的按原始顺序
    /// 组成一次批量请求。批量请求失败或响应条数不匹配时，回退到
    /// 按原始下标顺序逐条翻译，单条失败只影响自己的位置。
    /// 批量成功时整批只持久化一次。
    pub async fn translate_batch(&self, texts: &[String], target_lang: &str) -> Vec<String> {
        if texts.is_empty() || target_lang.is_empty() || target_lang == self.config.source_lang {
            return texts.to_vec();
        }

        let mut entries = self.cache.load();
        let mut result: Vec<String> = texts.to_vec();
        let mut pending: Vec<usize> = Vec::new();

        for (index, text) in texts.iter().enumerate() {
            match entries.get(&cache_key(text, target_lang)) {
                Some(hit) => {
                    self.stats.inc_cache_hits();
                    result[index] = hit.clone();
                }
                None => {
                    self.stats.inc_cache_misses();
                    pending.push(index);
                }
            }
        }

        if pending.is_empty() {
            return result;
        }

        let pending_texts: Vec<String> = pending.iter().map(|&index| texts[index].clone()).collect();

        match self.request_batch(&pending_texts, target_lang).await {
            Ok(translated) => {
                for (&index, translated_text) in pending.iter().zip(translated) {
                    entries.insert(cache_key(&texts[index], target_lang), translated_text.clone());
                    result[index] = translated_text;
                }
                // 整批完成后只写回一次
                self.cache.save(&entries);
            }
            Err(error) => {
                self.stats.inc_fallbacks();
                tracing::warn!("批量翻译失败，回退到逐条翻译: {}", error);
                for &index in &pending {
                    // 逐条路径自带缓存读写和降级，单条失败不影响其他位置
                    result[index] = self.translate_one(&texts[index], target_lang).await;
                }
            }
        }

        result
    }

    /// 清空缓存，映射和过期时间一并丢弃，无失败模式
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// 只读缓存统计
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// 客户端运行统计
    pub fn stats(&self) -> &ClientStats {
        &self.stats
    }

    fn is_identity(&self, text: &str, target_lang: &str) -> bool {
        text.is_empty() || target_lang.is_empty() || target_lang == self.config.source_lang
    }

    async fn request_one(&self, text: &str, target_lang: &str) -> TranslationResult<String> {
        self.stats.inc_single_requests();
        let response = self.api.translate(text, target_lang).await?;
        response
            .translated_text
            .ok_or(TranslationError::InvalidResponse)
    }

    /// 批量请求并校验位置对应关系
    ///
    /// 响应条数与待翻译批次不一致时视为硬错误，由调用方走逐条回退，
    /// 而不是按退化格式把单条译文错位分配给整个批次。
    async fn request_batch(
        &self,
        texts: &[String],
        target_lang: &str,
    ) -> TranslationResult<Vec<String>> {
        self.stats.inc_batch_requests();
        let response = self.api.translate_batch(texts, target_lang).await?;
        let translated = response
            .into_list()
            .ok_or(TranslationError::InvalidResponse)?;

        if translated.len() != texts.len() {
            return Err(TranslationError::LengthMismatch {
                expected: texts.len(),
                got: translated.len(),
            });
        }

        Ok(translated)
    }
}

/// 客户端运行统计（线程安全）
///
/// 使用原子计数器，读写不加锁。只用于观察，不影响翻译行为。
#[derive(Debug, Default)]
pub struct ClientStats {
    cache_hits: AtomicUsize,
    cache_misses: AtomicUsize,
    single_requests: AtomicUsize,
    batch_requests: AtomicUsize,
    fallbacks: AtomicUsize,
    errors: AtomicUsize,
}

impl ClientStats {
    fn inc_cache_hits(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    fn inc_cache_misses(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    fn inc_single_requests(&self) {
        self.single_requests.fetch_add(1, Ordering::Relaxed);
    }

    fn inc_batch_requests(&self) {
        self.batch_requests.fetch_add(1, Ordering::Relaxed);
    }

    fn inc_fallbacks(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    fn inc_errors(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// 获取统计数据的一致性快照
    pub fn snapshot(&self) -> ClientStatsSnapshot {
        ClientStatsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            single_requests: self.single_requests.load(Ordering::Relaxed),
            batch_requests: self.batch_requests.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// 客户端统计数据的不可变快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientStatsSnapshot {
    /// 缓存命中次数
    pub cache_hits: usize,
    /// 缓存未命中次数
    pub cache_misses: usize,
    /// 单条翻译请求次数
    pub single_requests: usize,
    /// 批量翻译请求次数
    pub batch_requests: usize,
    /// 批量失败触发逐条回退的次数
    pub fallbacks: usize,
    /// 降级为原文的错误次数
    pub errors: usize,
}

impl ClientStatsSnapshot {
    /// 计算缓存命中率
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}
