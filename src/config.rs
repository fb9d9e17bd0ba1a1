//! 翻译配置管理模块
//!
//! 提供简化的配置管理，支持环境变量覆盖和默认值

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 配置常量
pub mod constants {
    use std::time::Duration;

    // 默认API设置
    pub const DEFAULT_API_URL: &str = "http://localhost:3000/api/translate";
    pub const DEFAULT_SOURCE_LANG: &str = "en";
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    // 缓存设置
    pub const CACHE_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60); // 7天
    pub const DEFAULT_CACHE_FILE: &str = "translation-cache.json";

    // 持久化存储中的两个条目键：序列化后的映射和过期时间戳
    pub const CACHE_STORAGE_KEY: &str = "translation_cache";
    pub const EXPIRY_STORAGE_KEY: &str = "translation_cache_expiry";

    // 缓存键分隔符，键格式为 text|lang 的字面拼接
    pub const CACHE_KEY_SEPARATOR: char = '|';

    // 环境变量名
    pub const ENV_API_URL: &str = "MENU_TRANSLATE_API_URL";
    pub const ENV_SOURCE_LANG: &str = "MENU_TRANSLATE_SOURCE_LANG";
    pub const ENV_CACHE_FILE: &str = "MENU_TRANSLATE_CACHE_FILE";
}

/// 翻译配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// 源语言（默认语言），目标语言与其相同时不翻译
    pub source_lang: String,
    /// 翻译API地址
    pub api_url: String,
    /// 缓存文件路径
    pub cache_file: PathBuf,
    /// 缓存有效期，每次写入后整体刷新
    pub cache_ttl: Duration,
    /// 单次请求超时时间
    pub request_timeout: Duration,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            source_lang: constants::DEFAULT_SOURCE_LANG.to_string(),
            api_url: constants::DEFAULT_API_URL.to_string(),
            cache_file: PathBuf::from(constants::DEFAULT_CACHE_FILE),
            cache_ttl: constants::CACHE_TTL,
            request_timeout: constants::DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl TranslationConfig {
    /// 使用可选的API地址创建默认配置
    pub fn default_with_url(api_url: Option<&str>) -> Self {
        let mut config = Self::default();
        if let Some(url) = api_url {
            config.api_url = url.to_string();
        }
        config
    }

    /// 从环境变量加载配置，未设置的项使用默认值
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var(constants::ENV_API_URL) {
            if !url.is_empty() {
                config.api_url = url;
            }
        }
        if let Ok(lang) = std::env::var(constants::ENV_SOURCE_LANG) {
            if !lang.is_empty() {
                config.source_lang = lang;
            }
        }
        if let Ok(path) = std::env::var(constants::ENV_CACHE_FILE) {
            if !path.is_empty() {
                config.cache_file = PathBuf::from(path);
            }
        }

        config
    }

    /// 缓存有效期的毫秒数
    pub fn cache_ttl_millis(&self) -> u64 {
        self.cache_ttl.as_millis() as u64
    }
}
