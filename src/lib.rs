//! # Menu Translate
//!
//! 点餐应用界面文本的翻译缓存与批量客户端库。
//!
//! 针对远程翻译端点提供两个主要操作：翻译单条文本、翻译有序文本列表。
//! 两者都透明地查询并填充按(文本, 目标语言)作键的持久化缓存，
//! 批量请求部分失败时回退到逐条翻译。任何失败最终降级为返回原文，
//! 调用方（购物车、支付选择等界面）永远不会收到错误。
//!
//! ## 模块组织
//!
//! - `api` - 翻译服务接口和HTTP协议实现
//! - `cache` - 带共享过期时间戳的翻译缓存
//! - `client` - 翻译客户端（单条、批量、回退）
//! - `config` - 配置管理
//! - `error` - 错误处理
//! - `storage` - 可注入的键值存储和时钟能力
//!
//! ## 基本用法
//!
//! ```rust,no_run
//! use menu_translate::{TranslationClient, TranslationConfig};
//!
//! # async fn example() {
//! let client = TranslationClient::create_default(TranslationConfig::default()).unwrap();
//!
//! let label = client.translate_one("Sweetness", "fr").await;
//! let options = client
//!     .translate_batch(&["Ice".to_string(), "Toppings".to_string()], "fr")
//!     .await;
//! # let _ = (label, options);
//! # }
//! ```

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod storage;

// Re-export commonly used items for convenience
pub use api::{HttpApi, TranslationApi};
pub use cache::{cache_key, CacheStats, TranslationCache};
pub use client::{ClientStats, ClientStatsSnapshot, TranslationClient};
pub use config::{constants, TranslationConfig};
pub use error::{TranslationError, TranslationResult};
pub use storage::{CacheStore, Clock, FileStore, MemoryStore, SystemClock};

/// 便利函数：翻译单条文本
///
/// 内部创建使用默认文件存储的客户端。客户端创建失败时同样降级为原文。
pub async fn translate_text(text: &str, target_lang: &str, api_url: Option<&str>) -> String {
    let config = TranslationConfig::default_with_url(api_url);
    match TranslationClient::create_default(config) {
        Ok(client) => client.translate_one(text, target_lang).await,
        Err(error) => {
            tracing::warn!("创建翻译客户端失败: {}", error);
            text.to_string()
        }
    }
}

/// 便利函数：批量翻译有序文本列表
///
/// 返回值与输入等长且顺序一致。
pub async fn translate_texts(
    texts: &[String],
    target_lang: &str,
    api_url: Option<&str>,
) -> Vec<String> {
    let config = TranslationConfig::default_with_url(api_url);
    match TranslationClient::create_default(config) {
        Ok(client) => client.translate_batch(texts, target_lang).await,
        Err(error) => {
            tracing::warn!("创建翻译客户端失败: {}", error);
            texts.to_vec()
        }
    }
}
