//! 翻译模块统一错误处理
//!
//! 错误只在内部流转，用于区分降级原因和日志记录；
//! 公共翻译接口的边界上所有错误都映射回原文（静默降级）。

use thiserror::Error;

/// 翻译错误类型
#[derive(Error, Debug, Clone)]
pub enum TranslationError {
    /// 存储错误
    #[error("存储错误: {0}")]
    Storage(String),

    /// 网络错误
    #[error("网络错误: {0}")]
    Network(String),

    /// 翻译服务返回非成功状态
    #[error("翻译服务返回状态 {0}")]
    Status(u16),

    /// 响应缺少翻译结果字段
    #[error("响应缺少翻译结果字段")]
    InvalidResponse,

    /// 批量响应条数与待翻译批次不一致
    #[error("批量响应条数不匹配: 期望 {expected}, 实际 {got}")]
    LengthMismatch { expected: usize, got: usize },

    /// 序列化错误
    #[error("序列化错误: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for TranslationError {
    fn from(error: reqwest::Error) -> Self {
        TranslationError::Network(error.to_string())
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(error: serde_json::Error) -> Self {
        TranslationError::Serialization(error.to_string())
    }
}

impl From<std::io::Error> for TranslationError {
    fn from(error: std::io::Error) -> Self {
        TranslationError::Storage(error.to_string())
    }
}

/// 错误结果类型别名
pub type TranslationResult<T> = Result<T, TranslationError>;
