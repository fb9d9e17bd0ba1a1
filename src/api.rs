//! 翻译API接口模块
//!
//! 定义与远程翻译服务之间的JSON协议，以及基于reqwest的HTTP实现。
//! 字段名遵循服务端的camelCase约定。

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{TranslationError, TranslationResult};

/// 单条翻译请求
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest<'a> {
    pub text: &'a str,
    pub target_lang: &'a str,
}

/// 单条翻译响应
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    /// 翻译结果，缺失时按响应格式错误处理
    #[serde(default)]
    pub translated_text: Option<String>,
}

/// 批量翻译请求
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchTranslateRequest<'a> {
    pub texts: &'a [String],
    pub target_lang: &'a str,
}

/// 批量翻译响应
///
/// 兼容旧版服务端只返回单条translatedText的退化格式。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchTranslateResponse {
    #[serde(default)]
    pub translated_texts: Option<Vec<String>>,
    #[serde(default)]
    pub translated_text: Option<String>,
}

impl BatchTranslateResponse {
    /// 归一化为译文列表，退化格式按长度1的列表处理
    ///
    /// 两个字段都缺失时返回None。列表长度是否与请求匹配由调用方校验。
    pub fn into_list(self) -> Option<Vec<String>> {
        match self.translated_texts {
            Some(list) => Some(list),
            None => self.translated_text.map(|text| vec![text]),
        }
    }
}

/// 翻译服务接口
///
/// 抽象出网络层，客户端逻辑可用脚本化实现进行测试。
#[allow(async_fn_in_trait)]
pub trait TranslationApi {
    /// 翻译单条文本
    async fn translate(
        &self,
        text: &str,
        target_lang: &str,
    ) -> TranslationResult<TranslateResponse>;

    /// 批量翻译，一次请求携带多条文本
    async fn translate_batch(
        &self,
        texts: &[String],
        target_lang: &str,
    ) -> TranslationResult<BatchTranslateResponse>;
}

/// 基于reqwest的HTTP实现
///
/// 超时等传输层行为由底层客户端负责，这里不做重试。
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpApi {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> TranslationResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    async fn post<B, R>(&self, body: &B) -> TranslationResult<R>
    where
        B: Serialize,
        R: for<'de> Deserialize<'de>,
    {
        let response = self.client.post(&self.endpoint).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::Status(status.as_u16()));
        }

        Ok(response.json::<R>().await?)
    }
}

impl TranslationApi for HttpApi {
    async fn translate(
        &self,
        text: &str,
        target_lang: &str,
    ) -> TranslationResult<TranslateResponse> {
        self.post(&TranslateRequest { text, target_lang }).await
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        target_lang: &str,
    ) -> TranslationResult<BatchTranslateResponse> {
        self.post(&BatchTranslateRequest { texts, target_lang })
            .await
    }
}
