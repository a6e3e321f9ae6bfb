use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::GatewayError;

/// 一次结构化生成请求
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system_instruction: String,
    pub user_text: String,
    pub response_schema: Value,
    pub temperature: f32,
}

/// 外部文本生成服务
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// 返回模型输出的原始文本（应为符合 schema 的 JSON）
    async fn generate(&self, request: GenerationRequest) -> Result<String>;
}

// Gemini generateContent 请求结构
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub system_instruction: Content,
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: Value,
    pub temperature: f32,
}

// Gemini generateContent 响应结构
#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

impl GenerateContentRequest {
    pub fn from_generation(request: GenerationRequest) -> Self {
        GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: Some(request.system_instruction),
                }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(request.user_text),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: request.response_schema,
                temperature: request.temperature,
            },
        }
    }
}

impl GenerateContentResponse {
    /// 拼接第一个候选的全部文本片段
    pub fn into_text(self) -> Result<String> {
        let content = self
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .ok_or_else(|| anyhow!("no candidate returned from Gemini"))?;

        let text: String = content.parts.into_iter().filter_map(|part| part.text).collect();
        if text.trim().is_empty() {
            return Err(anyhow!("Gemini candidate contains no text"));
        }
        Ok(text)
    }
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: &ApiConfig, api_key: String) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .context("failed to build HTTP client")?;

        Ok(GeminiClient {
            client,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.clone(),
        })
    }

    /// 从环境变量读取凭证并创建客户端；凭证缺失返回配置错误
    pub fn from_env(config: &ApiConfig) -> Result<Self, GatewayError> {
        let api_key = match std::env::var(&config.api_key_env) {
            Ok(key) if !key.trim().is_empty() => key,
            _ => {
                return Err(GatewayError::Configuration(format!(
                    "environment variable {} is not set",
                    config.api_key_env
                )));
            }
        };

        GeminiClient::new(config, api_key)
            .map_err(|e| GatewayError::Configuration(format!("{:#}", e)))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> String {
        let model_path = if self.model.starts_with("models/") {
            self.model.clone()
        } else {
            format!("models/{}", self.model)
        };
        format!(
            "{}/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model_path
        )
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        let body = GenerateContentRequest::from_generation(request);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.as_str())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| e.without_url())
            .context("network request to Gemini failed")?;

        let status = response.status();
        let payload = response
            .text()
            .await
            .map_err(|e| e.without_url())
            .context("failed to read Gemini response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Gemini API error ({}): {}",
                status,
                extract_api_error(&payload)
            ));
        }

        debug!(bytes = payload.len(), model = %self.model, "received Gemini response");

        let parsed: GenerateContentResponse =
            serde_json::from_str(&payload).context("failed to parse Gemini response JSON")?;
        parsed.into_text()
    }
}

// 从错误响应体中提取可读信息
pub fn extract_api_error(body: &str) -> String {
    #[derive(Debug, Deserialize)]
    struct ErrorEnvelope {
        error: Option<ApiError>,
    }
    #[derive(Debug, Deserialize)]
    struct ApiError {
        message: Option<String>,
        status: Option<String>,
        code: Option<i64>,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(err) = parsed.error
    {
        let message = err.message.unwrap_or_else(|| "unknown error".to_string());
        let status = err.status.unwrap_or_else(|| "unknown".to_string());
        let code = err
            .code
            .map(|value| value.to_string())
            .unwrap_or_else(|| "none".to_string());
        return format!("{} (status={}, code={})", message, status, code);
    }
    body.to_string()
}
