use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, ResultExt};
use crate::services::ProviderConfig;

/// 文本生成 provider 的最小接口
///
/// 解析与校验只依赖这里返回的纯文本，换 provider 或模型不需要改动它们。
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, prompt: &str) -> AppResult<String>;

    fn model(&self) -> &str;
}

/// Gemini `generateContent` 客户端
#[derive(Clone)]
pub struct LlmService {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl LlmService {
    /// 没有 API Key 时返回 None
    pub fn from_config(client: Client, config: &ProviderConfig) -> Option<Self> {
        let api_key = config.api_key.as_deref()?.trim();
        if api_key.is_empty() {
            return None;
        }
        Some(Self {
            client,
            api_key: api_key.to_string(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
        })
    }

    pub fn with_model(&self, model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..self.clone()
        }
    }
}

#[async_trait]
impl TextGenerator for LlmService {
    async fn generate_text(&self, prompt: &str) -> AppResult<String> {
        let request = GeminiGenerateRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "Calling Gemini");

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .ai_err("gemini request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::AiService(format!(
                "gemini request failed: {status} {}",
                extract_error_message(&body)
            )));
        }

        let response: GeminiGenerateResponse =
            response.json().await.ai_err("gemini response invalid")?;

        let mut output = String::new();
        if let Some(candidate) = response.candidates.and_then(|list| list.into_iter().next()) {
            if let Some(content) = candidate.content {
                for part in content.parts {
                    if let Some(text) = part.text {
                        output.push_str(&text);
                    }
                }
            }
        }

        if output.trim().is_empty() {
            return Err(AppError::AiService(
                "gemini response missing text".to_string(),
            ));
        }

        Ok(output)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Gemini 的错误体形如 {"error":{"code":404,"message":"..."}}
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<GeminiErrorResponse>(body)
        .ok()
        .map(|parsed| parsed.error.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| body.trim().to_string())
}

#[derive(Serialize)]
struct GeminiGenerateRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Deserialize)]
struct GeminiGenerateResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiErrorResponse {
    error: GeminiErrorBody,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    message: String,
}
