//! 转换接口的请求 / 响应类型

use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::services::AIResponse;

/// POST /api/convert 请求体
#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    pub notes: Option<String>,
}

/// 表单提交（客户端页面）
#[derive(Debug, Default, Deserialize)]
pub struct NotesForm {
    #[serde(default)]
    pub notes: String,
}

/// 统一响应信封：success 为 true 时只有 data，否则只有 error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertResponse {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<AIResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ConvertResponse {
    pub fn ok(data: AIResponse) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    pub fn from_result(result: AppResult<AIResponse>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::failure(err.user_message()),
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&AIResponse> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// GET /health 响应
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub provider_configured: bool,
    pub model: String,
}
