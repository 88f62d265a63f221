//! 统一错误类型定义
//!
//! 使用 `thiserror` 定义 `AppError` 枚举和 `AppResult` 类型别名。
//! 所有错误在 HTTP 边界上都折叠成同一个 `ConvertResponse` 信封，
//! 只通过状态码和 message 区分。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::commands::ConvertResponse;

/// 用户输入不合法时返回给前端的提示
pub const INVALID_NOTES_MESSAGE: &str = "Please provide valid notes to convert.";
pub const MISSING_API_KEY_MESSAGE: &str =
    "API key not configured. Please set GEMINI_API_KEY in the environment or .env";
pub const PARSE_FAILED_MESSAGE: &str = "Failed to parse AI response. Please try again.";
pub const INVALID_FORMAT_MESSAGE: &str = "Invalid response format from AI.";
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// 应用级统一错误类型
///
/// `Display` 的输出就是信封里的 `error` 字段，所以这里的文案面向最终用户。
#[derive(Debug, Error)]
pub enum AppError {
    /// 验证错误（notes 缺失、类型不对或全是空白）
    #[error("{0}")]
    Validation(String),

    /// 配置错误（缺少 API Key、监听地址不合法）
    #[error("{0}")]
    Config(String),

    /// AI 服务错误（网络失败、非 2xx、空回复）
    #[error("AI provider request failed: {0}")]
    AiService(String),

    /// 模型返回的文本不是合法 JSON
    #[error("{}", PARSE_FAILED_MESSAGE)]
    ResponseParse(String),

    /// JSON 合法，但缺少 tasks 数组或字段类型不对
    #[error("{}", INVALID_FORMAT_MESSAGE)]
    InvalidResponseFormat(String),

    /// 文件 / 套接字错误
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::AiService(_)
            | AppError::ResponseParse(_)
            | AppError::InvalidResponseFormat(_)
            | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 日志里使用的错误类别
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::Config(_) => "config",
            AppError::AiService(_) => "ai_service",
            AppError::ResponseParse(_) => "response_parse",
            AppError::InvalidResponseFormat(_) => "invalid_response_format",
            AppError::Io(_) => "io",
        }
    }

    /// 信封里的 message；空字符串时回退到通用提示
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            UNEXPECTED_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }
}

// ========== IntoResponse：错误统一转成信封 ==========

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), error = ?self, "Request failed");
        } else {
            tracing::info!(kind = self.kind(), error = %self, "Request rejected");
        }
        (status, Json(ConvertResponse::failure(self.user_message()))).into_response()
    }
}

/// 应用级 Result 类型别名
pub type AppResult<T> = Result<T, AppError>;

// ========== 扩展 trait：为 Result 添加上下文方法 ==========

/// 为 Result 类型添加错误上下文转换方法
pub trait ResultExt<T> {
    /// 将错误转换为配置错误
    fn config_err(self, msg: &str) -> AppResult<T>;

    /// 将错误转换为 AI 服务错误
    fn ai_err(self, msg: &str) -> AppResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn config_err(self, msg: &str) -> AppResult<T> {
        self.map_err(|e| AppError::Config(format!("{}: {}", msg, e)))
    }

    fn ai_err(self, msg: &str) -> AppResult<T> {
        self.map_err(|e| AppError::AiService(format!("{}: {}", msg, e)))
    }
}
