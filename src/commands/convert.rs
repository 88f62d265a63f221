use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::{
    app_state::AppState,
    error::{AppError, INVALID_NOTES_MESSAGE},
    services::AIResponse,
    AppResult,
};

use super::{ConvertRequest, ConvertResponse, HealthResponse};

/// 校验 notes 非空（trim 后）
///
/// 原样返回 notes，提示词里嵌入的是用户输入的原文
pub fn validate_notes(notes: Option<&str>) -> AppResult<&str> {
    match notes {
        Some(notes) if !notes.trim().is_empty() => Ok(notes),
        _ => Err(AppError::Validation(INVALID_NOTES_MESSAGE.to_string())),
    }
}

/// 转换流程：先校验输入，再检查凭据，最后调用一次 provider
pub async fn convert_notes(state: &AppState, notes: Option<&str>) -> AppResult<AIResponse> {
    let notes = validate_notes(notes)?;
    let agent = state.ai.agent()?;
    tracing::info!(notes_len = notes.len(), model = agent.model(), "Converting notes");
    agent.extract_tasks(notes).await
}

pub async fn convert_command(
    State(state): State<AppState>,
    payload: Result<Json<ConvertRequest>, JsonRejection>,
) -> AppResult<Json<ConvertResponse>> {
    let request = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected convert payload");
        AppError::Validation(INVALID_NOTES_MESSAGE.to_string())
    })?;

    let response = convert_notes(&state, request.notes.as_deref()).await?;
    Ok(Json(ConvertResponse::ok(response)))
}

pub async fn health_command(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        provider_configured: state.provider.has_api_key(),
        model: state.provider.model.clone(),
    })
}
