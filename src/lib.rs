mod app_state;
mod commands;
mod error;
mod services;
mod view;

use std::any::Any;
use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use reqwest::Client;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

pub use app_state::AppState;
pub use commands::{ConvertRequest, ConvertResponse};
pub use error::{AppError, AppResult};
pub use services::{
    build_extract_prompt, load_dotenv, parse_ai_response, probe_models, strip_code_fences,
    AIResponse, AgentService, AiServices, AppConfig, LlmService, Priority, ProbeOutcome,
    ProviderConfig, Task, TextGenerator, DEFAULT_PROBE_MODELS,
};
pub use view::{render_page, ViewModel, ViewPhase};

const DEFAULT_LOG_FILTER: &str = "note2action_lib=info,note2action=info,tower_http=info";

/// 初始化 tracing；RUST_LOG 优先
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

// handler 内部 panic 时仍然返回统一信封
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "Handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ConvertResponse::failure(error::UNEXPECTED_ERROR_MESSAGE)),
    )
        .into_response()
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(commands::index_page).post(commands::submit_page))
        .route("/clear", post(commands::clear_page))
        .route("/api/convert", post(commands::convert_command))
        .route("/health", get(commands::health_command))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: AppConfig) -> AppResult<()> {
    tracing::info!(
        has_api_key = config.provider.has_api_key(),
        api_key_len = config.provider.api_key_len(),
        model = %config.provider.model,
        "Environment check"
    );
    if !config.provider.has_api_key() {
        tracing::warn!("GEMINI_API_KEY is not set; conversions will fail until it is configured");
    }

    let state = AppState::new(config.provider.clone());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    let addr: SocketAddr = listener.local_addr()?;
    tracing::info!(%addr, "note2action listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

/// 用配置里的凭据探测候选模型
pub async fn probe(config: &AppConfig, models: &[String]) -> AppResult<Vec<ProbeOutcome>> {
    let base = LlmService::from_config(Client::new(), &config.provider)
        .ok_or_else(|| AppError::Config(error::MISSING_API_KEY_MESSAGE.to_string()))?;
    let candidates: Vec<String> = if models.is_empty() {
        DEFAULT_PROBE_MODELS.iter().map(|m| m.to_string()).collect()
    } else {
        models.to_vec()
    };
    Ok(probe_models(&candidates, |model| base.with_model(model)).await)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;

    struct FixedReply(&'static str);

    #[async_trait]
    impl TextGenerator for FixedReply {
        async fn generate_text(&self, _prompt: &str) -> AppResult<String> {
            Ok(self.0.to_string())
        }

        fn model(&self) -> &str {
            "fixed"
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl TextGenerator for FailingProvider {
        async fn generate_text(&self, _prompt: &str) -> AppResult<String> {
            Err(AppError::AiService("gemini request failed: 503 overloaded".to_string()))
        }

        fn model(&self) -> &str {
            "failing"
        }
    }

    struct PanickingProvider;

    #[async_trait]
    impl TextGenerator for PanickingProvider {
        async fn generate_text(&self, _prompt: &str) -> AppResult<String> {
            panic!("provider exploded")
        }

        fn model(&self) -> &str {
            "panicking"
        }
    }

    fn configured(provider: Arc<dyn TextGenerator>) -> Router {
        let config = ProviderConfig {
            api_key: Some("test-key".to_string()),
            ..ProviderConfig::default()
        };
        build_router(AppState::with_ai(AiServices::with_generator(provider), config))
    }

    fn unconfigured() -> Router {
        build_router(AppState::with_ai(
            AiServices::unconfigured(),
            ProviderConfig::default(),
        ))
    }

    async fn post_json(app: Router, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/convert")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn post_form(app: Router, uri: &str, body: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn assert_exactly_one_outcome(body: &Value) {
        let success = body["success"].as_bool().unwrap();
        if success {
            assert!(body["data"]["tasks"].is_array());
            assert!(body.get("error").is_none());
        } else {
            assert!(!body["error"].as_str().unwrap().is_empty());
            assert!(body.get("data").is_none());
        }
    }

    #[tokio::test]
    async fn test_convert_returns_tasks() {
        let app = configured(Arc::new(FixedReply(
            "```json\n{\"tasks\":[{\"task_title\":\"Send report\",\"deadline\":\"Friday\",\"priority\":\"high\"}]}\n```",
        )));

        let (status, body) = post_json(app, r#"{"notes":"Send report by Friday, urgent"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "success": true,
                "data": { "tasks": [
                    { "task_title": "Send report", "deadline": "Friday", "priority": "high" }
                ] }
            })
        );
    }

    #[tokio::test]
    async fn test_convert_empty_tasks_is_success() {
        let app = configured(Arc::new(FixedReply(r#"{"tasks":[]}"#)));
        let (status, body) = post_json(app, r#"{"notes":"nice weather"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "data": { "tasks": [] } }));
    }

    #[tokio::test]
    async fn test_convert_rejects_blank_or_missing_notes() {
        for payload in [r#"{"notes":"   "}"#, r#"{}"#, r#"{"notes":7}"#, "not json"] {
            // 缺少凭据也不影响 400 的判定
            for app in [configured(Arc::new(FixedReply(r#"{"tasks":[]}"#))), unconfigured()] {
                let (status, body) = post_json(app, payload).await;
                assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload}");
                assert_eq!(
                    body,
                    json!({ "success": false, "error": "Please provide valid notes to convert." })
                );
            }
        }
    }

    #[tokio::test]
    async fn test_convert_without_api_key_is_server_error() {
        let (status, body) = post_json(unconfigured(), r#"{"notes":"call Bob tomorrow"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], json!(false));
        assert!(body["error"].as_str().unwrap().contains("GEMINI_API_KEY"));
    }

    #[tokio::test]
    async fn test_convert_reports_malformed_provider_output() {
        let app = configured(Arc::new(FixedReply("Here you go: tasks!")));
        let (status, body) = post_json(app, r#"{"notes":"call Bob"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({ "success": false, "error": "Failed to parse AI response. Please try again." })
        );
    }

    #[tokio::test]
    async fn test_convert_reports_missing_tasks_field() {
        let app = configured(Arc::new(FixedReply(r#"{"todo":[]}"#)));
        let (status, body) = post_json(app, r#"{"notes":"call Bob"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({ "success": false, "error": "Invalid response format from AI." })
        );
    }

    #[tokio::test]
    async fn test_convert_reports_provider_failure() {
        let (status, body) = post_json(configured(Arc::new(FailingProvider)), r#"{"notes":"x"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_exactly_one_outcome(&body);
        assert!(body["error"].as_str().unwrap().contains("503 overloaded"));
    }

    #[tokio::test]
    async fn test_convert_panic_becomes_envelope() {
        let (status, body) =
            post_json(configured(Arc::new(PanickingProvider)), r#"{"notes":"x"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({ "success": false, "error": "An unexpected error occurred. Please try again." })
        );
    }

    #[tokio::test]
    async fn test_convert_envelope_is_always_exclusive() {
        let replies = [
            r#"{"tasks":[]}"#,
            r#"{"tasks":[{"task_title":"A","deadline":null,"priority":"low"}]}"#,
            "```\n{\"tasks\":[]}\n```",
            "{",
            r#"{"tasks":{}}"#,
        ];
        for reply in replies {
            let (_, body) = post_json(configured(Arc::new(FixedReply(reply))), r#"{"notes":"x"}"#).await;
            assert_exactly_one_outcome(&body);
        }
    }

    #[tokio::test]
    async fn test_index_renders_idle_page() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = unconfigured().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("Ready to boost your productivity?"));
    }

    #[tokio::test]
    async fn test_form_submit_renders_cards() {
        let app = configured(Arc::new(FixedReply(
            r#"{"tasks":[{"task_title":"Send report","deadline":"Friday","priority":"high"}]}"#,
        )));
        let (status, html) = post_form(app, "/", "notes=Send+report+by+Friday").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(html.matches(r#"class="task-card""#).count(), 1);
        assert!(html.contains("🔴"));
        assert!(html.contains("<span>Friday</span>"));
    }

    #[tokio::test]
    async fn test_form_submit_blank_notes_skips_provider() {
        let (status, html) = post_form(configured(Arc::new(PanickingProvider)), "/", "notes=+++").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Please enter some notes to convert."));
    }

    #[tokio::test]
    async fn test_form_submit_without_api_key_shows_error() {
        let (_, html) = post_form(unconfigured(), "/", "notes=call+Bob").await;
        assert!(html.contains("<h3>Error</h3>"));
        assert!(html.contains("GEMINI_API_KEY"));
    }

    #[tokio::test]
    async fn test_clear_resets_page() {
        let (status, html) = post_form(unconfigured(), "/clear", "notes=call+Bob").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Ready to boost your productivity?"));
        assert!(!html.contains("call Bob"));
    }

    #[tokio::test]
    async fn test_health_reports_provider_state() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = unconfigured().oneshot(request).await.unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], json!("ok"));
        assert_eq!(body["provider_configured"], json!(false));
        assert_eq!(body["model"], json!("gemini-flash-latest"));
    }

    #[tokio::test]
    async fn test_probe_requires_api_key() {
        let config = AppConfig::from_vars(&Default::default()).unwrap();
        let err = probe(&config, &[]).await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
