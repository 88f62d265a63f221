mod agent;
mod llm;
mod types;

use std::sync::Arc;

use reqwest::Client;

use crate::error::{AppError, AppResult, MISSING_API_KEY_MESSAGE};
use crate::services::ProviderConfig;

pub use agent::{build_extract_prompt, parse_ai_response, strip_code_fences, AgentService};
pub use llm::{LlmService, TextGenerator};
pub use types::*;

#[derive(Clone)]
pub struct AiServices {
    agent: Option<Arc<AgentService>>,
}

impl AiServices {
    /// 按配置构建；缺少 API Key 时服务照常启动，转换请求返回配置错误
    pub fn new(config: &ProviderConfig) -> Self {
        let agent = LlmService::from_config(Client::new(), config).map(|llm| {
            let llm: Arc<dyn TextGenerator> = Arc::new(llm);
            Arc::new(AgentService::new(llm))
        });
        Self { agent }
    }

    pub fn with_generator(llm: Arc<dyn TextGenerator>) -> Self {
        Self {
            agent: Some(Arc::new(AgentService::new(llm))),
        }
    }

    pub fn unconfigured() -> Self {
        Self { agent: None }
    }

    pub fn agent(&self) -> AppResult<&AgentService> {
        self.agent
            .as_deref()
            .ok_or_else(|| AppError::Config(MISSING_API_KEY_MESSAGE.to_string()))
    }
}
