use std::sync::Arc;

use crate::services::{AiServices, ProviderConfig};

/// 启动后不可变，克隆进每个 handler
#[derive(Clone)]
pub struct AppState {
    pub ai: Arc<AiServices>,
    pub provider: Arc<ProviderConfig>,
}

impl AppState {
    pub fn new(provider: ProviderConfig) -> Self {
        let ai = AiServices::new(&provider);
        Self {
            ai: Arc::new(ai),
            provider: Arc::new(provider),
        }
    }

    pub fn with_ai(ai: AiServices, provider: ProviderConfig) -> Self {
        Self {
            ai: Arc::new(ai),
            provider: Arc::new(provider),
        }
    }
}
