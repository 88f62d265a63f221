//! 模型可用性探测
//!
//! provider 的模型命名经常变化，依次用一个最短 prompt 试探候选模型，
//! 遇到第一个可用的就停止。

use crate::services::TextGenerator;

pub const PROBE_PROMPT: &str = "Hello";
const PREVIEW_CHARS: usize = 50;

// 前六个是历史候选，最后两个是当前默认模型及其固定版本
pub const DEFAULT_PROBE_MODELS: &[&str] = &[
    "gemini-pro",
    "gemini-1.5-flash",
    "gemini-1.5-flash-002",
    "gemini-1.5-flash-latest",
    "gemini-1.5-pro",
    "gemini-2.0-flash-exp",
    "gemini-flash-latest",
    "gemini-2.0-flash",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Works { model: String, preview: String },
    Failed { model: String, error: String },
}

impl ProbeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Works { .. })
    }

    pub fn describe(&self) -> String {
        match self {
            ProbeOutcome::Works { model, preview } => {
                format!("✅ {model} WORKS!\nResponse: {preview}...")
            }
            ProbeOutcome::Failed { model, error } => format!("❌ {model} failed: {error}"),
        }
    }
}

/// 依次探测候选模型，返回到第一个成功为止的全部结果
pub async fn probe_models<G, F>(candidates: &[String], make_generator: F) -> Vec<ProbeOutcome>
where
    G: TextGenerator,
    F: Fn(&str) -> G,
{
    let mut outcomes = Vec::new();
    for model in candidates {
        tracing::info!(model = %model, "Testing model");
        let generator = make_generator(model);
        let outcome = match generator.generate_text(PROBE_PROMPT).await {
            Ok(text) => ProbeOutcome::Works {
                model: model.clone(),
                preview: text.chars().take(PREVIEW_CHARS).collect(),
            },
            Err(err) => ProbeOutcome::Failed {
                model: model.clone(),
                error: err.to_string(),
            },
        };
        let done = outcome.is_success();
        outcomes.push(outcome);
        if done {
            break;
        }
    }
    outcomes
}
