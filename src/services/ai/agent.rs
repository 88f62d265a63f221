use std::sync::Arc;

use serde_json::Value;

use crate::error::{AppError, AppResult};

use super::llm::TextGenerator;
use super::types::{AIResponse, Task};

pub struct AgentService {
    llm: Arc<dyn TextGenerator>,
}

impl AgentService {
    pub fn new(llm: Arc<dyn TextGenerator>) -> Self {
        Self { llm }
    }

    pub fn model(&self) -> &str {
        self.llm.model()
    }

    /// 一次 provider 调用：构建 prompt、拿回文本、去掉代码块围栏、解析并校验
    pub async fn extract_tasks(&self, notes: &str) -> AppResult<AIResponse> {
        let prompt = build_extract_prompt(notes);
        let text = self.llm.generate_text(&prompt).await?;
        let response = parse_ai_response(&text)?;

        tracing::info!(
            model = self.llm.model(),
            task_count = response.tasks.len(),
            "Extracted tasks from notes"
        );
        Ok(response)
    }
}

pub fn build_extract_prompt(notes: &str) -> String {
    let lines = [
        "You are an AI assistant that extracts actionable tasks from unstructured notes.",
        "",
        "Analyze the following notes and extract ONLY actionable tasks. Ignore general commentary, background information, or non-actionable statements.",
        "",
        "For each task, determine:",
        "1. task_title: A clear, concise action item (what needs to be done)",
        "2. deadline: Extract any mentioned deadline or timeframe (e.g., \"Friday\", \"next week\", \"by end of month\"). If no deadline is mentioned, use null.",
        "3. priority: Classify as \"high\", \"medium\", or \"low\" based on:",
        "   - high: urgent language (ASAP, urgent, critical, deadline within 2 days)",
        "   - medium: moderate urgency (this week, soon, important)",
        "   - low: no urgency indicators or flexible timing",
        "",
        "Return ONLY a valid JSON object in this exact format, with no additional text or markdown:",
        "{",
        "  \"tasks\": [",
        "    {",
        "      \"task_title\": \"string\",",
        "      \"deadline\": \"string or null\",",
        "      \"priority\": \"high\" | \"medium\" | \"low\"",
        "    }",
        "  ]",
        "}",
        "",
        "If no actionable tasks are found, return:",
        "{",
        "  \"tasks\": []",
        "}",
        "",
        "Notes to analyze:",
    ];
    let mut prompt = lines.join("\n");
    prompt.push('\n');
    prompt.push_str(notes);
    prompt
}

/// 去掉模型回复外层的 ``` / ```json 围栏
pub fn strip_code_fences(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        // 只去掉语言标记，JSON 可能紧跟在同一行
        body = rest.trim_start_matches(char::is_alphanumeric).trim_start();
    }
    body = body.trim_end();
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

pub fn parse_ai_response(raw: &str) -> AppResult<AIResponse> {
    let text = strip_code_fences(raw);

    let value: Value = serde_json::from_str(text).map_err(|e| {
        tracing::error!(error = %e, response = %text, "Failed to parse AI response");
        AppError::ResponseParse(e.to_string())
    })?;

    let items = value
        .get("tasks")
        .filter(|tasks| tasks.is_array())
        .cloned()
        .ok_or_else(|| {
            tracing::error!(response = %text, "AI response missing tasks array");
            AppError::InvalidResponseFormat("missing tasks array".to_string())
        })?;

    let tasks: Vec<Task> = serde_json::from_value(items).map_err(|e| {
        tracing::error!(error = %e, response = %text, "AI response tasks have unexpected shape");
        AppError::InvalidResponseFormat(e.to_string())
    })?;

    let total = tasks.len();
    let tasks: Vec<Task> = tasks
        .into_iter()
        .filter(|task| !task.task_title.trim().is_empty())
        .collect();
    if tasks.len() != total {
        tracing::warn!(dropped = total - tasks.len(), "Dropped tasks with blank titles");
    }

    Ok(AIResponse { tasks })
}
