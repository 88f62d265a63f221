//! 页面状态机
//!
//! idle → loading → (error | no tasks | results)，clear 无条件回到 idle。

use crate::commands::ConvertResponse;
use crate::services::Task;

pub const BLANK_NOTES_MESSAGE: &str = "Please enter some notes to convert.";
pub const CONVERT_FAILED_MESSAGE: &str = "Failed to convert notes. Please try again.";
pub const NO_TASKS_MESSAGE: &str =
    "No actionable items detected. Try adding more specific tasks or action items to your notes.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPhase {
    Idle,
    Loading,
    Error,
    /// 请求成功但没有提取到任务，错误位显示提示信息
    NoTasks,
    Results,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewModel {
    notes: String,
    tasks: Vec<Task>,
    loading: bool,
    error: Option<String>,
    show_results: bool,
}

impl ViewModel {
    pub fn new(notes: impl Into<String>) -> Self {
        Self {
            notes: notes.into(),
            ..Self::default()
        }
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn phase(&self) -> ViewPhase {
        if self.loading {
            ViewPhase::Loading
        } else if self.show_results && self.tasks.is_empty() && self.error.is_some() {
            ViewPhase::NoTasks
        } else if self.error.is_some() {
            ViewPhase::Error
        } else if self.show_results {
            ViewPhase::Results
        } else {
            ViewPhase::Idle
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.loading && !self.notes.trim().is_empty()
    }

    pub fn can_clear(&self) -> bool {
        !self.notes.is_empty()
    }

    /// 返回 true 表示进入 loading，调用方需要发起一次转换请求
    pub fn submit(&mut self) -> bool {
        if self.loading {
            return false;
        }
        if self.notes.trim().is_empty() {
            self.error = Some(BLANK_NOTES_MESSAGE.to_string());
            return false;
        }
        self.loading = true;
        self.error = None;
        self.show_results = false;
        true
    }

    pub fn resolve(&mut self, response: ConvertResponse) {
        self.loading = false;
        if !response.success() {
            let message = response
                .error()
                .map(str::trim)
                .filter(|message| !message.is_empty())
                .unwrap_or(CONVERT_FAILED_MESSAGE);
            self.error = Some(message.to_string());
            self.tasks.clear();
            return;
        }
        if let Some(data) = response.data() {
            self.tasks = data.tasks.clone();
            self.show_results = true;
            if self.tasks.is_empty() {
                self.error = Some(NO_TASKS_MESSAGE.to_string());
            }
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
