use crate::services::{Priority, Task};

use super::state::{ViewModel, ViewPhase};

const PAGE_STYLE: &str = r#"
body { margin: 0; font-family: system-ui, -apple-system, sans-serif; background: linear-gradient(135deg, #eff6ff, #ffffff, #faf5ff); color: #111827; min-height: 100vh; }
.container { max-width: 64rem; margin: 0 auto; padding: 3rem 1rem; }
header { text-align: center; margin-bottom: 3rem; }
header h1 { font-size: 3rem; margin: 0 0 1rem; background: linear-gradient(90deg, #2563eb, #9333ea); -webkit-background-clip: text; background-clip: text; color: transparent; }
header p { font-size: 1.25rem; color: #4b5563; }
.panel { background: #fff; border: 1px solid #e5e7eb; border-radius: 1rem; box-shadow: 0 10px 25px rgba(0,0,0,.08); padding: 2rem; margin-bottom: 2rem; }
.panel label { display: block; font-weight: 600; font-size: 1.125rem; margin-bottom: .75rem; }
textarea { box-sizing: border-box; width: 100%; height: 16rem; padding: .75rem 1rem; border: 1px solid #d1d5db; border-radius: .5rem; background: #f9fafb; resize: none; font: inherit; }
.actions { display: flex; gap: .75rem; margin-top: 1rem; }
.btn-primary { flex: 1; border: 0; border-radius: .5rem; padding: 1rem 1.5rem; font-size: 1.125rem; font-weight: 600; color: #fff; background: linear-gradient(90deg, #2563eb, #9333ea); cursor: pointer; }
.btn-primary:disabled { opacity: .5; cursor: not-allowed; background: linear-gradient(90deg, #9ca3af, #6b7280); }
.btn-secondary { border: 0; border-radius: .5rem; padding: 1rem 1.5rem; font-weight: 600; background: #e5e7eb; color: #1f2937; cursor: pointer; }
.alert { display: flex; gap: .75rem; background: #fef2f2; border: 1px solid #fca5a5; border-radius: .5rem; padding: 1rem; margin-bottom: 2rem; }
.alert h3 { margin: 0 0 .25rem; color: #7f1d1d; }
.alert p { margin: 0; color: #991b1b; }
.results h2 { font-size: 1.5rem; }
.task-list { display: grid; gap: 1rem; }
.task-card { background: #fff; border: 1px solid #e5e7eb; border-radius: .5rem; box-shadow: 0 4px 6px rgba(0,0,0,.06); padding: 1.25rem; }
.task-card h3 { margin: 0 0 .5rem; font-size: 1.125rem; }
.badges { display: flex; flex-wrap: wrap; gap: .5rem; margin-top: .75rem; }
.badge { display: inline-flex; align-items: center; gap: .25rem; padding: .25rem .75rem; border-radius: 9999px; font-size: .75rem; font-weight: 500; border: 1px solid; }
.priority-high { background: #fee2e2; color: #991b1b; border-color: #fca5a5; }
.priority-medium { background: #fef9c3; color: #854d0e; border-color: #fde047; }
.priority-low { background: #dcfce7; color: #166534; border-color: #86efac; }
.priority-unknown { background: #f3f4f6; color: #1f2937; border-color: #d1d5db; }
.deadline { background: #dbeafe; color: #1e40af; border-color: #93c5fd; }
.empty-state { text-align: center; padding: 3rem 0; color: #4b5563; }
.empty-state .icon { font-size: 3.75rem; margin-bottom: 1rem; }
footer { text-align: center; margin-top: 4rem; color: #4b5563; font-size: .875rem; }
"#;

// 提交时切换成 loading 按钮；输入变化时同步 disabled
const PAGE_SCRIPT: &str = r#"
(function () {
  var form = document.getElementById('notes-form');
  var notes = document.getElementById('notes');
  var submit = document.getElementById('convert');
  var loading = document.getElementById('loading-submit');
  if (!form || !notes || !submit) { return; }
  notes.addEventListener('input', function () {
    submit.disabled = notes.value.trim().length === 0;
  });
  form.addEventListener('submit', function (event) {
    if (event.submitter && event.submitter.id !== 'convert') { return; }
    notes.readOnly = true;
    if (loading) { submit.outerHTML = loading.innerHTML; }
  });
})();
"#;

const NOTES_PLACEHOLDER: &str = "Paste your meeting notes, class notes, brainstorming ideas, or any unstructured text here... Example: - Need to finalize the project proposal by Friday (urgent) - Schedule a follow-up meeting with the team next week - Review the budget when you have time - Update documentation before the next sprint";

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn priority_class(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "priority-high",
        Priority::Medium => "priority-medium",
        Priority::Low => "priority-low",
        Priority::Unknown => "priority-unknown",
    }
}

fn priority_icon(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "🔴",
        Priority::Medium => "🟡",
        Priority::Low => "🟢",
        Priority::Unknown => "⚪",
    }
}

fn priority_label(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "High",
        Priority::Medium => "Medium",
        Priority::Low => "Low",
        Priority::Unknown => "Unknown",
    }
}

pub fn render_task_card(task: &Task, index: usize) -> String {
    let title = html_escape(&task.task_title);
    let class = priority_class(task.priority);
    let icon = priority_icon(task.priority);
    let label = priority_label(task.priority);
    let delay = index * 100;
    let deadline = task
        .deadline
        .as_deref()
        .map(|deadline| {
            format!(
                r#"<span class="badge deadline"><span>📅</span><span>{}</span></span>"#,
                html_escape(deadline)
            )
        })
        .unwrap_or_default();

    format!(
        r##"<div class="task-card" data-priority="{priority}" style="animation-delay: {delay}ms">
            <h3>{title}</h3>
            <div class="badges">
                <span class="badge {class}"><span>{icon}</span><span>{label} Priority</span></span>
                {deadline}
            </div>
        </div>"##,
        priority = task.priority,
    )
}

pub fn render_submit_button(loading: bool, enabled: bool) -> String {
    if loading {
        return r#"<button id="convert" type="submit" class="btn-primary" disabled>Converting...</button>"#
            .to_string();
    }
    let disabled = if enabled { "" } else { " disabled" };
    format!(r#"<button id="convert" type="submit" class="btn-primary"{disabled}>✨ Convert to Actions</button>"#)
}

fn render_alert(model: &ViewModel) -> String {
    let Some(message) = model.error() else {
        return String::new();
    };
    let heading = if model.phase() == ViewPhase::NoTasks {
        "No Tasks Found"
    } else {
        "Error"
    };
    format!(
        r##"<div class="alert" role="alert">
            <span>⚠️</span>
            <div><h3>{heading}</h3><p>{}</p></div>
        </div>"##,
        html_escape(message)
    )
}

fn render_results(model: &ViewModel) -> String {
    if model.phase() != ViewPhase::Results {
        return String::new();
    }
    let cards: Vec<String> = model
        .tasks()
        .iter()
        .enumerate()
        .map(|(index, task)| render_task_card(task, index))
        .collect();
    format!(
        r##"<section class="results">
            <h2>✅ Extracted Tasks ({count})</h2>
            <div class="task-list">{cards}</div>
        </section>"##,
        count = model.tasks().len(),
        cards = cards.join("\n"),
    )
}

fn render_empty_state(model: &ViewModel) -> String {
    if model.phase() != ViewPhase::Idle {
        return String::new();
    }
    r##"<div class="empty-state">
            <div class="icon">🚀</div>
            <h3>Ready to boost your productivity?</h3>
            <p>Paste your notes above and let AI extract actionable tasks for you.</p>
        </div>"##
        .to_string()
}

pub fn render_page(model: &ViewModel) -> String {
    let notes = html_escape(model.notes());
    let readonly = if model.is_loading() { " readonly" } else { "" };
    let submit = render_submit_button(model.is_loading(), model.can_submit());
    let loading_submit = render_submit_button(true, false);
    let clear = if model.can_clear() {
        let disabled = if model.is_loading() { " disabled" } else { "" };
        format!(
            r#"<button type="submit" formaction="/clear" class="btn-secondary"{disabled}>Clear</button>"#
        )
    } else {
        String::new()
    };
    let alert = render_alert(model);
    let results = render_results(model);
    let empty_state = render_empty_state(model);

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="description" content="Transform unstructured notes into clear, actionable tasks using AI">
    <title>Note2Action - AI-Powered Task Extraction</title>
    <style>{PAGE_STYLE}</style>
</head>
<body>
<div class="container">
    <header>
        <h1>Note2Action</h1>
        <p>Transform your unstructured notes into clear, actionable tasks using AI</p>
    </header>
    <form id="notes-form" class="panel" method="post" action="/">
        <label for="notes">📝 Your Notes</label>
        <textarea id="notes" name="notes" placeholder="{placeholder}"{readonly}>{notes}</textarea>
        <div class="actions">
            {submit}
            {clear}
        </div>
        <template id="loading-submit">{loading_submit}</template>
    </form>
    {alert}
    {results}
    {empty_state}
    <footer><p>Powered by Google Gemini AI • Built with Rust &amp; axum</p></footer>
</div>
<script>{PAGE_SCRIPT}</script>
</body>
</html>"##,
        placeholder = html_escape(NOTES_PLACEHOLDER),
    )
}
