use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::response::Html;
use axum::Form;

use crate::app_state::AppState;
use crate::view::{render_page, ViewModel};

use super::{convert_notes, ConvertResponse, NotesForm};

fn read_form(form: Result<Form<NotesForm>, FormRejection>) -> NotesForm {
    match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable notes form");
            NotesForm::default()
        }
    }
}

pub async fn index_page() -> Html<String> {
    Html(render_page(&ViewModel::default()))
}

pub async fn submit_page(
    State(state): State<AppState>,
    form: Result<Form<NotesForm>, FormRejection>,
) -> Html<String> {
    let mut model = ViewModel::new(read_form(form).notes);
    if model.submit() {
        let result = convert_notes(&state, Some(model.notes())).await;
        if let Err(err) = &result {
            tracing::warn!(kind = err.kind(), error = %err, "Conversion failed");
        }
        model.resolve(ConvertResponse::from_result(result));
    }
    Html(render_page(&model))
}

pub async fn clear_page(form: Result<Form<NotesForm>, FormRejection>) -> Html<String> {
    let mut model = ViewModel::new(read_form(form).notes);
    model.clear();
    Html(render_page(&model))
}
