use axum::{
    extract::{multipart::Field, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::analysis::intent::{AnalysisIntent, IntentInfo};
use crate::analysis::orchestrator::{
    CompareInputs, ComparisonOutcome, JobDescriptionInput, SingleInputs, SingleOutcome,
};
use crate::analysis::session::SessionView;
use crate::documents::Document;
use crate::errors::AppError;
use crate::state::AppState;

/// Raw multipart form: named text fields and uploaded files, in arrival order.
/// Blank text fields and empty file parts are dropped.
#[derive(Debug, Default)]
struct UploadForm {
    texts: Vec<(String, String)>,
    files: Vec<(String, Document)>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = UploadForm::default();
        while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            if field.file_name().is_some() {
                if let Some(document) = read_file(field).await? {
                    form.files.push((name, document));
                }
            } else {
                let text = field.text().await.map_err(bad_form)?;
                if !text.trim().is_empty() {
                    form.texts.push((name, text));
                }
            }
        }
        Ok(form)
    }

    fn take_text(&mut self, name: &str) -> Option<String> {
        let pos = self.texts.iter().position(|(n, _)| n == name)?;
        Some(self.texts.remove(pos).1)
    }

    fn take_file(&mut self, name: &str) -> Option<Document> {
        let pos = self.files.iter().position(|(n, _)| n == name)?;
        Some(self.files.remove(pos).1)
    }

    fn take_files(&mut self, name: &str) -> Vec<Document> {
        let (matching, rest) = std::mem::take(&mut self.files)
            .into_iter()
            .partition::<Vec<_>, _>(|(n, _)| n == name);
        self.files = rest;
        matching.into_iter().map(|(_, d)| d).collect()
    }

    fn take_job_description(&mut self) -> JobDescriptionInput {
        JobDescriptionInput {
            typed: self.take_text("job_description"),
            upload: self.take_file("job_description_file"),
        }
    }
}

async fn read_file(field: Field<'_>) -> Result<Option<Document>, AppError> {
    let file_name = field
        .file_name()
        .map(str::to_string)
        .filter(|n| !n.is_empty());
    let media_type = field.content_type().map(str::to_string);
    let bytes = field.bytes().await.map_err(bad_form)?;
    if bytes.is_empty() {
        return Ok(None);
    }
    Ok(Some(Document::new(bytes, file_name, media_type)))
}

fn bad_form(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Could not read the uploaded form: {e}"))
}

/// GET /api/v1/intents
pub async fn handle_list_intents() -> Json<Vec<IntentInfo>> {
    Json(AnalysisIntent::catalog())
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionView>) {
    let session = state.sessions.create();
    (StatusCode::CREATED, Json(session.view()))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.sessions.get(id)?.view()))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<SingleOutcome>, AppError> {
    let session = state.sessions.get(id)?;
    let mut form = UploadForm::read(multipart).await?;

    let inputs = SingleInputs {
        job_description: form.take_job_description(),
        resume: form.take_file("resume"),
        intent: form.take_text("intent"),
        custom_prompt: form.take_text("custom_prompt"),
    };
    let outcome = state.orchestrator.run_single(&session, inputs).await?;
    Ok(Json(outcome))
}

/// POST /api/v1/sessions/:id/compare
pub async fn handle_compare(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ComparisonOutcome>, AppError> {
    let session = state.sessions.get(id)?;
    let mut form = UploadForm::read(multipart).await?;

    let inputs = CompareInputs {
        job_description: form.take_job_description(),
        resumes: form.take_files("resumes"),
    };
    let outcome = state.orchestrator.run_comparison(&session, inputs).await?;
    Ok(Json(outcome))
}

/// GET /api/v1/sessions/:id/reports/:file_name
pub async fn handle_download_report(
    State(state): State<AppState>,
    Path((id, file_name)): Path<(Uuid, String)>,
) -> Result<Response, AppError> {
    let report = state
        .sessions
        .get(id)?
        .report(&file_name)
        .ok_or_else(|| AppError::NotFound(format!("Report {file_name} not found")))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", report.file_name),
            ),
        ],
        report.content,
    )
        .into_response())
}
