use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::analysis::orchestrator::run_analysis;
use crate::analysis::prompts::SAMPLE_RESUME;
use crate::analysis::store::StoredAnalysis;
use crate::errors::AppError;
use crate::extract::{extract_text, UploadedFile};
use crate::llm_client::GeminiClient;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    #[serde(flatten)]
    pub analysis: StoredAnalysis,
    /// The keywords the dashboard shows; `result.keywords` keeps them all.
    pub top_keywords: Vec<String>,
}

impl From<StoredAnalysis> for AnalysisResponse {
    fn from(analysis: StoredAnalysis) -> Self {
        let top_keywords = analysis.result.top_keywords().to_vec();
        Self {
            analysis,
            top_keywords,
        }
    }
}

/// The parts of the analyze form.
#[derive(Debug, Default)]
struct AnalyzeForm {
    file: Option<UploadedFile>,
    job_description: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> Result<AnalyzeForm, AppError> {
    let mut form = AnalyzeForm::default();
    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(upload_error)?;
                // Browsers send an empty part when no file was chosen.
                if !bytes.is_empty() {
                    form.file = Some(UploadedFile {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
            }
            "job_description" => {
                let text = field.text().await.map_err(upload_error)?;
                form.job_description = Some(text);
            }
            _ => {}
        }
    }
    Ok(form)
}

/// Over-limit bodies surface as multipart errors carrying 413.
fn upload_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("The uploaded file is too large".to_string())
    } else {
        AppError::Validation(format!("Malformed upload: {e}"))
    }
}

/// POST /api/v1/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResponse>, AppError> {
    let api_key = state.credentials.api_key().await.ok_or_else(|| {
        AppError::MissingCredential("Please configure your Gemini API key first".to_string())
    })?;

    let form = read_form(multipart).await?;
    let jd_text = form
        .job_description
        .filter(|jd| !jd.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Please enter a job description".to_string()))?;

    let (resume_text, file_name) = match form.file {
        Some(file) => (extract_text(&file).await?, Some(file.file_name)),
        None => {
            info!("No résumé uploaded, analysing the sample résumé");
            (SAMPLE_RESUME.to_string(), None)
        }
    };

    let client = GeminiClient::new(state.http.clone(), api_key);
    let result = run_analysis(&client, &resume_text, &jd_text).await?;
    let stored = state.analyses.insert(file_name, result).await;
    info!(analysis = %stored.id, score = stored.result.score, "Stored analysis");

    Ok(Json(stored.into()))
}

/// GET /api/v1/analyses/:id
pub async fn handle_get_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let stored = state
        .analyses
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Analysis {id} not found")))?;
    Ok(Json(stored.into()))
}
