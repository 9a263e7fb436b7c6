use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::actor::SessionHandle;
use crate::interview::{InterviewView, RoundType};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StartInterviewRequest {
    pub round_type: String,
    /// Analysis whose generated questions feed manager rounds.
    pub analysis_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecordingRequest {
    pub speech_supported: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct TranscriptRequest {
    pub text: String,
    pub is_final: bool,
}

async fn session(state: &AppState, id: Uuid) -> Result<SessionHandle, AppError> {
    state
        .interviews
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Interview session {id} not found")))
}

/// POST /api/v1/interviews
pub async fn handle_start_interview(
    State(state): State<AppState>,
    Json(req): Json<StartInterviewRequest>,
) -> Result<(StatusCode, Json<InterviewView>), AppError> {
    let ai_questions = match req.analysis_id {
        Some(id) => {
            state
                .analyses
                .get(id)
                .await
                .ok_or_else(|| AppError::NotFound(format!("Analysis {id} not found")))?
                .result
                .interview_questions
        }
        None => Vec::new(),
    };

    let view = state
        .interviews
        .start(RoundType::parse(&req.round_type), &ai_questions)
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/v1/interviews/:id
pub async fn handle_get_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewView>, AppError> {
    let view = session(&state, id).await?.snapshot().await?;
    Ok(Json(view))
}

/// DELETE /api/v1/interviews/:id
pub async fn handle_delete_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.interviews.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Interview session {id} not found")))
    }
}

/// POST /api/v1/interviews/:id/answer
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TextRequest>,
) -> Result<Json<InterviewView>, AppError> {
    let view = session(&state, id).await?.submit_answer(req.text).await?;
    Ok(Json(view))
}

/// POST /api/v1/interviews/:id/skip
pub async fn handle_skip_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewView>, AppError> {
    let view = session(&state, id).await?.skip_question().await?;
    Ok(Json(view))
}

/// PUT /api/v1/interviews/:id/draft
pub async fn handle_update_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TextRequest>,
) -> Result<Json<InterviewView>, AppError> {
    let view = session(&state, id).await?.edit_draft(req.text).await?;
    Ok(Json(view))
}

/// POST /api/v1/interviews/:id/recording
pub async fn handle_toggle_recording(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<RecordingRequest>>,
) -> Result<Json<InterviewView>, AppError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let view = session(&state, id)
        .await?
        .toggle_recording(req.speech_supported)
        .await?;
    Ok(Json(view))
}

/// POST /api/v1/interviews/:id/transcript
pub async fn handle_transcript(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TranscriptRequest>,
) -> Result<Json<InterviewView>, AppError> {
    let view = session(&state, id)
        .await?
        .transcript(req.text, req.is_final)
        .await?;
    Ok(Json(view))
}
