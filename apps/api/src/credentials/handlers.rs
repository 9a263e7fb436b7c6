use axum::{extract::State, Json};
use serde::Deserialize;

use crate::credentials::CredentialStatus;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SaveCredentialRequest {
    pub api_key: String,
}

/// GET /api/v1/credentials
pub async fn handle_get_credentials(State(state): State<AppState>) -> Json<CredentialStatus> {
    Json(state.credentials.status().await)
}

/// PUT /api/v1/credentials
pub async fn handle_save_credentials(
    State(state): State<AppState>,
    Json(req): Json<SaveCredentialRequest>,
) -> Result<Json<CredentialStatus>, AppError> {
    let status = state.credentials.save(&req.api_key).await?;
    Ok(Json(status))
}
