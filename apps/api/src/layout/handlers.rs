use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::layout::{
    clean_optimized_html, layout_html, render_pdf, suggested_filename, LayoutDocument, PageConfig,
};
use crate::state::AppState;

/// Either inline HTML or a stored analysis whose optimized résumé is exported.
#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub html: Option<String>,
    pub analysis_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct LayoutResponse {
    pub filename: String,
    #[serde(flatten)]
    pub layout: LayoutDocument,
}

async fn resolve_html(state: &AppState, req: ExportRequest) -> Result<String, AppError> {
    match (req.html, req.analysis_id) {
        (Some(html), _) if !html.trim().is_empty() => Ok(clean_optimized_html(&html)),
        (_, Some(id)) => state
            .analyses
            .get(id)
            .await
            .map(|stored| stored.result.optimized_resume_html)
            .ok_or_else(|| AppError::NotFound(format!("Analysis {id} not found"))),
        _ => Err(AppError::Validation(
            "Provide either html or analysis_id".to_string(),
        )),
    }
}

/// Layout is CPU-bound; run it on the blocking pool.
async fn layout_blocking(html: String, config: PageConfig) -> Result<LayoutDocument, AppError> {
    tokio::task::spawn_blocking(move || layout_html(&html, &config))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in layout: {e}")))
}

/// POST /api/v1/export/layout
pub async fn handle_export_layout(
    State(state): State<AppState>,
    Json(req): Json<ExportRequest>,
) -> Result<Json<LayoutResponse>, AppError> {
    let html = resolve_html(&state, req).await?;
    let layout = layout_blocking(html, state.page_config).await?;
    Ok(Json(LayoutResponse {
        filename: suggested_filename(Utc::now().date_naive()),
        layout,
    }))
}

/// POST /api/v1/export/pdf
pub async fn handle_export_pdf(
    State(state): State<AppState>,
    Json(req): Json<ExportRequest>,
) -> Result<Response, AppError> {
    let html = resolve_html(&state, req).await?;
    let config = state.page_config;
    let bytes = tokio::task::spawn_blocking(move || render_pdf(&layout_html(&html, &config)))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in PDF export: {e}")))??;

    let filename = suggested_filename(Utc::now().date_naive());
    info!(%filename, bytes = bytes.len(), "Exported résumé PDF");

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
