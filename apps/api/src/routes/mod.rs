pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::credentials::handlers as credentials;
use crate::interview::handlers as interviews;
use crate::layout::handlers as export;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.max_upload_bytes;
    Router::new()
        .route("/health", get(health::health_handler))
        // Credentials
        .route(
            "/api/v1/credentials",
            get(credentials::handle_get_credentials).put(credentials::handle_save_credentials),
        )
        // Analysis
        .route(
            "/api/v1/analyze",
            post(analysis::handle_analyze).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/v1/analyses/:id", get(analysis::handle_get_analysis))
        // Export
        .route("/api/v1/export/layout", post(export::handle_export_layout))
        .route("/api/v1/export/pdf", post(export::handle_export_pdf))
        // Interview practice
        .route("/api/v1/interviews", post(interviews::handle_start_interview))
        .route(
            "/api/v1/interviews/:id",
            get(interviews::handle_get_interview).delete(interviews::handle_delete_interview),
        )
        .route(
            "/api/v1/interviews/:id/answer",
            post(interviews::handle_submit_answer),
        )
        .route(
            "/api/v1/interviews/:id/skip",
            post(interviews::handle_skip_question),
        )
        .route(
            "/api/v1/interviews/:id/draft",
            put(interviews::handle_update_draft),
        )
        .route(
            "/api/v1/interviews/:id/recording",
            post(interviews::handle_toggle_recording),
        )
        .route(
            "/api/v1/interviews/:id/transcript",
            post(interviews::handle_transcript),
        )
        .with_state(state)
}
