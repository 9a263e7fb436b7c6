use anyhow::Result;
use reqwest::Client;

use crate::analysis::AnalysisStore;
use crate::config::Config;
use crate::credentials::CredentialStore;
use crate::interview::InterviewRegistry;
use crate::layout::{default_page_config, PageConfig};
use crate::llm_client::build_http_client;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Shared HTTP connection pool for the Gemini API.
    pub http: Client,
    pub credentials: CredentialStore,
    pub analyses: AnalysisStore,
    pub interviews: InterviewRegistry,
    /// Page geometry for résumé export: US letter, half-inch margins.
    pub page_config: PageConfig,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub async fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            http: build_http_client()?,
            credentials: CredentialStore::load(&config.data_dir, config.gemini_api_key.clone())
                .await?,
            analyses: AnalysisStore::new(config.analysis_ttl, config.max_stored_analyses),
            interviews: InterviewRegistry::new(
                config.scoring,
                config.speech_capture_enabled,
                config.interview_idle_timeout,
            ),
            page_config: default_page_config(),
            max_upload_bytes: config.max_upload_bytes,
        })
    }
}
