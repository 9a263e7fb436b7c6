use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::analysis::store::{DEFAULT_ANALYSIS_TTL, DEFAULT_MAX_ANALYSES};
use crate::interview::{ScoringConfig, DEFAULT_IDLE_TIMEOUT};

/// Application configuration loaded from environment variables.
/// Fails at startup if a provided value cannot be parsed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Directory holding locally persisted state (the saved API key).
    pub data_dir: PathBuf,
    /// Seeds the credential store when nothing has been saved yet.
    pub gemini_api_key: Option<String>,
    /// When false, every attempt to start speech capture is reported as unavailable.
    pub speech_capture_enabled: bool,
    /// Cap on the analyze request body (file plus job description).
    pub max_upload_bytes: usize,
    /// Interview sessions with no client activity for this long are closed.
    pub interview_idle_timeout: Duration,
    /// Stored analyses older than this are dropped.
    pub analysis_ttl: Duration,
    pub max_stored_analyses: usize,
    pub scoring: ScoringConfig,
}

/// Default upload cap: 10 MiB, enough for image-heavy résumé PDFs.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = ScoringConfig::default();
        let scoring = ScoringConfig {
            base_points: optional_env("INTERVIEW_BASE_POINTS", defaults.base_points)?,
            length_bonus: optional_env("INTERVIEW_LENGTH_BONUS", defaults.length_bonus)?,
            length_threshold_chars: optional_env(
                "INTERVIEW_LENGTH_THRESHOLD",
                defaults.length_threshold_chars,
            )?,
            speed_bonus: optional_env("INTERVIEW_SPEED_BONUS", defaults.speed_bonus)?,
            speed_threshold_secs: optional_env(
                "INTERVIEW_SPEED_THRESHOLD_SECS",
                defaults.speed_threshold_secs,
            )?,
            strong_points_threshold: optional_env(
                "INTERVIEW_STRONG_POINTS",
                defaults.strong_points_threshold,
            )?,
        };

        Ok(Config {
            port: optional_env("PORT", 8080u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            data_dir: std::env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data")),
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            speech_capture_enabled: optional_env("SPEECH_CAPTURE_ENABLED", true)?,
            max_upload_bytes: optional_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            interview_idle_timeout: Duration::from_secs(optional_env(
                "INTERVIEW_IDLE_TIMEOUT_SECS",
                DEFAULT_IDLE_TIMEOUT.as_secs(),
            )?),
            analysis_ttl: Duration::from_secs(optional_env(
                "ANALYSIS_TTL_SECS",
                DEFAULT_ANALYSIS_TTL.as_secs(),
            )?),
            max_stored_analyses: optional_env("MAX_STORED_ANALYSES", DEFAULT_MAX_ANALYSES)?,
            scoring,
        })
    }
}

fn optional_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
