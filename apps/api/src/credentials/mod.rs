//! Generative API key storage.
//!
//! The key lives in memory behind a lock and is mirrored to
//! `<DATA_DIR>/credentials.json` so it survives restarts. When no file exists,
//! `GEMINI_API_KEY` seeds the store.

pub mod handlers;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::mask_key;

const CREDENTIALS_FILE: &str = "credentials.json";
const KEY_PREFIX: &str = "AIza";

#[derive(Debug, Serialize, Deserialize)]
struct CredentialsFile {
    api_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialStatus {
    pub configured: bool,
    /// First four characters followed by an ellipsis.
    pub masked: Option<String>,
}

#[derive(Clone)]
pub struct CredentialStore {
    path: PathBuf,
    key: Arc<RwLock<Option<String>>>,
}

impl CredentialStore {
    /// Loads the saved key from `data_dir`, falling back to `env_key`.
    pub async fn load(data_dir: &Path, env_key: Option<String>) -> Result<Self> {
        let path = data_dir.join(CREDENTIALS_FILE);
        let saved = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => match serde_json::from_str::<CredentialsFile>(&raw) {
                Ok(file) => Some(file.api_key),
                Err(e) => {
                    warn!(path = %path.display(), "Ignoring unreadable credentials file: {e}");
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        let key = saved.or(env_key);
        if let Some(k) = &key {
            info!(key = %mask_key(k), "Loaded Gemini API key");
        } else {
            info!("No Gemini API key configured yet");
        }

        Ok(Self {
            path,
            key: Arc::new(RwLock::new(key)),
        })
    }

    pub async fn api_key(&self) -> Option<String> {
        self.key.read().await.clone()
    }

    pub async fn status(&self) -> CredentialStatus {
        let key = self.key.read().await;
        CredentialStatus {
            configured: key.is_some(),
            masked: key.as_deref().map(mask_key),
        }
    }

    /// Validates, persists and activates a new key.
    pub async fn save(&self, raw_key: &str) -> Result<CredentialStatus, AppError> {
        let key = validate_api_key(raw_key)?;

        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let body = serde_json::to_string_pretty(&CredentialsFile {
            api_key: key.clone(),
        })
        .context("Failed to serialize credentials")?;
        tokio::fs::write(&self.path, body)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        info!(key = %mask_key(&key), "Saved Gemini API key");
        *self.key.write().await = Some(key);
        Ok(self.status().await)
    }
}

/// Trims the key and checks it looks like a Google API key.
pub fn validate_api_key(raw: &str) -> Result<String, AppError> {
    let key = raw.trim();
    if key.is_empty() {
        return Err(AppError::Validation("Please enter an API key".to_string()));
    }
    if !key.starts_with(KEY_PREFIX) {
        return Err(AppError::Validation("Invalid API key format".to_string()));
    }
    Ok(key.to_string())
}
