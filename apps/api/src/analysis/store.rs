use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::analysis::orchestrator::AnalysisResult;

/// Analyses older than this are dropped on the next insert or sweep.
pub const DEFAULT_ANALYSIS_TTL: Duration = Duration::from_secs(2 * 60 * 60);
/// Oldest entries are evicted once the store holds this many.
pub const DEFAULT_MAX_ANALYSES: usize = 256;

/// A completed analysis as kept in memory for the preview, interview and export views.
#[derive(Debug, Clone, Serialize)]
pub struct StoredAnalysis {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Name of the uploaded résumé, `None` when the built-in sample was analysed.
    pub file_name: Option<String>,
    pub result: AnalysisResult,
}

struct Entry {
    stored: StoredAnalysis,
    inserted: Instant,
}

/// In-process store of analysis results, bounded by age and count.
/// Nothing outlives the process.
#[derive(Clone)]
pub struct AnalysisStore {
    inner: Arc<RwLock<HashMap<Uuid, Entry>>>,
    ttl: Duration,
    max_entries: usize,
}

impl Default for AnalysisStore {
    fn default() -> Self {
        Self::new(DEFAULT_ANALYSIS_TTL, DEFAULT_MAX_ANALYSES)
    }
}

impl AnalysisStore {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    pub async fn insert(&self, file_name: Option<String>, result: AnalysisResult) -> StoredAnalysis {
        let stored = StoredAnalysis {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            file_name,
            result,
        };
        let now = Instant::now();
        let mut entries = self.inner.write().await;
        self.evict_expired(&mut entries, now);
        while entries.len() >= self.max_entries {
            let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted)
                .map(|(id, _)| *id)
            else {
                break;
            };
            entries.remove(&oldest);
            debug!(analysis = %oldest, "Evicted oldest analysis");
        }
        entries.insert(
            stored.id,
            Entry {
                stored: stored.clone(),
                inserted: now,
            },
        );
        stored
    }

    /// Returns the analysis unless it is unknown or past its TTL.
    pub async fn get(&self, id: Uuid) -> Option<StoredAnalysis> {
        let entries = self.inner.read().await;
        let entry = entries.get(&id)?;
        if entry.inserted.elapsed() >= self.ttl {
            return None;
        }
        Some(entry.stored.clone())
    }

    /// Drops expired analyses. Returns how many were dropped.
    pub async fn prune(&self) -> usize {
        let mut entries = self.inner.write().await;
        self.evict_expired(&mut entries, Instant::now())
    }

    /// Spawns a background task that drops expired analyses every `every`.
    pub fn spawn_reaper(&self, every: Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await;
            loop {
                interval.tick().await;
                store.prune().await;
            }
        })
    }

    fn evict_expired(&self, entries: &mut HashMap<Uuid, Entry>, now: Instant) -> usize {
        let before = entries.len();
        entries.retain(|_, entry| now.duration_since(entry.inserted) < self.ttl);
        let pruned = before - entries.len();
        if pruned > 0 {
            debug!(pruned, "Pruned expired analyses");
        }
        pruned
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}
