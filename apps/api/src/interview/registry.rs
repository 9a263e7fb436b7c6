use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::interview::actor::{spawn_session, SessionHandle};
use crate::interview::session::{InterviewSession, InterviewView};
use crate::interview::{InterviewError, RoundType, ScoringConfig};

/// Live interview sessions, keyed by session id.
#[derive(Clone)]
pub struct InterviewRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, SessionHandle>>>,
    scoring: ScoringConfig,
    speech_enabled: bool,
    idle_timeout: Duration,
}

impl InterviewRegistry {
    pub fn new(scoring: ScoringConfig, speech_enabled: bool, idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            scoring,
            speech_enabled,
            idle_timeout,
        }
    }

    /// Starts a session for `round_type` and returns its first view.
    pub async fn start(
        &self,
        round_type: RoundType,
        ai_questions: &[String],
    ) -> Result<InterviewView, InterviewError> {
        let session =
            InterviewSession::start(round_type, ai_questions, self.speech_enabled, Utc::now());
        let handle = spawn_session(session, self.scoring, self.idle_timeout);
        let view = handle.snapshot().await?;
        self.prune().await;
        self.sessions.write().await.insert(handle.id(), handle);
        info!(session = %view.id, round = view.round_type.as_str(), "Registered interview session");
        Ok(view)
    }

    /// Returns the live session, dropping it from the map if its actor has exited.
    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        let handle = self.sessions.read().await.get(&id).cloned()?;
        if handle.is_closed() {
            self.sessions.write().await.remove(&id);
            return None;
        }
        Some(handle)
    }

    /// Forgets sessions whose actors have exited. Returns how many were dropped.
    pub async fn prune(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, handle| !handle.is_closed());
        let pruned = before - sessions.len();
        if pruned > 0 {
            debug!(pruned, "Pruned closed interview sessions");
        }
        pruned
    }

    /// Spawns a background task that prunes closed sessions every `every`.
    pub fn spawn_reaper(&self, every: Duration) -> tokio::task::JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await;
            loop {
                interval.tick().await;
                registry.prune().await;
            }
        })
    }

    /// Drops the session and stops its actor. Returns false for unknown ids.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id);
        match removed {
            Some(handle) => {
                handle.shutdown().await;
                info!(session = %id, "Removed interview session");
                true
            }
            None => false,
        }
    }
}
