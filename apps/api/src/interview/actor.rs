//! Session actor: one tokio task per interview, fed typed events over mpsc.
//!
//! HTTP handlers, the live timer and speech transcripts all reach the session
//! through the same channel, so mutations are applied strictly in arrival
//! order. Requests carry a oneshot sender for the resulting view.
//!
//! There is at most one timer task per session. Every question transition
//! aborts the running timer and starts a fresh one; finishing the round or
//! shutting the actor down aborts it for good.
//!
//! A session that receives no client event for its idle timeout closes itself.
//! Timer ticks do not count as activity.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::interview::session::{InterviewSession, InterviewView};
use crate::interview::{InterviewError, ScoringConfig};

const EVENT_BUFFER: usize = 32;
const TICK_INTERVAL: Duration = Duration::from_secs(1);

type Reply = oneshot::Sender<Result<InterviewView, InterviewError>>;

#[derive(Debug)]
pub enum SessionEvent {
    AnswerSubmitted { text: String, reply: Reply },
    QuestionSkipped { reply: Reply },
    TranscriptFinalized { text: String, reply: Reply },
    TranscriptInterim { text: String, reply: Reply },
    DraftEdited { text: String, reply: Reply },
    RecordingToggled { speech_supported: Option<bool>, reply: Reply },
    TimerTick,
    Snapshot { reply: Reply },
    Shutdown,
}

/// Wall-clock time derived from tokio's monotonic clock, so paused-time tests
/// move the session clock too.
#[derive(Debug, Clone, Copy)]
struct SessionClock {
    origin_utc: DateTime<Utc>,
    origin: Instant,
}

impl SessionClock {
    fn new() -> Self {
        Self {
            origin_utc: Utc::now(),
            origin: Instant::now(),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.origin.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.origin_utc + elapsed
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handle
// ────────────────────────────────────────────────────────────────────────────

/// Cheap, cloneable address of a running session actor.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: Uuid,
    events: mpsc::Sender<SessionEvent>,
}

impl SessionHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    async fn request<F>(&self, make_event: F) -> Result<InterviewView, InterviewError>
    where
        F: FnOnce(Reply) -> SessionEvent,
    {
        let (reply, response) = oneshot::channel();
        self.events
            .send(make_event(reply))
            .await
            .map_err(|_| InterviewError::SessionClosed)?;
        response.await.map_err(|_| InterviewError::SessionClosed)?
    }

    pub async fn submit_answer(&self, text: String) -> Result<InterviewView, InterviewError> {
        self.request(|reply| SessionEvent::AnswerSubmitted { text, reply })
            .await
    }

    pub async fn skip_question(&self) -> Result<InterviewView, InterviewError> {
        self.request(|reply| SessionEvent::QuestionSkipped { reply })
            .await
    }

    pub async fn transcript(
        &self,
        text: String,
        is_final: bool,
    ) -> Result<InterviewView, InterviewError> {
        self.request(|reply| {
            if is_final {
                SessionEvent::TranscriptFinalized { text, reply }
            } else {
                SessionEvent::TranscriptInterim { text, reply }
            }
        })
        .await
    }

    pub async fn edit_draft(&self, text: String) -> Result<InterviewView, InterviewError> {
        self.request(|reply| SessionEvent::DraftEdited { text, reply })
            .await
    }

    pub async fn toggle_recording(
        &self,
        speech_supported: Option<bool>,
    ) -> Result<InterviewView, InterviewError> {
        self.request(|reply| SessionEvent::RecordingToggled {
            speech_supported,
            reply,
        })
        .await
    }

    pub async fn snapshot(&self) -> Result<InterviewView, InterviewError> {
        self.request(|reply| SessionEvent::Snapshot { reply }).await
    }

    /// True once the actor has exited (shut down or idle-expired).
    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }

    /// Stops the actor and its timer. Idempotent.
    pub async fn shutdown(&self) {
        let _ = self.events.send(SessionEvent::Shutdown).await;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Actor
// ────────────────────────────────────────────────────────────────────────────

struct SessionActor {
    session: InterviewSession,
    scoring: ScoringConfig,
    clock: SessionClock,
    /// The timer posts through a weak sender so it never keeps the actor alive.
    ticks: mpsc::WeakSender<SessionEvent>,
    timer: Option<JoinHandle<()>>,
    idle_timeout: Duration,
    last_activity: Instant,
}

/// Spawns the actor task for `session` and returns its handle.
pub fn spawn_session(
    session: InterviewSession,
    scoring: ScoringConfig,
    idle_timeout: Duration,
) -> SessionHandle {
    let (events, inbox) = mpsc::channel(EVENT_BUFFER);
    let handle = SessionHandle {
        id: session.id(),
        events: events.clone(),
    };

    let actor = SessionActor {
        session,
        scoring,
        clock: SessionClock::new(),
        ticks: events.downgrade(),
        timer: None,
        idle_timeout,
        last_activity: Instant::now(),
    };
    tokio::spawn(actor.run(inbox));

    handle
}

impl SessionActor {
    async fn run(mut self, mut inbox: mpsc::Receiver<SessionEvent>) {
        let id = self.session.id();
        info!(session = %id, questions = self.session.questions().len(), "Interview session started");
        self.restart_timer();

        loop {
            let idle_deadline = self.last_activity + self.idle_timeout;
            tokio::select! {
                event = inbox.recv() => match event {
                    None | Some(SessionEvent::Shutdown) => break,
                    Some(event) => {
                        if !matches!(event, SessionEvent::TimerTick) {
                            self.last_activity = Instant::now();
                        }
                        self.handle(event);
                    }
                },
                () = tokio::time::sleep_until(idle_deadline) => {
                    info!(
                        session = %id,
                        idle_secs = self.idle_timeout.as_secs(),
                        "Closing idle interview session"
                    );
                    break;
                }
            }
        }

        self.stop_timer();
        info!(session = %id, "Interview session closed");
    }

    fn handle(&mut self, event: SessionEvent) {
        let now = self.clock.now();
        match event {
            SessionEvent::AnswerSubmitted { text, reply } => {
                let result = self.session.submit_answer(&text, now);
                self.after_transition(&result);
                self.respond(reply, result, now);
            }
            SessionEvent::QuestionSkipped { reply } => {
                let result = self.session.skip_question(now);
                self.after_transition(&result);
                self.respond(reply, result, now);
            }
            SessionEvent::TranscriptFinalized { text, reply } => {
                if self.session.apply_transcript(&text, true) {
                    debug!(session = %self.session.id(), "Appended transcript segment");
                }
                self.respond(reply, Ok(()), now);
            }
            SessionEvent::TranscriptInterim { text, reply } => {
                self.session.apply_transcript(&text, false);
                self.respond(reply, Ok(()), now);
            }
            SessionEvent::DraftEdited { text, reply } => {
                let result = self.session.update_draft(&text);
                self.respond(reply, result, now);
            }
            SessionEvent::RecordingToggled {
                speech_supported,
                reply,
            } => {
                let result = self.session.toggle_recording(speech_supported).map(|_| ());
                self.respond(reply, result, now);
            }
            SessionEvent::TimerTick => self.session.tick(now),
            SessionEvent::Snapshot { reply } => self.respond(reply, Ok(()), now),
            SessionEvent::Shutdown => {}
        }
    }

    fn after_transition(&mut self, result: &Result<(), InterviewError>) {
        if result.is_err() {
            return;
        }
        if self.session.is_finished() {
            self.stop_timer();
            info!(session = %self.session.id(), "Interview finished");
        } else {
            self.restart_timer();
        }
    }

    fn respond(&self, reply: Reply, result: Result<(), InterviewError>, now: DateTime<Utc>) {
        let response = result.map(|()| self.session.view(&self.scoring, now));
        // The requester may have gone away; nothing to do then.
        let _ = reply.send(response);
    }

    fn restart_timer(&mut self) {
        self.stop_timer();
        if self.session.is_finished() {
            return;
        }
        let ticks = self.ticks.clone();
        self.timer = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            interval.tick().await; // first tick completes immediately
            loop {
                interval.tick().await;
                let Some(events) = ticks.upgrade() else {
                    break;
                };
                if events.send(SessionEvent::TimerTick).await.is_err() {
                    break;
                }
            }
        }));
    }

    fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::session::SessionStatus;
    use crate::interview::{RoundType, DEFAULT_IDLE_TIMEOUT};

    fn spawn(round: RoundType, ai: &[String]) -> SessionHandle {
        let session = InterviewSession::start(round, ai, true, Utc::now());
        spawn_session(session, ScoringConfig::default(), DEFAULT_IDLE_TIMEOUT)
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_updates_elapsed_seconds() {
        let handle = spawn(RoundType::Screening, &[]);
        tokio::time::sleep(Duration::from_millis(3500)).await;
        let view = handle.snapshot().await.unwrap();
        assert_eq!(view.elapsed_seconds, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transition_restarts_timer() {
        let handle = spawn(RoundType::Screening, &[]);
        tokio::time::sleep(Duration::from_millis(5500)).await;

        let view = handle.submit_answer("First answer".to_string()).await.unwrap();
        assert_eq!(view.elapsed_seconds, 0);
        assert_eq!(view.question_number, Some(2));
        assert_eq!(view.answered_so_far, 1);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        let view = handle.snapshot().await.unwrap();
        assert_eq!(view.elapsed_seconds, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_answer_records_time_spent() {
        let ai = vec!["Only question".to_string()];
        let handle = spawn(RoundType::Manager, &ai);
        tokio::time::sleep(Duration::from_secs(61)).await;

        let view = handle.submit_answer("Done".to_string()).await.unwrap();
        assert_eq!(view.status, SessionStatus::Finished);
        let results = view.results.unwrap();
        assert_eq!(results.answers[0].time_spent_seconds, 61);
        assert_eq!(results.points, 15);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_stops_when_finished() {
        let ai = vec!["Only question".to_string()];
        let handle = spawn(RoundType::Manager, &ai);
        handle.skip_question().await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
        let view = handle.snapshot().await.unwrap();
        assert_eq!(view.elapsed_seconds, 0);
        assert_eq!(view.results.unwrap().skipped_count, 1);
    }

    #[tokio::test]
    async fn test_errors_are_returned_without_mutation() {
        let handle = spawn(RoundType::Team, &[]);
        let err = handle.submit_answer("   ".to_string()).await.unwrap_err();
        assert_eq!(err, InterviewError::EmptyAnswer);
        let view = handle.snapshot().await.unwrap();
        assert_eq!(view.question_number, Some(1));
        assert_eq!(view.answered_so_far, 0);
    }

    #[tokio::test]
    async fn test_speech_flow_through_events() {
        let handle = spawn(RoundType::Team, &[]);
        handle.toggle_recording(Some(true)).await.unwrap();
        handle.transcript("partial".to_string(), false).await.unwrap();
        handle.transcript("I listen first".to_string(), true).await.unwrap();
        let view = handle.transcript("then decide".to_string(), true).await.unwrap();
        assert_eq!(view.draft, "I listen first then decide");

        let err = handle.toggle_recording(Some(false)).await.unwrap_err();
        assert_eq!(err, InterviewError::SpeechUnavailable);
    }

    #[tokio::test]
    async fn test_shutdown_closes_session() {
        let handle = spawn(RoundType::Team, &[]);
        handle.shutdown().await;
        handle.shutdown().await;
        tokio::task::yield_now().await;
        assert_eq!(
            handle.snapshot().await.unwrap_err(),
            InterviewError::SessionClosed
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_session_closes_itself() {
        let session = InterviewSession::start(RoundType::Screening, &[], true, Utc::now());
        let handle = spawn_session(session, ScoringConfig::default(), Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(handle.is_closed());
        assert_eq!(
            handle.snapshot().await.unwrap_err(),
            InterviewError::SessionClosed
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_activity_defers_idle_close() {
        let session = InterviewSession::start(RoundType::Screening, &[], true, Utc::now());
        let handle = spawn_session(session, ScoringConfig::default(), Duration::from_secs(60));
        for _ in 0..3 {
            tokio::time::sleep(Duration::from_secs(40)).await;
            handle.edit_draft("still typing".to_string()).await.unwrap();
        }
        assert!(!handle.is_closed());

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(handle.is_closed());
    }
}
