// Interview practice: a forward-only mock interview per session.
// Each session is owned by one actor task; HTTP handlers talk to it through a SessionHandle.

pub mod actor;
pub mod handlers;
pub mod questions;
pub mod registry;
pub mod session;

use std::time::Duration;

use thiserror::Error;

pub use questions::RoundType;
pub use registry::InterviewRegistry;
pub use session::InterviewView;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterviewError {
    #[error("Please provide an answer or skip the question")]
    EmptyAnswer,

    #[error("Speech recognition is not available")]
    SpeechUnavailable,

    #[error("The interview is already finished")]
    Finished,

    #[error("The interview session has ended")]
    SessionClosed,
}

/// Sessions with no client activity for this long are closed.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Points and feedback thresholds for the results screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringConfig {
    /// Awarded for every answered (non-skipped) question.
    pub base_points: u32,
    pub length_bonus: u32,
    /// Answers longer than this many characters earn `length_bonus`.
    pub length_threshold_chars: usize,
    pub speed_bonus: u32,
    /// Answers given in under this many seconds earn `speed_bonus`.
    pub speed_threshold_secs: u64,
    /// Totals above this count as a strong round.
    pub strong_points_threshold: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_points: 10,
            length_bonus: 5,
            length_threshold_chars: 200,
            speed_bonus: 5,
            speed_threshold_secs: 180,
            strong_points_threshold: 50,
        }
    }
}
