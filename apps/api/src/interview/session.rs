//! Pure interview state machine.
//!
//! `InterviewSession` never reads the clock: every transition takes `now`
//! explicitly, which keeps it deterministic under test. The actor in
//! `interview::actor` owns one session and feeds it events in order.
//!
//! Lifecycle: created `Active` at question 0, advanced by submit/skip until
//! `current_index == questions.len()`, then `Finished`. There is no way back.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::interview::questions::{questions_for_round, RoundType};
use crate::interview::{InterviewError, ScoringConfig};

/// Stored as the answer text of a skipped question.
pub const SKIP_SENTINEL: &str = "[Skipped]";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerRecord {
    pub question: String,
    pub answer_text: String,
    pub time_spent_seconds: u64,
}

impl AnswerRecord {
    pub fn is_skipped(&self) -> bool {
        self.answer_text == SKIP_SENTINEL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingState {
    Idle,
    Listening,
}

#[derive(Debug, Clone)]
pub struct InterviewSession {
    id: Uuid,
    round_type: RoundType,
    questions: Vec<String>,
    current_index: usize,
    answers: Vec<AnswerRecord>,
    start_time: DateTime<Utc>,
    question_start_time: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    /// Seconds on the current question as of the last timer tick.
    elapsed_seconds: u64,
    recording: bool,
    draft: String,
    speech_enabled: bool,
}

impl InterviewSession {
    pub fn start(
        round_type: RoundType,
        ai_questions: &[String],
        speech_enabled: bool,
        now: DateTime<Utc>,
    ) -> Self {
        let questions = questions_for_round(&round_type, ai_questions);
        Self {
            id: Uuid::new_v4(),
            round_type,
            questions,
            current_index: 0,
            answers: Vec::new(),
            start_time: now,
            question_start_time: now,
            finished_at: None,
            elapsed_seconds: 0,
            recording: false,
            draft: String::new(),
            speech_enabled,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn is_finished(&self) -> bool {
        self.current_index == self.questions.len()
    }

    pub fn current_question(&self) -> Option<&str> {
        self.questions.get(self.current_index).map(String::as_str)
    }

    pub fn status(&self) -> SessionStatus {
        if self.is_finished() {
            SessionStatus::Finished
        } else {
            SessionStatus::Active
        }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Transitions
    // ────────────────────────────────────────────────────────────────────────

    /// Records a trimmed, non-empty answer and moves to the next question.
    pub fn submit_answer(&mut self, text: &str, now: DateTime<Utc>) -> Result<(), InterviewError> {
        if self.is_finished() {
            return Err(InterviewError::Finished);
        }
        let answer = text.trim();
        if answer.is_empty() {
            return Err(InterviewError::EmptyAnswer);
        }
        self.advance(answer.to_string(), now);
        Ok(())
    }

    pub fn skip_question(&mut self, now: DateTime<Utc>) -> Result<(), InterviewError> {
        if self.is_finished() {
            return Err(InterviewError::Finished);
        }
        self.advance(SKIP_SENTINEL.to_string(), now);
        Ok(())
    }

    fn advance(&mut self, answer_text: String, now: DateTime<Utc>) {
        let question = self.questions[self.current_index].clone();
        self.answers.push(AnswerRecord {
            question,
            answer_text,
            time_spent_seconds: seconds_between(self.question_start_time, now),
        });
        self.current_index += 1;
        self.question_start_time = now;
        self.elapsed_seconds = 0;
        self.draft.clear();
        self.recording = false;
        if self.is_finished() {
            self.finished_at = Some(now);
        }
    }

    /// Recomputes the live timer. No-op once finished.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if !self.is_finished() {
            self.elapsed_seconds = seconds_between(self.question_start_time, now);
        }
    }

    /// Flips between idle and listening; returns whether capture is now active.
    ///
    /// `client_supports_speech` is what the caller reported about its own
    /// capability, if anything.
    pub fn toggle_recording(
        &mut self,
        client_supports_speech: Option<bool>,
    ) -> Result<bool, InterviewError> {
        if self.is_finished() {
            return Err(InterviewError::Finished);
        }
        if !self.speech_enabled || client_supports_speech == Some(false) {
            return Err(InterviewError::SpeechUnavailable);
        }
        self.recording = !self.recording;
        Ok(self.recording)
    }

    /// Applies a speech-recognition segment. Returns whether the draft changed.
    ///
    /// Only finalized segments received while listening are kept.
    pub fn apply_transcript(&mut self, text: &str, is_final: bool) -> bool {
        if !self.recording || !is_final {
            return false;
        }
        let segment = text.trim();
        if segment.is_empty() {
            return false;
        }
        if !self.draft.is_empty() {
            self.draft.push(' ');
        }
        self.draft.push_str(segment);
        true
    }

    /// Manual edits replace the draft outright; a speech append racing with
    /// typing is last-write-wins.
    pub fn update_draft(&mut self, text: &str) -> Result<(), InterviewError> {
        if self.is_finished() {
            return Err(InterviewError::Finished);
        }
        self.draft = text.to_string();
        Ok(())
    }

    // ────────────────────────────────────────────────────────────────────────
    // Results and view
    // ────────────────────────────────────────────────────────────────────────

    /// Aggregate statistics and feedback. Total time stops at the last answer.
    pub fn results(&self, config: &ScoringConfig, now: DateTime<Utc>) -> InterviewResults {
        let end = self.finished_at.unwrap_or(now);
        compute_results(
            &self.answers,
            self.questions.len(),
            seconds_between(self.start_time, end),
            config,
        )
    }

    pub fn view(&self, config: &ScoringConfig, now: DateTime<Utc>) -> InterviewView {
        let finished = self.is_finished();
        InterviewView {
            id: self.id,
            round_type: self.round_type.clone(),
            status: self.status(),
            question_number: (!finished).then_some(self.current_index() + 1),
            total_questions: self.questions.len(),
            current_question: self.current_question().map(str::to_string),
            elapsed_seconds: self.elapsed_seconds,
            draft: self.draft().to_string(),
            recording: if self.is_recording() {
                RecordingState::Listening
            } else {
                RecordingState::Idle
            },
            speech_available: self.speech_enabled && !finished,
            answered_so_far: self.answers().len(),
            results: finished.then(|| self.results(config, now)),
        }
    }
}

fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    (to - from).num_seconds().max(0) as u64
}

/// Everything a client needs to draw the interview screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterviewView {
    pub id: Uuid,
    pub round_type: RoundType,
    pub status: SessionStatus,
    /// One-based; absent once finished.
    pub question_number: Option<usize>,
    pub total_questions: usize,
    pub current_question: Option<String>,
    pub elapsed_seconds: u64,
    pub draft: String,
    pub recording: RecordingState,
    pub speech_available: bool,
    pub answered_so_far: usize,
    pub results: Option<InterviewResults>,
}

// ────────────────────────────────────────────────────────────────────────────
// Scoring
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterviewResults {
    pub answered_count: usize,
    pub total_questions: usize,
    pub skipped_count: usize,
    pub total_elapsed_seconds: u64,
    pub points: u32,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub answers: Vec<AnswerRecord>,
}

/// Points for one answer. Skipped answers score nothing.
pub fn score_answer(record: &AnswerRecord, config: &ScoringConfig) -> u32 {
    if record.is_skipped() {
        return 0;
    }
    let mut points = config.base_points;
    if record.answer_text.chars().count() > config.length_threshold_chars {
        points += config.length_bonus;
    }
    if record.time_spent_seconds < config.speed_threshold_secs {
        points += config.speed_bonus;
    }
    points
}

pub fn compute_results(
    answers: &[AnswerRecord],
    total_questions: usize,
    total_elapsed_seconds: u64,
    config: &ScoringConfig,
) -> InterviewResults {
    let skipped_count = answers.iter().filter(|a| a.is_skipped()).count();
    let answered_count = answers.len() - skipped_count;
    let points: u32 = answers.iter().map(|a| score_answer(a, config)).sum();

    let mut strengths = Vec::new();
    let mut improvements = Vec::new();

    if points > config.strong_points_threshold {
        strengths.push("Strong overall performance with detailed, well-paced answers.".to_string());
    }
    if answered_count == total_questions {
        strengths.push("You answered every question without skipping.".to_string());
    }
    if skipped_count > 0 {
        improvements.push(format!(
            "You skipped {skipped_count} question(s). Practice giving at least a short answer to every question."
        ));
    }
    if points <= config.strong_points_threshold {
        improvements.push(format!(
            "Aim for answers longer than {} characters, delivered in under {} seconds.",
            config.length_threshold_chars, config.speed_threshold_secs
        ));
    }

    if strengths.is_empty() {
        strengths.push("You completed the practice round.".to_string());
    }
    if improvements.is_empty() {
        improvements.push(
            "Keep practicing to make each answer more specific and backed by results.".to_string(),
        );
    }

    InterviewResults {
        answered_count,
        total_questions,
        skipped_count,
        total_elapsed_seconds,
        points,
        strengths,
        improvements,
        answers: answers.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    fn screening(speech: bool) -> InterviewSession {
        InterviewSession::start(RoundType::Screening, &[], speech, t0())
    }

    fn record(len: usize, secs: u64) -> AnswerRecord {
        AnswerRecord {
            question: "Q".to_string(),
            answer_text: "a".repeat(len),
            time_spent_seconds: secs,
        }
    }

    #[test]
    fn test_start_is_active_at_first_question() {
        let session = screening(true);
        assert_eq!(session.status(), SessionStatus::Active);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.current_question(), Some(session.questions()[0].as_str()));
        assert!(session.answers().is_empty());
    }

    #[test]
    fn test_empty_answer_leaves_state_untouched() {
        let mut session = screening(true);
        assert_eq!(
            session.submit_answer("   \n", t0()),
            Err(InterviewError::EmptyAnswer)
        );
        assert_eq!(session.current_index(), 0);
        assert!(session.answers().is_empty());
    }

    #[test]
    fn test_submit_records_time_and_advances() {
        let mut session = screening(true);
        session.update_draft("typing...").unwrap();
        session
            .submit_answer("  I led the migration.  ", t0() + Duration::seconds(42))
            .unwrap();

        assert_eq!(session.current_index(), 1);
        assert_eq!(session.answers().len(), 1);
        let answer = &session.answers()[0];
        assert_eq!(answer.answer_text, "I led the migration.");
        assert_eq!(answer.time_spent_seconds, 42);
        assert_eq!(session.draft(), "");
    }

    #[test]
    fn test_question_timer_resets_on_transition() {
        let mut session = screening(true);
        session.submit_answer("one", t0() + Duration::seconds(30)).unwrap();
        session.submit_answer("two", t0() + Duration::seconds(50)).unwrap();
        assert_eq!(session.answers()[1].time_spent_seconds, 20);
    }

    #[test]
    fn test_skip_appends_sentinel_and_advances() {
        let mut session = screening(true);
        session.skip_question(t0()).unwrap();
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.answers()[0].answer_text, SKIP_SENTINEL);
        assert!(session.answers()[0].is_skipped());
    }

    #[test]
    fn test_finishes_exactly_at_last_question() {
        let mut session = screening(true);
        let total = session.questions().len();
        for i in 0..total {
            assert!(!session.is_finished());
            session.submit_answer(&format!("answer {i}"), t0()).unwrap();
        }
        assert!(session.is_finished());
        assert_eq!(session.current_question(), None);
        assert_eq!(session.submit_answer("late", t0()), Err(InterviewError::Finished));
        assert_eq!(session.skip_question(t0()), Err(InterviewError::Finished));
        assert_eq!(session.answers().len(), total);
    }

    #[test]
    fn test_tick_tracks_current_question_only() {
        let mut session = screening(true);
        session.tick(t0() + Duration::seconds(7));
        assert_eq!(session.view(&ScoringConfig::default(), t0()).elapsed_seconds, 7);
        session.skip_question(t0() + Duration::seconds(8)).unwrap();
        assert_eq!(session.view(&ScoringConfig::default(), t0()).elapsed_seconds, 0);
        session.tick(t0() + Duration::seconds(10));
        assert_eq!(session.view(&ScoringConfig::default(), t0()).elapsed_seconds, 2);
    }

    #[test]
    fn test_recording_toggle_and_transcripts() {
        let mut session = screening(true);
        assert!(!session.apply_transcript("ignored", true));

        assert_eq!(session.toggle_recording(None), Ok(true));
        assert!(!session.apply_transcript("interim words", false));
        assert!(session.apply_transcript(" I built ", true));
        assert!(session.apply_transcript("a cache", true));
        assert_eq!(session.draft(), "I built a cache");

        assert_eq!(session.toggle_recording(Some(true)), Ok(false));
        assert!(!session.apply_transcript("after stop", true));
        assert_eq!(session.draft(), "I built a cache");
    }

    #[test]
    fn test_manual_edit_replaces_speech_draft() {
        let mut session = screening(true);
        session.toggle_recording(None).unwrap();
        session.apply_transcript("spoken", true);
        session.update_draft("typed instead").unwrap();
        assert_eq!(session.draft(), "typed instead");
        session.apply_transcript("more", true);
        assert_eq!(session.draft(), "typed instead more");
    }

    #[test]
    fn test_speech_unavailable_changes_nothing() {
        let mut disabled = screening(false);
        assert_eq!(
            disabled.toggle_recording(None),
            Err(InterviewError::SpeechUnavailable)
        );
        assert!(!disabled.is_recording());

        let mut enabled = screening(true);
        assert_eq!(
            enabled.toggle_recording(Some(false)),
            Err(InterviewError::SpeechUnavailable)
        );
        assert!(!enabled.is_recording());
    }

    #[test]
    fn test_transition_stops_recording() {
        let mut session = screening(true);
        session.toggle_recording(None).unwrap();
        session.skip_question(t0()).unwrap();
        assert!(!session.is_recording());
    }

    #[test]
    fn test_never_recording_once_finished() {
        let mut session = InterviewSession::start(RoundType::Manager, &[], true, t0());
        session.toggle_recording(None).unwrap();
        session.submit_answer("only answer", t0()).unwrap();
        assert!(session.is_finished());
        assert!(!session.is_recording());
        assert_eq!(session.toggle_recording(None), Err(InterviewError::Finished));
    }

    #[test]
    fn test_score_answer_bonuses() {
        let config = ScoringConfig::default();
        assert_eq!(score_answer(&record(250, 60), &config), 20);
        assert_eq!(score_answer(&record(100, 200), &config), 10);
        assert_eq!(score_answer(&record(200, 180), &config), 10);
        let skipped = AnswerRecord {
            answer_text: SKIP_SENTINEL.to_string(),
            ..record(0, 5)
        };
        assert_eq!(score_answer(&skipped, &config), 0);
    }

    #[test]
    fn test_score_thresholds_are_configurable() {
        let config = ScoringConfig {
            length_threshold_chars: 50,
            speed_threshold_secs: 300,
            ..ScoringConfig::default()
        };
        assert_eq!(score_answer(&record(100, 200), &config), 20);
    }

    #[test]
    fn test_results_all_answered_strong_round() {
        let config = ScoringConfig::default();
        let answers: Vec<AnswerRecord> = (0..5).map(|_| record(250, 30)).collect();
        let results = compute_results(&answers, 5, 150, &config);

        assert_eq!(results.points, 100);
        assert_eq!(results.answered_count, 5);
        assert_eq!(results.skipped_count, 0);
        assert_eq!(results.strengths.len(), 2);
        assert_eq!(results.improvements.len(), 1, "default improvement expected");
    }

    #[test]
    fn test_results_with_skips_and_low_points() {
        let config = ScoringConfig::default();
        let mut answers = vec![record(20, 400)];
        answers.extend((0..4).map(|_| AnswerRecord {
            answer_text: SKIP_SENTINEL.to_string(),
            ..record(0, 1)
        }));
        let results = compute_results(&answers, 5, 500, &config);

        assert_eq!(results.points, 10);
        assert_eq!(results.answered_count, 1);
        assert_eq!(results.skipped_count, 4);
        assert_eq!(results.strengths, vec!["You completed the practice round."]);
        assert_eq!(results.improvements.len(), 2);
    }

    #[test]
    fn test_view_reports_results_only_when_finished() {
        let config = ScoringConfig::default();
        let mut session = InterviewSession::start(RoundType::Manager, &["Q1".to_string()], true, t0());
        let active = session.view(&config, t0());
        assert_eq!(active.question_number, Some(1));
        assert!(active.results.is_none());

        session.submit_answer("answer", t0() + Duration::seconds(90)).unwrap();
        let done = session.view(&config, t0() + Duration::seconds(500));
        assert_eq!(done.status, SessionStatus::Finished);
        assert_eq!(done.question_number, None);
        assert!(!done.speech_available);
        let results = done.results.unwrap();
        assert_eq!(results.total_elapsed_seconds, 90);
        assert_eq!(results.answers.len(), 1);
    }
}
