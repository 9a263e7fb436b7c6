//! Question pools per round type.

use serde::{Serialize, Serializer};

/// Used when no round-specific or AI-generated questions are available.
pub const GENERIC_QUESTION: &str = "Tell me about yourself and why you are interested in this role.";

const SCREENING_QUESTIONS: [&str; 5] = [
    "Walk me through your background and your most recent role.",
    "What interests you about this position and our company?",
    "What are your salary expectations for this role?",
    "When would you be available to start?",
    "Why are you looking to leave your current position?",
];

const TEAM_QUESTIONS: [&str; 5] = [
    "Describe a time you disagreed with a teammate. How did you resolve it?",
    "How do you prefer to give and receive feedback?",
    "Tell me about a project where you had to collaborate across teams.",
    "How do you handle a teammate who is not pulling their weight?",
    "What kind of team culture helps you do your best work?",
];

/// The practice round picked on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundType {
    /// Hiring-manager round, driven by the questions generated for the job.
    Manager,
    Screening,
    Team,
    /// Any other label; treated like a manager round.
    Other(String),
}

impl RoundType {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "manager" => RoundType::Manager,
            "screening" => RoundType::Screening,
            "team" => RoundType::Team,
            _ => RoundType::Other(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RoundType::Manager => "manager",
            RoundType::Screening => "screening",
            RoundType::Team => "team",
            RoundType::Other(label) => label,
        }
    }
}

impl Serialize for RoundType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Picks the question list for a round. Never empty.
pub fn questions_for_round(round: &RoundType, ai_questions: &[String]) -> Vec<String> {
    match round {
        RoundType::Screening => SCREENING_QUESTIONS.iter().map(|q| q.to_string()).collect(),
        RoundType::Team => TEAM_QUESTIONS.iter().map(|q| q.to_string()).collect(),
        RoundType::Manager | RoundType::Other(_) => {
            let generated: Vec<String> = ai_questions
                .iter()
                .map(|q| q.trim())
                .filter(|q| !q.is_empty())
                .map(str::to_string)
                .collect();
            if generated.is_empty() {
                vec![GENERIC_QUESTION.to_string()]
            } else {
                generated
            }
        }
    }
}
