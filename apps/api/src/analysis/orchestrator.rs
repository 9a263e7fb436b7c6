//! Analysis orchestrator: fires the four analysis prompts concurrently.
//!
//! Flow: build prompts → `try_join!` four `TextGenerator::generate` calls →
//!       lenient-parse the three JSON completions → clean the HTML completion.
//!
//! A failure in any one call fails the whole batch; there is no partial result
//! and no retry.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::parse::{parse_ats_score, parse_questions, parse_suggestions};
use crate::analysis::prompts::{
    ATS_SCORE_PROMPT_TEMPLATE, INTERVIEW_QUESTIONS_PROMPT_TEMPLATE,
    OPTIMIZE_RESUME_PROMPT_TEMPLATE, SUGGESTIONS_PROMPT_TEMPLATE,
};
use crate::layout::clean_optimized_html;
use crate::llm_client::prompts::JSON_RESPONSE_INSTRUCTION;
use crate::llm_client::{LlmError, TextGenerator};

/// Keywords shown on the dashboard. The stored result keeps everything.
pub const DISPLAYED_KEYWORDS: usize = 5;

/// Everything one analysis run produced. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// ATS match score, 0–100.
    pub score: u8,
    pub analysis: String,
    pub keywords: Vec<String>,
    pub interview_questions: Vec<String>,
    pub suggestions: Vec<String>,
    /// Cleaned HTML, ready for preview and PDF export.
    pub optimized_resume_html: String,
}

impl AnalysisResult {
    pub fn top_keywords(&self) -> &[String] {
        let n = self.keywords.len().min(DISPLAYED_KEYWORDS);
        &self.keywords[..n]
    }
}

/// Runs all four analysis calls concurrently and assembles the result.
pub async fn run_analysis(
    generator: &dyn TextGenerator,
    resume_text: &str,
    jd_text: &str,
) -> Result<AnalysisResult, LlmError> {
    let ats_prompt = fill(ATS_SCORE_PROMPT_TEMPLATE, resume_text, jd_text);
    let questions_prompt = fill(INTERVIEW_QUESTIONS_PROMPT_TEMPLATE, resume_text, jd_text);
    let suggestions_prompt = fill(SUGGESTIONS_PROMPT_TEMPLATE, resume_text, jd_text);
    let optimize_prompt = fill(OPTIMIZE_RESUME_PROMPT_TEMPLATE, resume_text, jd_text);

    info!(
        resume_chars = resume_text.len(),
        jd_chars = jd_text.len(),
        "Starting analysis batch"
    );

    let (ats_raw, questions_raw, suggestions_raw, optimized_raw) = tokio::try_join!(
        generator.generate(&ats_prompt),
        generator.generate(&questions_prompt),
        generator.generate(&suggestions_prompt),
        generator.generate(&optimize_prompt),
    )?;

    let ats = parse_ats_score(&ats_raw);
    let result = AnalysisResult {
        score: ats.clamped_score(),
        analysis: ats.analysis,
        keywords: ats.keywords,
        interview_questions: parse_questions(&questions_raw),
        suggestions: parse_suggestions(&suggestions_raw),
        optimized_resume_html: clean_optimized_html(&optimized_raw),
    };

    info!(
        score = result.score,
        questions = result.interview_questions.len(),
        suggestions = result.suggestions.len(),
        "Analysis batch complete"
    );

    Ok(result)
}

fn fill(template: &str, resume_text: &str, jd_text: &str) -> String {
    template
        .replace("{json_instruction}", JSON_RESPONSE_INSTRUCTION)
        .replace("{resume_text}", resume_text)
        .replace("{jd_text}", jd_text)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers each prompt kind with a canned completion.
    pub(crate) struct CannedGenerator {
        pub ats: String,
        pub questions: String,
        pub suggestions: String,
        pub resume: String,
        pub fail_on: Option<&'static str>,
        pub calls: AtomicUsize,
    }

    impl CannedGenerator {
        pub(crate) fn happy() -> Self {
            Self {
                ats: r#"{"score": 82, "analysis": "Strong match.", "keywords": ["Rust", "Tokio", "AWS", "gRPC", "SQL", "Kafka"]}"#.to_string(),
                questions: r#"{"questions": ["Describe an async Rust service you built.", "How do you debug latency?"]}"#.to_string(),
                suggestions: r#"{"suggestions": ["Quantify the latency win."]}"#.to_string(),
                resume: "```html\n<h1>John Doe</h1><h2>Experience</h2>\n```".to_string(),
                fail_on: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let kind = if prompt.starts_with("You are an ATS") {
                "ats"
            } else if prompt.contains("interview questions") {
                "questions"
            } else if prompt.contains("suggest 5 powerful bullet points") {
                "suggestions"
            } else {
                "resume"
            };
            if self.fail_on == Some(kind) {
                return Err(LlmError::Api {
                    status: 429,
                    message: "Resource has been exhausted".to_string(),
                });
            }
            Ok(match kind {
                "ats" => self.ats.clone(),
                "questions" => self.questions.clone(),
                "suggestions" => self.suggestions.clone(),
                _ => self.resume.clone(),
            })
        }
    }

    #[tokio::test]
    async fn test_run_analysis_assembles_all_four_results() {
        let generator = CannedGenerator::happy();
        let result = run_analysis(&generator, "resume", "Rust engineer").await.unwrap();

        assert_eq!(generator.calls.load(Ordering::SeqCst), 4);
        assert_eq!(result.score, 82);
        assert_eq!(result.analysis, "Strong match.");
        assert_eq!(result.interview_questions.len(), 2);
        assert_eq!(result.suggestions, vec!["Quantify the latency win."]);
        assert_eq!(
            result.optimized_resume_html,
            "<h1>John Doe</h1><h2>Experience</h2>"
        );
    }

    #[tokio::test]
    async fn test_top_keywords_truncates_to_five() {
        let generator = CannedGenerator::happy();
        let result = run_analysis(&generator, "resume", "jd").await.unwrap();
        assert_eq!(result.keywords.len(), 6);
        assert_eq!(result.top_keywords().len(), DISPLAYED_KEYWORDS);
    }

    #[tokio::test]
    async fn test_single_failure_aborts_batch() {
        let mut generator = CannedGenerator::happy();
        generator.fail_on = Some("suggestions");
        let err = run_analysis(&generator, "resume", "jd").await.unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_malformed_json_degrades_instead_of_failing() {
        let mut generator = CannedGenerator::happy();
        generator.ats = "I could not score this résumé.".to_string();
        generator.questions = "Question one? Question two?".to_string();
        let result = run_analysis(&generator, "resume", "jd").await.unwrap();
        assert_eq!(result.score, 0);
        assert_eq!(result.analysis, "Unable to analyze");
        assert!(result.keywords.is_empty());
        assert!(result.interview_questions.is_empty());
    }

    #[test]
    fn test_fill_substitutes_all_placeholders() {
        let prompt = fill(ATS_SCORE_PROMPT_TEMPLATE, "RESUME_BODY", "JD_BODY");
        assert!(prompt.contains("RESUME_BODY"));
        assert!(prompt.contains("JD_BODY"));
        assert!(prompt.contains(JSON_RESPONSE_INSTRUCTION));
        assert!(!prompt.contains("{resume_text}"));
        assert!(!prompt.contains("{json_instruction}"));
    }
}
