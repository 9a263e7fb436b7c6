//! Lenient parsing of model completions that are supposed to be JSON.
//!
//! Two branches only: the completion parses (whole text, or the single embedded
//! `{ … }` object), or the caller's fallback value is returned. A malformed
//! completion is never an error.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::llm_client::strip_json_fences;

/// Outcome of a lenient parse. Callers that only want the value use `into_value`.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed<T> {
    Parsed(T),
    Fallback(T),
}

impl<T> Parsed<T> {
    pub fn into_value(self) -> T {
        match self {
            Parsed::Parsed(v) | Parsed::Fallback(v) => v,
        }
    }
}

/// Parses `text` as `T`, falling back to `fallback` when no JSON object can be read.
pub fn parse_or_fallback<T: DeserializeOwned>(text: &str, fallback: T, label: &str) -> Parsed<T> {
    let stripped = strip_json_fences(text);
    if let Ok(value) = serde_json::from_str::<T>(stripped) {
        return Parsed::Parsed(value);
    }

    if let Some(block) = embedded_object(stripped) {
        match serde_json::from_str::<T>(block) {
            Ok(value) => return Parsed::Parsed(value),
            Err(e) => warn!("{label}: embedded JSON did not parse ({e}); using fallback"),
        }
    } else {
        warn!("{label}: completion contained no JSON object; using fallback");
    }

    Parsed::Fallback(fallback)
}

/// Returns the span from the first `{` to the last `}`, if any.
fn embedded_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

// ────────────────────────────────────────────────────────────────────────────
// Response shapes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtsScore {
    #[serde(default, deserialize_with = "loose_number")]
    pub score: f64,
    #[serde(default, deserialize_with = "loose_string")]
    pub analysis: String,
    #[serde(default, deserialize_with = "loose_strings")]
    pub keywords: Vec<String>,
}

/// Accepts a number or a numeric string (`"85"`, `"85%"`); anything else is 0.
fn loose_number<'de, D: Deserializer<'de>>(de: D) -> Result<f64, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::Number(n) => n.as_f64().unwrap_or_default(),
        Value::String(s) => s
            .trim()
            .trim_end_matches('%')
            .trim()
            .parse()
            .unwrap_or_default(),
        _ => 0.0,
    })
}

/// `null` reads as empty; non-string scalars keep their JSON text.
fn loose_string<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// `null` reads as empty; non-string entries are dropped.
fn loose_strings<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

impl AtsScore {
    pub fn unavailable() -> Self {
        Self {
            score: 0.0,
            analysis: "Unable to analyze".to_string(),
            keywords: vec![],
        }
    }

    /// Score as shown to the user: rounded and clamped to 0–100.
    pub fn clamped_score(&self) -> u8 {
        if self.score.is_finite() {
            self.score.round().clamp(0.0, 100.0) as u8
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QuestionList {
    #[serde(default)]
    pub questions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SuggestionList {
    #[serde(default)]
    pub suggestions: Vec<String>,
}

pub fn parse_ats_score(text: &str) -> AtsScore {
    parse_or_fallback(text, AtsScore::unavailable(), "ATS score").into_value()
}

pub fn parse_questions(text: &str) -> Vec<String> {
    let parsed = parse_or_fallback(text, QuestionList::default(), "interview questions");
    non_blank(parsed.into_value().questions)
}

pub fn parse_suggestions(text: &str) -> Vec<String> {
    let parsed = parse_or_fallback(text, SuggestionList::default(), "suggestions");
    non_blank(parsed.into_value().suggestions)
}

fn non_blank(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
