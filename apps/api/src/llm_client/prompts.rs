// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// Appended to every prompt whose completion is parsed as JSON.
pub const JSON_RESPONSE_INSTRUCTION: &str = "Respond in JSON format:";
