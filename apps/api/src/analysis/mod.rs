// Analysis: résumé + job description → ATS score, interview questions,
// bullet suggestions and an optimized résumé, via four concurrent model calls.

pub mod handlers;
pub mod orchestrator;
pub mod parse;
pub mod prompts;
pub mod store;

pub use store::AnalysisStore;
