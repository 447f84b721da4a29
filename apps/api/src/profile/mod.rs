//! Resume-to-profile extraction: PDF text, then an LLM pass that returns a
//! structured `CandidateProfile`.

pub mod extract;
pub mod handlers;
pub mod prompts;
