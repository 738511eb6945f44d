//! Estimate Services
//!
//! AI-backed workflows built on the provider gateway.
//!
//! ## Modules
//!
//! - `suggest`: Line-item suggestion with one retry
//! - `scoring`: Description completeness scoring (local and AI)

pub mod scoring;
pub mod suggest;

pub use scoring::{
    AiScore, DescriptionScorer, ScoreBreakdown, ScoreResult, score_description, score_label,
    static_tips,
};
pub use suggest::{
    AttemptOutcome, SuggestState, SuggestionOrchestrator, SuggestionOutcome, SuggestionRequest,
};
