//! jobquote - AI-Assisted Construction Estimates
//!
//! Prices estimate line items and asks LLM providers to draft them from a
//! free-text job description. Model output is never trusted: every batch is
//! extracted, validated against fixed bounds, and re-priced locally.
//!
//! ## Core Features
//!
//! - **Pricing Engine**: Cent-rounded totals per line item and per estimate
//! - **Provider Gateway**: Anthropic plus OpenAI-compatible backends with
//!   credential-based fallback
//! - **Validated Suggestions**: All-or-nothing batch validation with one retry
//! - **Rate Limiting**: Per-user fixed-window and sliding-log limiters
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use jobquote::{Config, EnvCredentials, ProviderGateway, SuggestionOrchestrator, SuggestionRequest};
//!
//! let gateway = ProviderGateway::from_config(&Config::default(), Arc::new(EnvCredentials))?;
//! let orchestrator = SuggestionOrchestrator::new(Arc::new(gateway));
//! let outcome = orchestrator
//!     .suggest(&SuggestionRequest {
//!         description: "Retile 120 sqft bathroom floor".into(),
//!         ..Default::default()
//!     })
//!     .await?;
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: Providers, prompts, response extraction and validation
//! - [`pricing`]: Line-item and estimate money math
//! - [`estimate`]: Suggestion and description-scoring workflows
//! - [`ratelimit`]: Per-user request limits
//! - [`server`]: HTTP API
//! - [`config`]: Layered configuration

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod estimate;
pub mod pricing;
pub mod ratelimit;
pub mod server;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigFormat, ConfigLoader};

// Error Types
pub use types::error::{ErrorCategory, EstimateError, Result, ValidationError};

// Domain
pub use types::{LineItem, LineItemTotals, PricedLineItem, Unit, UserId};

// =============================================================================
// Pricing & Estimate Re-exports
// =============================================================================

pub use pricing::{EstimateSummary, calculate_line_item_totals, price_line_item, round2};

pub use estimate::{
    AiScore, DescriptionScorer, ScoreResult, SuggestionOrchestrator, SuggestionOutcome,
    SuggestionRequest, score_description,
};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{
    EnvCredentials, LlmProvider, ProviderGateway, SharedCredentials, parse_line_item_response,
    validate_line_items, with_timeout,
};

// =============================================================================
// Server Re-exports
// =============================================================================

pub use ratelimit::{FixedWindowLimiter, RateDecision, RateLimiter, SlidingLogLimiter};
pub use server::{AppState, create_router};
