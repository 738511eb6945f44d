//! Global Constants
//!
//! Centralized constants for pricing bounds, provider defaults, and tuning.
//! All magic numbers should be defined here with documentation.

/// Line-item schema bounds enforced by the validator
pub mod line_item {
    /// Minimum number of suggested line items accepted in one batch
    pub const MIN_ITEMS: usize = 4;

    /// Maximum number of suggested line items accepted in one batch
    pub const MAX_ITEMS: usize = 8;

    /// Lowest accepted hourly labor rate (USD)
    pub const LABOR_RATE_MIN: f64 = 45.0;

    /// Highest accepted hourly labor rate (USD)
    pub const LABOR_RATE_MAX: f64 = 95.0;

    /// Lowest accepted markup percentage
    pub const MARKUP_PCT_MIN: f64 = 10.0;

    /// Highest accepted markup percentage
    pub const MARKUP_PCT_MAX: f64 = 25.0;
}

/// Sampling parameters sent with every provider call
pub mod sampling {
    pub const TEMPERATURE: f32 = 0.2;
    pub const TOP_P: f32 = 0.9;
    pub const MAX_TOKENS: u32 = 4096;
}

/// Rate limiter defaults
pub mod rate_limit {
    /// Suggestion endpoint: calls per fixed window
    pub const SUGGEST_MAX_REQUESTS: usize = 5;

    /// Suggestion endpoint window (seconds)
    pub const SUGGEST_WINDOW_SECS: u64 = 60;

    /// Description scoring endpoint: calls per sliding window
    pub const SCORE_MAX_REQUESTS: usize = 15;

    /// Description scoring endpoint window (seconds)
    pub const SCORE_WINDOW_SECS: u64 = 60;

    /// How often idle limiter entries are dropped (seconds)
    pub const SWEEP_INTERVAL_SECS: u64 = 300;
}

/// Provider catalogue defaults
pub mod provider {
    pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";
    pub const ANTHROPIC_VERSION: &str = "2023-06-01";
    pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
    pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";
    pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
}

/// HTTP/Network constants
pub mod network {
    /// Provider request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Default server bind address
    pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
}

/// Description scoring constants
pub mod scoring {
    /// Highest score either scorer reports
    pub const MAX_SCORE: u8 = 10;

    /// Maximum number of AI tips returned to the caller
    pub const MAX_TIPS: usize = 4;
}
