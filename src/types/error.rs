//! Unified Error Type System
//!
//! Centralized error types for the estimate service.
//! Each error maps to an `ErrorCategory` that drives retry decisions in the
//! suggestion orchestrator and status codes at the HTTP boundary.
//!
//! ## Error Categories
//!
//! - **Input**: Missing or malformed request data (fail fast)
//! - **RateLimited**: Caller exceeded its window (client waits)
//! - **ProviderUnavailable**: No provider credentials configured (fatal)
//! - **EmptyResponse**: Provider returned no text (retry once)
//! - **Validation**: Model output failed extraction or schema checks (retry once)
//! - **Transport**: Network, auth, or HTTP status failure calling a provider (fatal)

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Error categories for retry and status-code routing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    RateLimited,
    ProviderUnavailable,
    EmptyResponse,
    Validation,
    Transport,
    Config,
    Internal,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input => write!(f, "INPUT"),
            Self::RateLimited => write!(f, "RATE_LIMITED"),
            Self::ProviderUnavailable => write!(f, "PROVIDER_UNAVAILABLE"),
            Self::EmptyResponse => write!(f, "EMPTY_RESPONSE"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Transport => write!(f, "TRANSPORT"),
            Self::Config => write!(f, "CONFIG"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

impl ErrorCategory {
    /// Whether the orchestrator gives the model a second attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::EmptyResponse | Self::Validation)
    }

    /// HTTP status code surfaced to callers
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Input => 400,
            Self::RateLimited => 429,
            _ => 500,
        }
    }
}

// =============================================================================
// Transport Error
// =============================================================================

/// Failure talking to a provider backend
#[derive(Debug, Clone)]
pub struct TransportError {
    /// Provider that produced the error
    pub provider: String,
    /// Detailed error message
    pub message: String,
    /// HTTP status, when the backend answered
    pub status: Option<u16>,
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "[{}:{}] {}", self.provider, status, self.message),
            None => write!(f, "[{}] {}", self.provider, self.message),
        }
    }
}

impl std::error::Error for TransportError {}

impl TransportError {
    pub fn new(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Authentication failures (bad or revoked key)
    pub fn is_auth(&self) -> bool {
        matches!(self.status, Some(401) | Some(403))
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Which rule rejected a model response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// No `[...]` span anywhere in the text
    NoJsonArray,
    /// A bracket span was found but is not valid JSON
    MalformedJson,
    /// Top-level value is not an array
    NotArray,
    /// Array length outside the accepted range
    Length,
    /// An element is not a JSON object
    NotObject,
    /// A field is missing, mistyped, or out of range
    Field,
}

/// Structured rejection of untrusted model output
///
/// `Display` yields exactly `message`, which is also what the retry loop logs
/// and embeds in terminal errors.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    /// Index of the failing item, for per-item rules
    pub index: Option<usize>,
    /// Field that failed, for `Field` rejections
    pub field: Option<&'static str>,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            index: None,
            field: None,
            message: message.into(),
        }
    }

    /// Rejection of item `index`; the message is prefixed with the item index
    pub fn item(index: usize, kind: ValidationErrorKind, detail: impl AsRef<str>) -> Self {
        Self {
            kind,
            index: Some(index),
            field: None,
            message: format!("Item {}: {}", index, detail.as_ref()),
        }
    }

    /// Add field context
    pub fn with_field(mut self, field: &'static str) -> Self {
        self.field = Some(field);
        self
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum EstimateError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // -------------------------------------------------------------------------
    // Request Errors
    // -------------------------------------------------------------------------
    #[error("{0}")]
    Input(String),

    #[error("Rate limit exceeded, retry in {}s", retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    // -------------------------------------------------------------------------
    // Provider Errors
    // -------------------------------------------------------------------------
    #[error("{0}")]
    ProviderUnavailable(String),

    #[error("Provider call failed: {0}")]
    Transport(TransportError),

    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    // -------------------------------------------------------------------------
    // Generation Errors
    // -------------------------------------------------------------------------
    /// Provider answered with no usable text
    #[error("No response from AI")]
    EmptyResponse { provider: String },

    /// Model output rejected on the final attempt
    #[error("AI output failed validation after retry: {0}")]
    Validation(ValidationError),

    /// Terminal orchestrator failure after the retry budget is spent
    #[error("{0}")]
    Generation(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl From<TransportError> for EstimateError {
    fn from(err: TransportError) -> Self {
        EstimateError::Transport(err)
    }
}

impl From<ValidationError> for EstimateError {
    fn from(err: ValidationError) -> Self {
        EstimateError::Validation(err)
    }
}

pub type Result<T> = std::result::Result<T, EstimateError>;

impl EstimateError {
    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create an input error
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Input(_) => ErrorCategory::Input,
            Self::RateLimited { .. } => ErrorCategory::RateLimited,
            Self::ProviderUnavailable(_) => ErrorCategory::ProviderUnavailable,
            Self::Transport(_) | Self::Timeout { .. } => ErrorCategory::Transport,
            Self::EmptyResponse { .. } => ErrorCategory::EmptyResponse,
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Config(_) => ErrorCategory::Config,
            Self::Io(_) | Self::Json(_) | Self::Yaml(_) | Self::Generation(_) => {
                ErrorCategory::Internal
            }
        }
    }

    /// Check if the orchestrator may retry after this error
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }
}

// =============================================================================
// Tests
// =============================================================================
