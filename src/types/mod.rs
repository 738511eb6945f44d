pub mod error;
pub mod line_item;

pub use error::{
    ErrorCategory, EstimateError, Result, TransportError, ValidationError, ValidationErrorKind,
};
pub use line_item::{LineItem, LineItemTotals, PricedLineItem, Unit};

// =============================================================================
// Domain Newtypes
// =============================================================================

use std::fmt;

/// Type-safe wrapper for authenticated user IDs
///
/// Rate-limit maps are keyed by this so a provider id or email can never be
/// used as a limiter key by accident.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
