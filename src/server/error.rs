//! API error types and HTTP response conversion
//!
//! Endpoints use two error body shapes, kept for client compatibility:
//!
//! - enveloped: `{"success": false, "error": "..."}` (suggest, providers)
//! - bare: `{"error": "..."}` (scoring, calculate, auth failures)

use std::time::Duration;

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::types::{ErrorCategory, EstimateError};

pub const INVALID_BODY_MESSAGE: &str = "Invalid request body";
pub const DESCRIPTION_REQUIRED_MESSAGE: &str = "Description is required";
pub const SUGGEST_RATE_LIMIT_MESSAGE: &str =
    "Rate limit exceeded. Please wait a minute before trying again.";
pub const SCORE_RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Try again in a minute.";
pub const NO_PROVIDERS_MESSAGE: &str = "No AI providers configured";
pub const SUGGEST_NO_PROVIDERS_MESSAGE: &str =
    "No AI providers configured. Add at least one API key";
pub const SCORE_FAILED_MESSAGE: &str = "Failed to analyze description";

/// Error body shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorBody {
    Enveloped,
    Bare,
}

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub body: ErrorBody,
    /// Sent as `Retry-After` on 429s
    pub retry_after: Option<Duration>,
}

impl ApiError {
    pub fn enveloped(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            body: ErrorBody::Enveloped,
            retry_after: None,
        }
    }

    pub fn bare(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            body: ErrorBody::Bare,
            retry_after: None,
        }
    }

    pub fn unauthorized() -> Self {
        Self::bare(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = Some(retry_after);
        self
    }

    /// Map a suggestion failure to its enveloped response
    pub fn suggestion(err: EstimateError) -> Self {
        let status = status_for(err.category());
        let message = match &err {
            EstimateError::ProviderUnavailable(_) => SUGGEST_NO_PROVIDERS_MESSAGE.to_string(),
            EstimateError::RateLimited { .. } => SUGGEST_RATE_LIMIT_MESSAGE.to_string(),
            other => other.to_string(),
        };

        log_server_error(status, &err);
        Self::enveloped(status, message).with_retry_hint(&err)
    }

    /// Map an AI scoring failure to its bare response
    pub fn scoring(err: EstimateError) -> Self {
        let (status, message) = match &err {
            EstimateError::Input(message) => (StatusCode::BAD_REQUEST, message.clone()),
            EstimateError::RateLimited { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                SCORE_RATE_LIMIT_MESSAGE.to_string(),
            ),
            EstimateError::EmptyResponse { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                SCORE_FAILED_MESSAGE.to_string(),
            ),
        };

        log_server_error(status, &err);
        Self::bare(status, message).with_retry_hint(&err)
    }

    fn with_retry_hint(self, err: &EstimateError) -> Self {
        match err {
            EstimateError::RateLimited { retry_after } => self.with_retry_after(*retry_after),
            _ => self,
        }
    }
}

fn status_for(category: ErrorCategory) -> StatusCode {
    StatusCode::from_u16(category.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Whole seconds, rounded up and never zero
fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    secs.max(1)
}

fn log_server_error(status: StatusCode, err: &EstimateError) {
    if status.is_server_error() {
        tracing::error!(category = %err.category(), error = %err, "Request failed");
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.body {
            ErrorBody::Enveloped => json!({ "success": false, "error": self.message }),
            ErrorBody::Bare => json!({ "error": self.message }),
        };

        let mut response = (self.status, Json(body)).into_response();
        if let Some(retry_after) = self.retry_after
            && let Ok(value) = HeaderValue::from_str(&retry_after_secs(retry_after).to_string())
        {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        response
    }
}
