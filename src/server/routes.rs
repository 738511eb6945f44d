//! API route definitions

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use super::auth::{HeaderAuthenticator, SharedAuthenticator};
use super::handlers;
use crate::ai::ProviderGateway;
use crate::config::RateLimitConfig;
use crate::estimate::{DescriptionScorer, SuggestionOrchestrator};
use crate::ratelimit::{FixedWindowLimiter, SharedRateLimiter, SlidingLogLimiter};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<ProviderGateway>,
    pub suggestions: Arc<SuggestionOrchestrator>,
    pub scorer: Arc<DescriptionScorer>,
    pub suggest_limiter: SharedRateLimiter,
    pub score_limiter: SharedRateLimiter,
    pub authenticator: SharedAuthenticator,
}

impl AppState {
    /// Wire services around one gateway with header-based auth
    pub fn new(gateway: Arc<ProviderGateway>, limits: &RateLimitConfig) -> Self {
        Self {
            suggestions: Arc::new(SuggestionOrchestrator::new(gateway.clone())),
            scorer: Arc::new(DescriptionScorer::new(gateway.clone())),
            suggest_limiter: Arc::new(FixedWindowLimiter::new(
                limits.suggest_max_requests,
                limits.suggest_window(),
            )),
            score_limiter: Arc::new(SlidingLogLimiter::new(
                limits.score_max_requests,
                limits.score_window(),
            )),
            authenticator: Arc::new(HeaderAuthenticator),
            gateway,
        }
    }

    pub fn with_authenticator(mut self, authenticator: SharedAuthenticator) -> Self {
        self.authenticator = authenticator;
        self
    }
}

/// Build the complete API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/providers", get(handlers::providers))
        .route("/suggest", post(handlers::suggest))
        .route("/score-description", post(handlers::score_description_ai))
        .route(
            "/score-description/local",
            post(handlers::score_description_local),
        )
        .route("/calculate", post(handlers::calculate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
