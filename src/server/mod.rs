//! HTTP API
//!
//! ## Modules
//!
//! - `auth`: Caller identity from proxy headers
//! - `error`: Error bodies and status mapping
//! - `handlers`: Endpoint handlers
//! - `routes`: Router and shared state

pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;

pub use auth::{AuthUser, Authenticator, HeaderAuthenticator, SharedAuthenticator, Unauthorized};
pub use error::{ApiError, ApiResult, ErrorBody};
pub use routes::{AppState, create_router};

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::ai::{ProviderGateway, SharedCredentials};
use crate::config::Config;
use crate::constants::rate_limit::SWEEP_INTERVAL_SECS;
use crate::ratelimit::run_sweeper;
use crate::types::{EstimateError, Result};

/// Bind and run the API until Ctrl-C or SIGTERM
pub async fn serve(config: &Config, credentials: SharedCredentials) -> Result<()> {
    let gateway = Arc::new(ProviderGateway::from_config(config, credentials)?);

    let available = gateway.available_providers();
    if available.is_empty() {
        warn!("No AI provider has a credential; AI endpoints will fail");
    } else {
        let ids: Vec<&str> = available.iter().map(|p| p.id.as_str()).collect();
        info!(providers = ?ids, "AI providers available");
    }

    let state = AppState::new(gateway, &config.rate_limit);
    let sweeper = tokio::spawn(run_sweeper(
        vec![state.suggest_limiter.clone(), state.score_limiter.clone()],
        Duration::from_secs(SWEEP_INTERVAL_SECS),
    ));
    let app = create_router(state);

    let listener = TcpListener::bind(config.server.bind.as_str()).await.map_err(|e| {
        EstimateError::Config(format!("Failed to bind {}: {}", config.server.bind, e))
    })?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    info!("Server shut down gracefully");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM. A handler that cannot be installed never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
