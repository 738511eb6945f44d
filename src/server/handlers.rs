//! HTTP handlers.
//!
//! Bodies are taken as raw bytes and parsed inside the handler so that auth
//! and rate-limit checks always run before body validation.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use super::AppState;
use super::auth::AuthUser;
use super::error::{
    ApiError, ApiResult, DESCRIPTION_REQUIRED_MESSAGE, INVALID_BODY_MESSAGE,
    NO_PROVIDERS_MESSAGE, SUGGEST_NO_PROVIDERS_MESSAGE,
};
use crate::ai::ProviderInfo;
use crate::estimate::{
    AiScore, ScoreBreakdown, SuggestionRequest, score_description, static_tips,
};
use crate::pricing::{EstimateSummary, price_line_item};
use crate::types::{LineItem, PricedLineItem};

fn authenticate(state: &AppState, headers: &HeaderMap) -> ApiResult<AuthUser> {
    state
        .authenticator
        .authenticate(headers)
        .map_err(|_| ApiError::unauthorized())
}

/// Lenient field access: anything that is not a string counts as absent
fn string_field(body: &Value, field: &str) -> Option<String> {
    body.get(field).and_then(Value::as_str).map(str::to_string)
}

fn required_description(body: &Value) -> Option<String> {
    string_field(body, "description")
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

// =============================================================================
// Suggestions
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestResponse {
    pub success: bool,
    pub line_items: Vec<PricedLineItem>,
    pub provider: String,
}

/// POST /suggest
pub async fn suggest(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<SuggestResponse>> {
    let user = authenticate(&state, &headers)?;

    if !state.gateway.has_available() {
        return Err(ApiError::enveloped(
            StatusCode::INTERNAL_SERVER_ERROR,
            SUGGEST_NO_PROVIDERS_MESSAGE,
        ));
    }

    state
        .suggest_limiter
        .check(&user.id)
        .into_result()
        .inspect_err(|_| info!(user = %user.id, "Suggestion rate limit exceeded"))
        .map_err(ApiError::suggestion)?;

    let body: Value = serde_json::from_slice(&body)
        .map_err(|_| ApiError::enveloped(StatusCode::BAD_REQUEST, INVALID_BODY_MESSAGE))?;

    let description = required_description(&body).ok_or_else(|| {
        ApiError::enveloped(StatusCode::BAD_REQUEST, DESCRIPTION_REQUIRED_MESSAGE)
    })?;

    let request = SuggestionRequest {
        job_type: string_field(&body, "jobType"),
        description,
        provider: string_field(&body, "provider"),
    };

    let outcome = state
        .suggestions
        .suggest(&request)
        .await
        .map_err(ApiError::suggestion)?;

    info!(
        user = %user.id,
        provider = %outcome.provider,
        items = outcome.line_items.len(),
        "Suggestions generated"
    );

    Ok(Json(SuggestResponse {
        success: true,
        line_items: outcome.line_items,
        provider: outcome.provider,
    }))
}

// =============================================================================
// Description Scoring
// =============================================================================

/// POST /score-description
pub async fn score_description_ai(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<AiScore>> {
    let user = authenticate(&state, &headers)?;

    state
        .score_limiter
        .check(&user.id)
        .into_result()
        .map_err(ApiError::scoring)?;

    let body: Value = serde_json::from_slice(&body)
        .map_err(|_| ApiError::bare(StatusCode::BAD_REQUEST, INVALID_BODY_MESSAGE))?;
    let description = required_description(&body)
        .ok_or_else(|| ApiError::bare(StatusCode::BAD_REQUEST, DESCRIPTION_REQUIRED_MESSAGE))?;

    let score = state
        .scorer
        .score(&description)
        .await
        .map_err(ApiError::scoring)?;

    Ok(Json(score))
}

#[derive(Debug, Serialize)]
pub struct LocalScoreResponse {
    pub score: u8,
    pub label: String,
    pub breakdown: ScoreBreakdown,
    pub tips: Vec<String>,
}

/// POST /score-description/local
pub async fn score_description_local(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<LocalScoreResponse>> {
    authenticate(&state, &headers)?;

    let body: Value = serde_json::from_slice(&body)
        .map_err(|_| ApiError::bare(StatusCode::BAD_REQUEST, INVALID_BODY_MESSAGE))?;
    let description = required_description(&body)
        .ok_or_else(|| ApiError::bare(StatusCode::BAD_REQUEST, DESCRIPTION_REQUIRED_MESSAGE))?;

    let result = score_description(&description);
    Ok(Json(LocalScoreResponse {
        score: result.score,
        tips: static_tips(&result.breakdown),
        label: result.label,
        breakdown: result.breakdown,
    }))
}

// =============================================================================
// Pricing
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    pub line_items: Vec<LineItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateResponse {
    pub line_items: Vec<PricedLineItem>,
    pub summary: EstimateSummary,
}

/// POST /calculate
///
/// Prices already-trusted line items; no bounds are enforced.
pub async fn calculate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<CalculateResponse>> {
    authenticate(&state, &headers)?;

    let request: CalculateRequest = serde_json::from_slice(&body)
        .map_err(|_| ApiError::bare(StatusCode::BAD_REQUEST, INVALID_BODY_MESSAGE))?;

    let summary = EstimateSummary::from_items(&request.line_items);
    let line_items = request.line_items.into_iter().map(price_line_item).collect();

    Ok(Json(CalculateResponse {
        line_items,
        summary,
    }))
}

// =============================================================================
// Providers & Health
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ProvidersResponse {
    pub success: bool,
    pub providers: Vec<ProviderInfo>,
}

/// GET /providers
pub async fn providers(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<ProvidersResponse>> {
    authenticate(&state, &headers)?;

    let providers = state.gateway.available_providers();
    if providers.is_empty() {
        return Err(ApiError::enveloped(
            StatusCode::INTERNAL_SERVER_ERROR,
            NO_PROVIDERS_MESSAGE,
        ));
    }

    Ok(Json(ProvidersResponse {
        success: true,
        providers,
    }))
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
