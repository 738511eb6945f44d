//! Line-Item Suggestion Orchestrator
//!
//! Drives prompt → gateway → extraction → validation → pricing with exactly
//! one retry. The retry contract lives in [`SuggestState::advance`], a pure
//! transition function, so it can be exercised without any provider.
//!
//! ## States
//!
//! ```text
//! Attempt1 ──empty──────────► Attempt2 (requested id)
//!    │     ──rejected───────► Attempt2 (id that served attempt 1)
//!    └─────accepted─────────► Success
//! Attempt2 ──empty──────────► Failed "No response from AI"
//!          ──rejected───────► Failed "AI output failed validation after retry: …"
//!          ──accepted───────► Success
//! ```
//!
//! Gateway errors (no provider, transport, timeout) leave the machine
//! immediately and are never retried.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::ai::provider::{ProviderCompletion, ProviderGateway};
use crate::ai::{PromptTemplates, parse_line_item_response};
use crate::pricing::price_line_item;
use crate::types::{EstimateError, LineItem, PricedLineItem, Result, ValidationError};

const GENERATION_FAILED_MESSAGE: &str = "AI generation failed";

/// Caller input for one suggestion run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Preferred provider id; empty or absent means first available
    #[serde(default)]
    pub provider: Option<String>,
}

/// Successful suggestion run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionOutcome {
    pub line_items: Vec<PricedLineItem>,
    /// Provider that produced the accepted answer
    pub provider: String,
}

// =============================================================================
// State Machine
// =============================================================================

/// Result of one gateway call, classified for the state machine
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    /// The provider produced no usable text
    Empty { served_by: String },
    /// Text was produced but failed extraction or validation
    Rejected {
        served_by: String,
        reason: ValidationError,
    },
    Accepted {
        served_by: String,
        items: Vec<LineItem>,
    },
}

impl AttemptOutcome {
    /// Classify a gateway completion by running it through the validator
    pub fn from_completion(completion: ProviderCompletion) -> Self {
        let served_by = completion.provider;
        match completion.content {
            None => Self::Empty { served_by },
            Some(content) => match parse_line_item_response(&content) {
                Ok(items) => Self::Accepted { served_by, items },
                Err(reason) => Self::Rejected { served_by, reason },
            },
        }
    }

    pub fn served_by(&self) -> &str {
        match self {
            Self::Empty { served_by }
            | Self::Rejected { served_by, .. }
            | Self::Accepted { served_by, .. } => served_by,
        }
    }

    /// Error this outcome stands for, `None` when accepted
    pub fn error(&self) -> Option<EstimateError> {
        match self {
            Self::Empty { served_by } => Some(EstimateError::EmptyResponse {
                provider: served_by.clone(),
            }),
            Self::Rejected { reason, .. } => Some(EstimateError::Validation(reason.clone())),
            Self::Accepted { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SuggestState {
    Attempt1 { requested: String },
    Attempt2 { provider: String },
    Success {
        provider: String,
        items: Vec<LineItem>,
    },
    /// Holds the outcome that ended the run
    Failed { last: AttemptOutcome },
}

impl SuggestState {
    pub fn start(requested: impl Into<String>) -> Self {
        Self::Attempt1 {
            requested: requested.into(),
        }
    }

    /// Provider id to request next, `None` once terminal
    pub fn next_provider(&self) -> Option<&str> {
        match self {
            Self::Attempt1 { requested } => Some(requested.as_str()),
            Self::Attempt2 { provider } => Some(provider.as_str()),
            Self::Success { .. } | Self::Failed { .. } => None,
        }
    }

    /// 1-based attempt number, `None` once terminal
    pub fn attempt(&self) -> Option<u8> {
        match self {
            Self::Attempt1 { .. } => Some(1),
            Self::Attempt2 { .. } => Some(2),
            Self::Success { .. } | Self::Failed { .. } => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next_provider().is_none()
    }

    /// Apply one attempt outcome. Terminal states absorb further input.
    ///
    /// A retryable failure on attempt 1 moves to attempt 2: an empty answer
    /// goes back to the requested id, a rejected one stays on the provider
    /// that produced it.
    pub fn advance(self, outcome: AttemptOutcome) -> Self {
        let retryable = outcome.error().is_some_and(|err| err.is_retryable());

        match (self, outcome) {
            (terminal @ (Self::Success { .. } | Self::Failed { .. }), _) => terminal,
            (_, AttemptOutcome::Accepted { served_by, items }) => Self::Success {
                provider: served_by,
                items,
            },
            (Self::Attempt1 { requested }, failed) if retryable => {
                let provider = match failed {
                    AttemptOutcome::Empty { .. } => requested,
                    other => other.served_by().to_string(),
                };
                Self::Attempt2 { provider }
            }
            (_, failed) => Self::Failed { last: failed },
        }
    }

    /// Consume a terminal state
    pub fn into_result(self) -> Result<(String, Vec<LineItem>)> {
        match self {
            Self::Success { provider, items } => Ok((provider, items)),
            Self::Failed { last } => Err(last.error().unwrap_or_else(generation_failed)),
            Self::Attempt1 { .. } | Self::Attempt2 { .. } => Err(generation_failed()),
        }
    }
}

fn generation_failed() -> EstimateError {
    EstimateError::Generation(GENERATION_FAILED_MESSAGE.to_string())
}

// =============================================================================
// Orchestrator
// =============================================================================

pub struct SuggestionOrchestrator {
    gateway: Arc<ProviderGateway>,
}

impl SuggestionOrchestrator {
    pub fn new(gateway: Arc<ProviderGateway>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &ProviderGateway {
        &self.gateway
    }

    /// Generate, validate, and price line items for a job description
    #[instrument(skip(self, request), fields(run_id = %Uuid::new_v4()))]
    pub async fn suggest(&self, request: &SuggestionRequest) -> Result<SuggestionOutcome> {
        let description = request.description.trim();
        if description.is_empty() {
            return Err(EstimateError::input("Description is required"));
        }

        let prompt = PromptTemplates::line_item_suggestion(request.job_type.as_deref(), description);
        let requested = request.provider.as_deref().unwrap_or_default();

        let mut state = SuggestState::start(requested);
        while let Some(provider_id) = state.next_provider().map(str::to_string) {
            let attempt = state.attempt().unwrap_or_default();
            let completion = self.gateway.call_provider(&provider_id, &prompt).await?;
            let outcome = AttemptOutcome::from_completion(completion);

            match &outcome {
                AttemptOutcome::Empty { served_by } => {
                    warn!(attempt, provider = %served_by, "AI suggestion returned no content");
                }
                AttemptOutcome::Rejected { served_by, reason } => {
                    warn!(
                        attempt,
                        provider = %served_by,
                        reason = %reason,
                        "AI suggestion failed validation"
                    );
                }
                AttemptOutcome::Accepted { served_by, items } => {
                    info!(attempt, provider = %served_by, items = items.len(), "AI suggestion accepted");
                }
            }

            state = state.advance(outcome);
        }

        let (provider, items) = state.into_result()?;
        Ok(SuggestionOutcome {
            line_items: items.into_iter().map(price_line_item).collect(),
            provider,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{LlmProvider, SharedProvider};
    use crate::types::{ErrorCategory, TransportError, ValidationErrorKind};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Provider that replays a fixed script of answers
    struct ScriptedProvider {
        id: String,
        script: Mutex<VecDeque<Result<Option<String>>>>,
        calls: Mutex<usize>,
    }

    impl ScriptedProvider {
        fn new(id: &str, script: Vec<Result<Option<String>>>) -> Self {
            Self {
                id: id.to_string(),
                script: Mutex::new(script.into()),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn id(&self) -> &str {
            &self.id
        }

        fn name(&self) -> &str {
            &self.id
        }

        fn model(&self) -> &str {
            "scripted"
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn call(&self, _prompt: &str) -> Result<Option<String>> {
            *self.calls.lock().unwrap() += 1;
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(None))
        }
    }

    fn item_json(name: &str) -> serde_json::Value {
        json!({
            "name": name,
            "description": "Supply and install",
            "unit": "sqft",
            "qty": 200,
            "unitCost": 75,
            "laborHours": 10,
            "laborRate": 65,
            "markupPct": 15,
            "totalCost": 1
        })
    }

    fn valid_batch(n: usize) -> String {
        let items: Vec<_> = (0..n).map(|i| item_json(&format!("Item {}", i))).collect();
        serde_json::to_string(&items).unwrap()
    }

    fn orchestrator(provider: Arc<ScriptedProvider>) -> SuggestionOrchestrator {
        let gateway = ProviderGateway::builder().add_shared(provider).build();
        SuggestionOrchestrator::new(Arc::new(gateway))
    }

    fn request(description: &str) -> SuggestionRequest {
        SuggestionRequest {
            description: description.to_string(),
            ..Default::default()
        }
    }

    fn rejection() -> ValidationError {
        ValidationError::new(ValidationErrorKind::Length, "Expected 4-8 line items, got 2")
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    #[test]
    fn test_empty_first_attempt_retries_requested_provider() {
        let state = SuggestState::start("anthropic").advance(AttemptOutcome::Empty {
            served_by: "groq".to_string(),
        });
        assert_eq!(
            state,
            SuggestState::Attempt2 {
                provider: "anthropic".to_string()
            }
        );
    }

    #[test]
    fn test_rejected_first_attempt_retries_serving_provider() {
        let state = SuggestState::start("anthropic").advance(AttemptOutcome::Rejected {
            served_by: "groq".to_string(),
            reason: rejection(),
        });
        assert_eq!(state.next_provider(), Some("groq"));
        assert_eq!(state.attempt(), Some(2));
    }

    #[test]
    fn test_second_failure_is_terminal() {
        let empty = SuggestState::Attempt2 {
            provider: "groq".to_string(),
        }
        .advance(AttemptOutcome::Empty {
            served_by: "groq".to_string(),
        });
        assert!(empty.is_terminal());
        let err = empty.into_result().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::EmptyResponse);
        assert_eq!(err.to_string(), "No response from AI");

        let rejected = SuggestState::Attempt2 {
            provider: "groq".to_string(),
        }
        .advance(AttemptOutcome::Rejected {
            served_by: "groq".to_string(),
            reason: rejection(),
        });
        let err = rejected.into_result().unwrap_err();
        assert!(matches!(err, EstimateError::Validation(ref reason) if *reason == rejection()));
        assert_eq!(
            err.to_string(),
            "AI output failed validation after retry: Expected 4-8 line items, got 2"
        );
    }

    #[test]
    fn test_outcome_errors_follow_taxonomy() {
        let empty = AttemptOutcome::Empty {
            served_by: "groq".to_string(),
        };
        let rejected = AttemptOutcome::Rejected {
            served_by: "groq".to_string(),
            reason: rejection(),
        };
        let accepted = AttemptOutcome::Accepted {
            served_by: "groq".to_string(),
            items: Vec::new(),
        };

        assert_eq!(
            empty.error().map(|e| e.category()),
            Some(ErrorCategory::EmptyResponse)
        );
        assert_eq!(
            rejected.error().map(|e| e.category()),
            Some(ErrorCategory::Validation)
        );
        assert!(accepted.error().is_none());
        assert_eq!(rejected.served_by(), "groq");
    }

    #[test]
    fn test_terminal_states_absorb_input() {
        let success = SuggestState::Success {
            provider: "openai".to_string(),
            items: Vec::new(),
        };
        let after = success.clone().advance(AttemptOutcome::Empty {
            served_by: "groq".to_string(),
        });
        assert_eq!(after, success);
    }

    // -------------------------------------------------------------------------
    // Orchestration
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_empty_then_valid_returns_priced_items() {
        let provider = Arc::new(ScriptedProvider::new(
            "groq",
            vec![Ok(None), Ok(Some(valid_batch(5)))],
        ));
        let outcome = orchestrator(Arc::clone(&provider))
            .suggest(&request("Install granite counters"))
            .await
            .unwrap();

        assert_eq!(provider.calls(), 2);
        assert_eq!(outcome.provider, "groq");
        assert_eq!(outcome.line_items.len(), 5);
        for (i, priced) in outcome.line_items.iter().enumerate() {
            assert_eq!(priced.item.sort_order, i);
            assert_eq!(priced.totals.materials_cost, 15000.0);
            assert_eq!(priced.totals.final_total, 17997.5);
        }
    }

    #[tokio::test]
    async fn test_first_attempt_success_makes_one_call() {
        let provider = Arc::new(ScriptedProvider::new(
            "openai",
            vec![Ok(Some(format!("Here you go:\n{}", valid_batch(4))))],
        ));
        let outcome = orchestrator(Arc::clone(&provider))
            .suggest(&request("Paint a fence"))
            .await
            .unwrap();

        assert_eq!(provider.calls(), 1);
        assert_eq!(outcome.line_items.len(), 4);
    }

    #[tokio::test]
    async fn test_invalid_twice_reports_last_reason() {
        let provider = Arc::new(ScriptedProvider::new(
            "groq",
            vec![
                Ok(Some("no json here".to_string())),
                Ok(Some(valid_batch(9))),
            ],
        ));
        let err = orchestrator(Arc::clone(&provider))
            .suggest(&request("Replace roof"))
            .await
            .unwrap_err();

        assert_eq!(provider.calls(), 2);
        assert_eq!(
            err.to_string(),
            "AI output failed validation after retry: Expected 4-8 line items, got 9"
        );
    }

    /// Registered first but never has a credential
    struct UnavailableProvider;

    #[async_trait]
    impl LlmProvider for UnavailableProvider {
        fn id(&self) -> &str {
            "anthropic"
        }

        fn name(&self) -> &str {
            "Anthropic"
        }

        fn model(&self) -> &str {
            "unavailable"
        }

        fn is_available(&self) -> bool {
            false
        }

        async fn call(&self, _prompt: &str) -> Result<Option<String>> {
            Err(TransportError::new("anthropic", "not configured").into())
        }
    }

    #[tokio::test]
    async fn test_rejected_answer_retries_on_fallback_provider() {
        let groq = Arc::new(ScriptedProvider::new(
            "groq",
            vec![
                Ok(Some(valid_batch(3))),
                Ok(Some(format!("```json\n{}\n```", valid_batch(5)))),
            ],
        ));
        let gateway = ProviderGateway::builder()
            .add_provider(UnavailableProvider)
            .add_shared(Arc::clone(&groq) as SharedProvider)
            .build();
        let orchestrator = SuggestionOrchestrator::new(Arc::new(gateway));

        let outcome = orchestrator
            .suggest(&SuggestionRequest {
                description: "Retile bathroom floor".to_string(),
                provider: Some("anthropic".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(groq.calls(), 2);
        assert_eq!(outcome.provider, "groq");
        assert_eq!(outcome.line_items.len(), 5);
        assert_eq!(outcome.line_items[4].item.sort_order, 4);
    }

    #[tokio::test]
    async fn test_empty_twice_is_no_response() {
        let provider = Arc::new(ScriptedProvider::new("groq", vec![Ok(None), Ok(None)]));
        let err = orchestrator(provider)
            .suggest(&request("Replace roof"))
            .await
            .unwrap_err();
        assert!(matches!(err, EstimateError::EmptyResponse { ref provider } if provider == "groq"));
        assert_eq!(err.to_string(), "No response from AI");
    }

    #[tokio::test]
    async fn test_transport_error_is_not_retried() {
        let provider = Arc::new(ScriptedProvider::new(
            "groq",
            vec![
                Err(TransportError::new("groq", "bad key").with_status(401).into()),
                Ok(Some(valid_batch(4))),
            ],
        ));
        let err = orchestrator(Arc::clone(&provider))
            .suggest(&request("Replace roof"))
            .await
            .unwrap_err();

        assert_eq!(provider.calls(), 1);
        assert!(matches!(err, EstimateError::Transport(_)));
    }

    #[tokio::test]
    async fn test_blank_description_is_input_error() {
        let provider = Arc::new(ScriptedProvider::new("groq", vec![]));
        let err = orchestrator(Arc::clone(&provider))
            .suggest(&request("   "))
            .await
            .unwrap_err();

        assert!(matches!(err, EstimateError::Input(_)));
        assert_eq!(provider.calls(), 0);
    }

    #[test]
    fn test_request_deserializes_optional_fields() {
        let req: SuggestionRequest =
            serde_json::from_str(r#"{"description":"Tile floor","jobType":"Bath"}"#).unwrap();
        assert_eq!(req.job_type.as_deref(), Some("Bath"));
        assert_eq!(req.provider, None);
    }
}
