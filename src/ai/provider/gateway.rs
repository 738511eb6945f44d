//! Provider Gateway
//!
//! Ordered set of backends behind one call contract.
//!
//! ## Selection
//!
//! 1. If the requested provider id is available, it serves the call
//! 2. Otherwise the first available provider in priority order serves it
//! 3. With zero available providers the call fails as `ProviderUnavailable`
//!
//! Availability is asked of each provider on every call; nothing is cached.
//! The gateway never retries. Retry policy belongs to the orchestrator.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use super::{LlmProvider, ProviderInfo, SharedCredentials, SharedProvider, create_provider};
use crate::ai::timeout::with_timeout;
use crate::config::Config;
use crate::constants::network::DEFAULT_TIMEOUT_SECS;
use crate::types::{EstimateError, Result};

pub(crate) const NO_PROVIDER_MESSAGE: &str =
    "No AI provider configured. Add at least one API key";

/// Answer from one gateway call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCompletion {
    /// Trimmed text, `None` when the backend produced nothing usable
    pub content: Option<String>,
    /// Id of the provider that actually served the call
    pub provider: String,
}

/// Ordered provider set with availability-based fallback
pub struct ProviderGateway {
    providers: Vec<SharedProvider>,
    timeout: Duration,
}

impl std::fmt::Debug for ProviderGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<&str> = self.providers.iter().map(|p| p.id()).collect();
        f.debug_struct("ProviderGateway")
            .field("providers", &ids)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ProviderGateway {
    pub fn builder() -> ProviderGatewayBuilder {
        ProviderGatewayBuilder::new()
    }

    /// Build the gateway from the resolved provider catalogue
    pub fn from_config(config: &Config, credentials: SharedCredentials) -> Result<Self> {
        let timeout = config.request_timeout();
        let sampling = config.sampling();

        let mut builder = ProviderGatewayBuilder::new().timeout(timeout);
        for provider_config in config.provider_configs()? {
            let provider = create_provider(
                &provider_config,
                sampling,
                Arc::clone(&credentials),
                timeout,
            )?;
            builder = builder.add_shared(provider);
        }

        Ok(builder.build())
    }

    /// All providers in priority order, available or not
    pub fn providers(&self) -> &[SharedProvider] {
        &self.providers
    }

    /// Providers whose credential is present right now, in priority order
    pub fn available_providers(&self) -> Vec<ProviderInfo> {
        self.providers
            .iter()
            .filter(|p| p.is_available())
            .map(|p| p.info())
            .collect()
    }

    pub fn has_available(&self) -> bool {
        self.providers.iter().any(|p| p.is_available())
    }

    /// Resolve which provider serves a request for `provider_id`.
    ///
    /// An empty id means "first available".
    pub fn select(&self, provider_id: &str) -> Option<&SharedProvider> {
        let requested = (!provider_id.is_empty())
            .then(|| {
                self.providers
                    .iter()
                    .find(|p| p.id() == provider_id && p.is_available())
            })
            .flatten();

        requested.or_else(|| self.providers.iter().find(|p| p.is_available()))
    }

    /// Call the requested provider, falling back to the first available one
    #[instrument(skip(self, prompt))]
    pub async fn call_provider(&self, provider_id: &str, prompt: &str) -> Result<ProviderCompletion> {
        let provider = self
            .select(provider_id)
            .ok_or_else(|| EstimateError::ProviderUnavailable(NO_PROVIDER_MESSAGE.to_string()))?;

        if !provider_id.is_empty() && provider.id() != provider_id {
            info!(
                requested = %provider_id,
                serving = %provider.id(),
                "Requested provider unavailable, falling back"
            );
        }

        let operation = format!("{} completion", provider.id());
        let content = with_timeout(self.timeout, provider.call(prompt), &operation)
            .await
            .inspect_err(|err| {
                if let EstimateError::Transport(transport) = err
                    && transport.is_auth()
                {
                    warn!(
                        provider = %provider.id(),
                        status = ?transport.status,
                        "Provider rejected its credential"
                    );
                }
            })?;

        debug!(provider = %provider.id(), has_content = content.is_some(), "Gateway call finished");

        Ok(ProviderCompletion {
            content,
            provider: provider.id().to_string(),
        })
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for provider gateways; insertion order is priority order
pub struct ProviderGatewayBuilder {
    providers: Vec<SharedProvider>,
    timeout: Duration,
}

impl ProviderGatewayBuilder {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn add_provider(mut self, provider: impl LlmProvider + 'static) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    pub fn add_shared(mut self, provider: SharedProvider) -> Self {
        self.providers.push(provider);
        self
    }

    /// Upper bound for a single provider call
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> ProviderGateway {
        ProviderGateway {
            providers: self.providers,
            timeout: self.timeout,
        }
    }
}

impl Default for ProviderGatewayBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::StaticCredentials;
    use crate::types::TransportError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockProvider {
        id: String,
        available: bool,
        reply: Option<String>,
        calls: AtomicUsize,
    }

    impl MockProvider {
        fn new(id: &str, available: bool) -> Self {
            Self {
                id: id.to_string(),
                available,
                reply: Some(format!("from {}", id)),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        fn id(&self) -> &str {
            &self.id
        }

        fn name(&self) -> &str {
            &self.id
        }

        fn model(&self) -> &str {
            "mock-model"
        }

        fn is_available(&self) -> bool {
            self.available
        }

        async fn call(&self, _prompt: &str) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    struct SlowProvider;

    #[async_trait]
    impl LlmProvider for SlowProvider {
        fn id(&self) -> &str {
            "slow"
        }

        fn name(&self) -> &str {
            "Slow"
        }

        fn model(&self) -> &str {
            "slow-model"
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn call(&self, _prompt: &str) -> Result<Option<String>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Some("late".to_string()))
        }
    }

    fn gateway(providers: Vec<(&str, bool)>) -> ProviderGateway {
        mock_gateway(providers).0
    }

    /// Gateway plus handles on its mocks, in insertion order
    fn mock_gateway(providers: Vec<(&str, bool)>) -> (ProviderGateway, Vec<Arc<MockProvider>>) {
        let mocks: Vec<Arc<MockProvider>> = providers
            .into_iter()
            .map(|(id, available)| Arc::new(MockProvider::new(id, available)))
            .collect();
        let gateway = mocks
            .iter()
            .fold(ProviderGateway::builder(), |b, mock| {
                let shared: SharedProvider = Arc::clone(mock) as SharedProvider;
                b.add_shared(shared)
            })
            .build();
        (gateway, mocks)
    }

    #[tokio::test]
    async fn test_requested_provider_serves_when_available() {
        let (gateway, mocks) = mock_gateway(vec![("anthropic", true), ("groq", true)]);
        let completion = gateway.call_provider("groq", "prompt").await.unwrap();
        assert_eq!(completion.provider, "groq");
        assert_eq!(completion.content.as_deref(), Some("from groq"));
        assert_eq!(mocks[0].calls(), 0);
        assert_eq!(mocks[1].calls(), 1);
    }

    #[tokio::test]
    async fn test_falls_back_to_first_available() {
        let (gateway, mocks) =
            mock_gateway(vec![("anthropic", false), ("openai", false), ("groq", true)]);
        let completion = gateway.call_provider("anthropic", "prompt").await.unwrap();
        assert_eq!(completion.provider, "groq");

        let calls: Vec<usize> = mocks.iter().map(|m| m.calls()).collect();
        assert_eq!(calls, [0, 0, 1]);
    }

    #[tokio::test]
    async fn test_empty_id_uses_priority_order() {
        let (gateway, mocks) =
            mock_gateway(vec![("anthropic", false), ("openai", true), ("groq", true)]);
        let completion = gateway.call_provider("", "prompt").await.unwrap();
        assert_eq!(completion.provider, "openai");
        assert_eq!(mocks[1].calls(), 1);
        assert_eq!(mocks[2].calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_id_falls_back() {
        let gateway = gateway(vec![("gemini", true)]);
        let completion = gateway.call_provider("mistral", "prompt").await.unwrap();
        assert_eq!(completion.provider, "gemini");
    }

    #[tokio::test]
    async fn test_no_available_provider() {
        let (gateway, mocks) = mock_gateway(vec![("anthropic", false), ("groq", false)]);
        let err = gateway.call_provider("", "prompt").await.unwrap_err();
        assert!(matches!(err, EstimateError::ProviderUnavailable(_)));
        assert!(!gateway.has_available());
        assert!(gateway.available_providers().is_empty());
        assert!(mocks.iter().all(|m| m.calls() == 0));
    }

    #[tokio::test]
    async fn test_transport_error_passes_through_unretried() {
        struct RejectingProvider(AtomicUsize);

        #[async_trait]
        impl LlmProvider for RejectingProvider {
            fn id(&self) -> &str {
                "openai"
            }

            fn name(&self) -> &str {
                "OpenAI"
            }

            fn model(&self) -> &str {
                "mock-model"
            }

            fn is_available(&self) -> bool {
                true
            }

            async fn call(&self, _prompt: &str) -> Result<Option<String>> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Err(TransportError::new("openai", "invalid api key")
                    .with_status(401)
                    .into())
            }
        }

        let provider = Arc::new(RejectingProvider(AtomicUsize::new(0)));
        let shared: SharedProvider = Arc::clone(&provider) as SharedProvider;
        let gateway = ProviderGateway::builder().add_shared(shared).build();

        let err = gateway.call_provider("openai", "prompt").await.unwrap_err();
        assert!(matches!(err, EstimateError::Transport(ref t) if t.is_auth()));
        assert_eq!(provider.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_available_providers_keep_priority_order() {
        let gateway = gateway(vec![
            ("anthropic", true),
            ("openai", false),
            ("groq", true),
            ("gemini", true),
        ]);
        let ids: Vec<String> = gateway
            .available_providers()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, ["anthropic", "groq", "gemini"]);
    }

    #[tokio::test]
    async fn test_call_is_bounded_by_timeout() {
        let gateway = ProviderGateway::builder()
            .add_provider(SlowProvider)
            .timeout(Duration::from_millis(20))
            .build();
        let err = gateway.call_provider("slow", "prompt").await.unwrap_err();
        assert!(matches!(err, EstimateError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_groq_only_credentials_serve_anthropic_request() {
        let config = Config::default();
        let credentials: SharedCredentials =
            Arc::new(StaticCredentials::new().with("GROQ_API_KEY", "gsk-test"));
        let gateway = ProviderGateway::from_config(&config, credentials).unwrap();

        let available: Vec<String> = gateway
            .available_providers()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(available, ["groq"]);
        assert_eq!(gateway.select("anthropic").map(|p| p.id()), Some("groq"));
    }
}
