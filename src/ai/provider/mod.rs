//! LLM Provider Abstraction
//!
//! Defines the `LlmProvider` capability every backend implements and the
//! static catalogue of backends the gateway is built from.
//!
//! ## Modules
//!
//! - `gateway`: Ordered provider set with availability-based fallback
//! - `openai`: Shared adapter for OpenAI-compatible chat completion APIs
//! - `anthropic`: Native Messages API adapter
//! - `credentials`: Per-request credential lookup

mod anthropic;
mod credentials;
mod gateway;
mod openai;

pub use anthropic::AnthropicProvider;
pub use credentials::{
    CredentialSource, EnvCredentials, LayeredCredentials, SharedCredentials, StaticCredentials,
};
pub use gateway::{ProviderCompletion, ProviderGateway, ProviderGatewayBuilder};
pub use openai::OpenAiCompatibleProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::constants::{provider as defaults, sampling};
use crate::types::{EstimateError, Result};

/// Public description of a configured provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Stable short key used in requests
    pub id: String,
    /// Display name
    pub name: String,
    /// Backend model identifier
    pub model: String,
}

/// Shared provider type for concurrent access across requests.
pub type SharedProvider = Arc<dyn LlmProvider>;

// =============================================================================
// LLM Provider Trait
// =============================================================================

/// One AI backend capable of answering a text prompt
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Stable short key (e.g. "groq")
    fn id(&self) -> &str;

    /// Display name
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;

    /// Whether a credential is configured right now
    fn is_available(&self) -> bool;

    /// Send `prompt` and return the trimmed text answer.
    ///
    /// `Ok(None)` means the backend answered but produced no usable text.
    /// Transport, HTTP status, and auth failures are errors.
    async fn call(&self, prompt: &str) -> Result<Option<String>>;

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            id: self.id().to_string(),
            name: self.name().to_string(),
            model: self.model().to_string(),
        }
    }
}

// =============================================================================
// Provider Configuration
// =============================================================================

/// Wire convention a backend speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    /// Anthropic Messages API
    Anthropic,
    /// `POST {base}/chat/completions` with bearer auth
    OpenAiCompatible,
}

/// Static description of one backend
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub id: String,
    pub name: String,
    pub model: String,
    /// Credential slot that supplies the API key
    pub env_key: String,
    pub api_base: String,
    pub kind: ProviderKind,
}

impl ProviderConfig {
    fn new(
        id: &str,
        name: &str,
        model: &str,
        env_key: &str,
        api_base: &str,
        kind: ProviderKind,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            model: model.to_string(),
            env_key: env_key.to_string(),
            api_base: api_base.to_string(),
            kind,
        }
    }

    /// Built-in backends in default priority order
    pub fn default_catalogue() -> Vec<ProviderConfig> {
        vec![
            Self::new(
                "anthropic",
                "Claude Sonnet 4.5 (Anthropic)",
                "claude-sonnet-4-5-20250929",
                "ANTHROPIC_API_KEY",
                defaults::ANTHROPIC_API_BASE,
                ProviderKind::Anthropic,
            ),
            Self::new(
                "openai",
                "GPT-4o Mini (OpenAI)",
                "gpt-4o-mini",
                "OPENAI_API_KEY",
                defaults::OPENAI_API_BASE,
                ProviderKind::OpenAiCompatible,
            ),
            Self::new(
                "groq",
                "Llama 3.3 70B (Groq)",
                "llama-3.3-70b-versatile",
                "GROQ_API_KEY",
                defaults::GROQ_API_BASE,
                ProviderKind::OpenAiCompatible,
            ),
            Self::new(
                "gemini",
                "Gemini 2.5 Flash (Google)",
                "gemini-2.5-flash",
                "GEMINI_API_KEY",
                defaults::GEMINI_API_BASE,
                ProviderKind::OpenAiCompatible,
            ),
        ]
    }
}

/// Fixed sampling parameters sent with every call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: sampling::TEMPERATURE,
            top_p: sampling::TOP_P,
            max_tokens: sampling::MAX_TOKENS,
        }
    }
}

/// Validate and normalize a base URL (http/https only, no trailing slash)
pub(crate) fn normalize_api_base(api_base: &str) -> Result<String> {
    let url = url::Url::parse(api_base).map_err(|e| {
        EstimateError::Config(format!("Invalid provider base URL '{}': {}", api_base, e))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(EstimateError::Config(format!(
            "Provider base URL must use http or https scheme, got: {}",
            url.scheme()
        )));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| EstimateError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Trim and drop empty answers
pub(crate) fn usable_text(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Create a shared provider from configuration
pub fn create_provider(
    config: &ProviderConfig,
    sampling: SamplingParams,
    credentials: SharedCredentials,
    timeout: Duration,
) -> Result<SharedProvider> {
    let client = build_http_client(timeout)?;
    match config.kind {
        ProviderKind::Anthropic => Ok(Arc::new(AnthropicProvider::new(
            config.clone(),
            sampling,
            credentials,
            client,
        )?)),
        ProviderKind::OpenAiCompatible => Ok(Arc::new(OpenAiCompatibleProvider::new(
            config.clone(),
            sampling,
            credentials,
            client,
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalogue_order() {
        let ids: Vec<String> = ProviderConfig::default_catalogue()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, ["anthropic", "openai", "groq", "gemini"]);
    }

    #[test]
    fn test_only_anthropic_is_native() {
        for config in ProviderConfig::default_catalogue() {
            let native = config.kind == ProviderKind::Anthropic;
            assert_eq!(native, config.id == "anthropic");
        }
    }

    #[test]
    fn test_normalize_api_base() {
        assert_eq!(
            normalize_api_base("https://api.groq.com/openai/v1/").unwrap(),
            "https://api.groq.com/openai/v1"
        );
        assert!(normalize_api_base("ftp://example.com").is_err());
        assert!(normalize_api_base("not a url").is_err());
    }

    #[test]
    fn test_usable_text() {
        assert_eq!(usable_text(Some("  [1]  ")), Some("[1]".to_string()));
        assert_eq!(usable_text(Some(" \n ")), None);
        assert_eq!(usable_text(None), None);
    }

    #[test]
    fn test_sampling_defaults() {
        let params = SamplingParams::default();
        assert_eq!(params.temperature, 0.2);
        assert_eq!(params.top_p, 0.9);
        assert_eq!(params.max_tokens, 4096);
    }
}
