//! Configuration Types
//!
//! All configuration structures with defaults that reproduce the built-in
//! behavior when no file or environment override is present.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::ai::provider::{ProviderConfig, SamplingParams, StaticCredentials};
use crate::constants::{network, rate_limit, sampling};
use crate::types::{EstimateError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Provider call settings
    pub llm: LlmConfig,

    /// Per-provider overrides keyed by provider id
    pub providers: BTreeMap<String, ProviderOverride>,

    /// Per-user request limits
    pub rate_limit: RateLimitConfig,
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `EstimateError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if self.llm.timeout_secs == 0 {
            return Err(EstimateError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(EstimateError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if !(self.llm.top_p > 0.0 && self.llm.top_p <= 1.0) {
            return Err(EstimateError::Config(format!(
                "LLM top_p must be in (0.0, 1.0], got {}",
                self.llm.top_p
            )));
        }

        if self.llm.max_tokens == 0 {
            return Err(EstimateError::Config(
                "LLM max_tokens must be greater than 0".to_string(),
            ));
        }

        let limits = &self.rate_limit;
        if limits.suggest_max_requests == 0 || limits.score_max_requests == 0 {
            return Err(EstimateError::Config(
                "Rate limit max_requests must be greater than 0".to_string(),
            ));
        }
        if limits.suggest_window_secs == 0 || limits.score_window_secs == 0 {
            return Err(EstimateError::Config(
                "Rate limit window_secs must be greater than 0".to_string(),
            ));
        }

        self.provider_configs().map(|_| ())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.llm.timeout_secs)
    }

    pub fn sampling(&self) -> SamplingParams {
        SamplingParams {
            temperature: self.llm.temperature,
            top_p: self.llm.top_p,
            max_tokens: self.llm.max_tokens,
        }
    }

    /// Built-in catalogue in configured priority order with overrides applied
    pub fn provider_configs(&self) -> Result<Vec<ProviderConfig>> {
        let catalogue = ProviderConfig::default_catalogue();

        for id in self.providers.keys() {
            if !catalogue.iter().any(|p| &p.id == id) {
                return Err(EstimateError::Config(format!(
                    "Unknown provider '{}' in [providers]",
                    id
                )));
            }
        }

        let mut resolved = Vec::with_capacity(self.llm.priority.len());
        for id in &self.llm.priority {
            let mut config = catalogue
                .iter()
                .find(|p| &p.id == id)
                .cloned()
                .ok_or_else(|| {
                    EstimateError::Config(format!("Unknown provider '{}' in llm.priority", id))
                })?;

            if resolved.iter().any(|p: &ProviderConfig| &p.id == id) {
                return Err(EstimateError::Config(format!(
                    "Provider '{}' listed twice in llm.priority",
                    id
                )));
            }

            if let Some(overrides) = self.providers.get(id) {
                if let Some(model) = &overrides.model {
                    config.model = model.clone();
                }
                if let Some(api_base) = &overrides.api_base {
                    config.api_base = api_base.clone();
                }
            }
            resolved.push(config);
        }

        Ok(resolved)
    }

    /// API keys set in config files, keyed by credential slot
    pub fn file_credentials(&self) -> Result<StaticCredentials> {
        let catalogue = ProviderConfig::default_catalogue();
        let mut credentials = StaticCredentials::new();

        for (id, overrides) in &self.providers {
            let Some(key) = &overrides.api_key else {
                continue;
            };
            let slot = catalogue
                .iter()
                .find(|p| &p.id == id)
                .map(|p| p.env_key.clone())
                .ok_or_else(|| {
                    EstimateError::Config(format!("Unknown provider '{}' in [providers]", id))
                })?;
            credentials = credentials.with(slot, key.clone());
        }

        Ok(credentials)
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the HTTP API listens on
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: network::DEFAULT_BIND.to_string(),
        }
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,

    pub temperature: f32,

    pub top_p: f32,

    pub max_tokens: u32,

    /// Provider ids in fallback order
    pub priority: Vec<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            temperature: sampling::TEMPERATURE,
            top_p: sampling::TOP_P,
            max_tokens: sampling::MAX_TOKENS,
            priority: ProviderConfig::default_catalogue()
                .into_iter()
                .map(|p| p.id)
                .collect(),
        }
    }
}

// =============================================================================
// Provider Overrides
// =============================================================================

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderOverride {
    /// API key; takes precedence over the provider's environment variable
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

impl std::fmt::Debug for ProviderOverride {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderOverride")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .finish()
    }
}

// =============================================================================
// Rate Limit Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Suggestion calls allowed per fixed window
    pub suggest_max_requests: usize,
    pub suggest_window_secs: u64,

    /// Scoring calls allowed per sliding window
    pub score_max_requests: usize,
    pub score_window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            suggest_max_requests: rate_limit::SUGGEST_MAX_REQUESTS,
            suggest_window_secs: rate_limit::SUGGEST_WINDOW_SECS,
            score_max_requests: rate_limit::SCORE_MAX_REQUESTS,
            score_window_secs: rate_limit::SCORE_WINDOW_SECS,
        }
    }
}

impl RateLimitConfig {
    pub fn suggest_window(&self) -> Duration {
        Duration::from_secs(self.suggest_window_secs)
    }

    pub fn score_window(&self) -> Duration {
        Duration::from_secs(self.score_window_secs)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::CredentialSource;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:3000");
        assert_eq!(config.llm.priority, ["anthropic", "openai", "groq", "gemini"]);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.llm.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.llm.top_p = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.rate_limit.score_max_requests = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.llm.priority.push("mistral".to_string());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.llm.priority.push("groq".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_priority_reorders_and_filters() {
        let mut config = Config::default();
        config.llm.priority = vec!["groq".to_string(), "openai".to_string()];
        let ids: Vec<String> = config
            .provider_configs()
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, ["groq", "openai"]);
    }

    #[test]
    fn test_overrides_apply() {
        let mut config = Config::default();
        config.providers.insert(
            "openai".to_string(),
            ProviderOverride {
                api_key: Some("sk-file".to_string()),
                model: Some("gpt-4o".to_string()),
                api_base: Some("http://localhost:8080/v1".to_string()),
            },
        );

        let openai = config
            .provider_configs()
            .unwrap()
            .into_iter()
            .find(|p| p.id == "openai")
            .unwrap();
        assert_eq!(openai.model, "gpt-4o");
        assert_eq!(openai.api_base, "http://localhost:8080/v1");

        let creds = config.file_credentials().unwrap();
        assert!(creds.credential("OPENAI_API_KEY").is_some());
    }

    #[test]
    fn test_api_key_never_serialized() {
        let mut config = Config::default();
        config.providers.insert(
            "groq".to_string(),
            ProviderOverride {
                api_key: Some("gsk-secret".to_string()),
                ..Default::default()
            },
        );

        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(!toml.contains("gsk-secret"));
        assert!(!format!("{:?}", config).contains("gsk-secret"));
    }
}
