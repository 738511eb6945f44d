//! Anthropic Messages API Provider
//!
//! The one backend with its own calling convention: `x-api-key` auth, a
//! version header, and content returned as typed blocks.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{
    LlmProvider, ProviderConfig, SamplingParams, SharedCredentials, normalize_api_base,
    usable_text,
};
use crate::constants::provider::ANTHROPIC_VERSION;
use crate::types::{Result, TransportError};

pub struct AnthropicProvider {
    config: ProviderConfig,
    sampling: SamplingParams,
    credentials: SharedCredentials,
    client: reqwest::Client,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("api_base", &self.config.api_base)
            .field("model", &self.config.model)
            .field("credential_slot", &self.config.env_key)
            .finish()
    }
}

impl AnthropicProvider {
    pub fn new(
        mut config: ProviderConfig,
        sampling: SamplingParams,
        credentials: SharedCredentials,
        client: reqwest::Client,
    ) -> Result<Self> {
        config.api_base = normalize_api_base(&config.api_base)?;
        Ok(Self {
            config,
            sampling,
            credentials,
            client,
        })
    }

    fn build_request(&self, prompt: &str) -> MessagesRequest {
        MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: self.sampling.max_tokens,
            temperature: self.sampling.temperature,
            top_p: self.sampling.top_p,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        }
    }

    fn transport_error(&self, message: impl Into<String>) -> TransportError {
        TransportError::new(&self.config.id, message)
    }
}

/// Text of the first `text` block
fn first_text_block(body: &MessagesResponse) -> Option<String> {
    usable_text(
        body.content
            .iter()
            .find(|block| block.block_type == "text")
            .and_then(|block| block.text.as_deref()),
    )
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn id(&self) -> &str {
        &self.config.id
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn is_available(&self) -> bool {
        self.credentials.credential(&self.config.env_key).is_some()
    }

    async fn call(&self, prompt: &str) -> Result<Option<String>> {
        let api_key = self
            .credentials
            .credential(&self.config.env_key)
            .ok_or_else(|| {
                self.transport_error(format!("{} is not configured", self.config.env_key))
            })?;

        info!(
            provider = %self.config.id,
            model = %self.config.model,
            "Requesting message"
        );

        let url = format!("{}/v1/messages", self.config.api_base);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| self.transport_error(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(self
                .transport_error(format!("API error: {}", body))
                .with_status(status.as_u16())
                .into());
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| self.transport_error(format!("failed to parse response: {}", e)))?;

        let content = first_text_block(&body);
        debug!(provider = %self.config.id, empty = content.is_none(), "Message received");

        Ok(content)
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::StaticCredentials;
    use std::sync::Arc;

    fn provider() -> AnthropicProvider {
        let config = ProviderConfig::default_catalogue().remove(0);
        AnthropicProvider::new(
            config,
            SamplingParams::default(),
            Arc::new(StaticCredentials::new()),
            reqwest::Client::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_request_shape() {
        let request = serde_json::to_value(provider().build_request("tile a shower")).unwrap();
        assert_eq!(request["model"], "claude-sonnet-4-5-20250929");
        assert_eq!(request["max_tokens"], 4096);
        assert_eq!(request["messages"][0]["content"], "tile a shower");
    }

    #[test]
    fn test_first_text_block_skips_thinking() {
        let body: MessagesResponse = serde_json::from_str(
            r#"{"content":[{"type":"thinking","thinking":"hmm"},{"type":"text","text":" [] "}]}"#,
        )
        .unwrap();
        assert_eq!(first_text_block(&body).as_deref(), Some("[]"));
    }

    #[test]
    fn test_no_text_block_is_empty_not_error() {
        let body: MessagesResponse =
            serde_json::from_str(r#"{"content":[{"type":"tool_use","id":"x"}]}"#).unwrap();
        assert_eq!(first_text_block(&body), None);
    }

    #[test]
    fn test_unavailable_without_key() {
        assert!(!provider().is_available());
    }
}
