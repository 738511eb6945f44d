//! OpenAI-Compatible Provider
//!
//! One adapter for every backend that speaks the Chat Completions
//! convention (OpenAI, Groq, Gemini's compatibility endpoint). Backends differ
//! only by base endpoint, model id, and credential slot.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{
    LlmProvider, ProviderConfig, SamplingParams, SharedCredentials, normalize_api_base,
    usable_text,
};
use crate::types::{Result, TransportError};

/// Chat Completions provider with per-request credential lookup
pub struct OpenAiCompatibleProvider {
    config: ProviderConfig,
    sampling: SamplingParams,
    credentials: SharedCredentials,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiCompatibleProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleProvider")
            .field("id", &self.config.id)
            .field("api_base", &self.config.api_base)
            .field("model", &self.config.model)
            .field("credential_slot", &self.config.env_key)
            .finish()
    }
}

impl OpenAiCompatibleProvider {
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

    fn build_request(&self, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.sampling.temperature,
            top_p: self.sampling.top_p,
            max_tokens: self.sampling.max_tokens,
        }
    }

    fn transport_error(&self, message: impl Into<String>) -> TransportError {
        TransportError::new(&self.config.id, message)
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
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
            "Requesting chat completion"
        );

        let url = format!("{}/chat/completions", self.config.api_base);
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key.expose_secret())
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

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| self.transport_error(format!("failed to parse response: {}", e)))?;

        let content = usable_text(
            body.choices
                .first()
                .and_then(|c| c.message.content.as_deref()),
        );
        debug!(
            provider = %self.config.id,
            empty = content.is_none(),
            "Chat completion received"
        );

        Ok(content)
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::StaticCredentials;
    use std::sync::Arc;

    fn groq(credentials: StaticCredentials) -> OpenAiCompatibleProvider {
        let config = ProviderConfig::default_catalogue()
            .into_iter()
            .find(|p| p.id == "groq")
            .unwrap();
        OpenAiCompatibleProvider::new(
            config,
            SamplingParams::default(),
            Arc::new(credentials),
            reqwest::Client::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_request_shape() {
        let provider = groq(StaticCredentials::new());
        let request = serde_json::to_value(provider.build_request("price a deck")).unwrap();

        assert_eq!(request["model"], "llama-3.3-70b-versatile");
        assert_eq!(request["messages"][0]["role"], "user");
        assert_eq!(request["messages"][0]["content"], "price a deck");
        assert_eq!(request["max_tokens"], 4096);
        assert!((request["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
        assert!((request["top_p"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_availability_follows_credentials() {
        assert!(!groq(StaticCredentials::new()).is_available());
        assert!(groq(StaticCredentials::new().with("GROQ_API_KEY", "gsk")).is_available());
    }

    #[test]
    fn test_response_content_extraction() {
        let body: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"  [1,2]\n"}}]}"#,
        )
        .unwrap();
        let content = usable_text(body.choices.first().and_then(|c| c.message.content.as_deref()));
        assert_eq!(content.as_deref(), Some("[1,2]"));

        let empty: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(empty.choices.is_empty());
    }

    #[tokio::test]
    async fn test_call_without_credential_is_transport_error() {
        let provider = groq(StaticCredentials::new());
        let err = provider.call("hello").await.unwrap_err();
        assert!(err.to_string().contains("GROQ_API_KEY is not configured"));
    }

    #[test]
    fn test_debug_has_no_secret() {
        let provider = groq(StaticCredentials::new().with("GROQ_API_KEY", "gsk-secret"));
        assert!(!format!("{:?}", provider).contains("gsk-secret"));
    }
}
