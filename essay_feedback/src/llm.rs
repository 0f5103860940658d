use async_trait::async_trait;
use log::debug;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{AcquireError, Semaphore};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: String) -> Self {
        ChatMessage {
            role: Role::User,
            content,
        }
    }
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("error while sending llm request: {0}")]
    Request(#[from] reqwest::Error),
    #[error("llm response did not contain choices[0].message.content")]
    MissingContent,
    #[error("llm request slots are closed: {0}")]
    Closed(#[from] AcquireError),
}

/// A chat-completion model.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError>;
}

/// Client for OpenAI compatible `/chat/completions` endpoints.
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    permits: Semaphore,
}

impl OpenAiClient {
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        temperature: f32,
        timeout: Duration,
        max_concurrent: usize,
    ) -> Result<Self, ProviderError> {
        Ok(OpenAiClient {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            temperature,
            permits: Semaphore::new(max_concurrent.max(1)),
        })
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        let _permit = self.permits.acquire().await?;
        debug!("Sending {} message(s) to {}", messages.len(), self.model);

        let body = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "messages": messages,
                "temperature": self.temperature,
            }))
            .send()
            .await?
            .error_for_status()?
            .json::<serde_json::Value>()
            .await?;

        body["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or(ProviderError::MissingContent)
    }
}
