//! Client for OpenAI-compatible chat completions.
//!
//! The retrieval core never calls this itself; it is the adapter the
//! surrounding application uses to turn retrieved context into an answer.
//! It shares the provider endpoint and credential with the embedder.

use std::time::Duration;

use docrag_core::config::{CompletionSettings, EmbeddingSettings};
use docrag_core::error::{Error, ProviderError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http::ProviderClient;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Body of `POST {base_url}/chat/completions`.
#[derive(Debug, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl CompletionResponse {
    /// Content of the first choice.
    pub fn into_content(self) -> Result<String, ProviderError> {
        let got = self.choices.len();
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ProviderError::EmptyResponse { expected: 1, got })
    }
}

pub struct CompletionClient {
    http: ProviderClient,
    model: String,
    temperature: f32,
}

impl CompletionClient {
    pub fn new(provider: &EmbeddingSettings, completion: &CompletionSettings) -> Result<Self, Error> {
        if completion.model.trim().is_empty() {
            return Err(Error::Configuration("completion.model must not be empty".into()));
        }
        let http = ProviderClient::new(
            &provider.base_url,
            provider.api_key.clone(),
            Duration::from_secs(provider.timeout_secs),
        )?;
        Ok(Self {
            http,
            model: completion.model.clone(),
            temperature: completion.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        self.complete_with_temperature(messages, self.temperature).await
    }

    pub async fn complete_with_temperature(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, ProviderError> {
        debug!(model = %self.model, messages = messages.len(), "requesting completion");
        let request = CompletionRequest { model: &self.model, messages, temperature };
        let response: CompletionResponse = self.http.post_json("/chat/completions", &request).await?;
        response.into_content()
    }
}
