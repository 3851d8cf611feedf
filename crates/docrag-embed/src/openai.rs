use std::time::Duration;

use async_trait::async_trait;
use docrag_core::config::EmbeddingSettings;
use docrag_core::error::{Error, ProviderError};
use docrag_core::traits::Embedder;
use docrag_core::types::Vector;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http::ProviderClient;

/// Body of `POST {base_url}/embeddings`.
#[derive(Debug, Serialize)]
pub struct EmbeddingRequest<'a> {
    pub input: &'a [String],
    pub model: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingResponse {
    #[serde(default)]
    pub data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingData {
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub index: Option<usize>,
}

impl EmbeddingResponse {
    /// Vectors in input order. Items are reordered by `index` when every item
    /// carries one; a count other than `expected` is an `EmptyResponse`.
    pub fn into_vectors(mut self, expected: usize) -> Result<Vec<Vector>, ProviderError> {
        if self.data.len() != expected {
            return Err(ProviderError::EmptyResponse { expected, got: self.data.len() });
        }
        if self.data.iter().all(|d| d.index.is_some()) {
            self.data.sort_by_key(|d| d.index);
        }
        Ok(self.data.into_iter().map(|d| d.embedding).collect())
    }
}

/// Embedder backed by an OpenAI-compatible `/embeddings` endpoint. One call
/// sends the whole batch.
pub struct OpenAiEmbedder {
    http: ProviderClient,
    model: String,
    id: String,
}

impl OpenAiEmbedder {
    pub fn new(settings: &EmbeddingSettings) -> Result<Self, Error> {
        if settings.model.trim().is_empty() {
            return Err(Error::Configuration("embedding.model must not be empty".into()));
        }
        let http = ProviderClient::new(
            &settings.base_url,
            settings.api_key.clone(),
            Duration::from_secs(settings.timeout_secs),
        )?;
        Ok(Self {
            http,
            model: settings.model.clone(),
            id: format!("openai:{}", settings.model),
        })
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn embedder_id(&self) -> &str {
        &self.id
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vector>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!(model = %self.model, inputs = texts.len(), "requesting embeddings");
        let request = EmbeddingRequest { input: texts, model: &self.model };
        let response: EmbeddingResponse = self.http.post_json("/embeddings", &request).await?;
        response.into_vectors(texts.len())
    }
}
