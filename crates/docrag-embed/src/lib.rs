//! Embedding client adapters.
//!
//! - `openai`: OpenAI-compatible HTTP embedder (one batched request per call)
//! - `deterministic`: hashed bag-of-words vectors for tests and offline runs
//! - `timeout`: bounds any embedder's call time
//! - `completion`: chat-completion client for answer generation
//!
//! Set `APP_EMBEDDING__PROVIDER=deterministic` to avoid the network entirely.

mod http;

pub mod completion;
pub mod deterministic;
pub mod openai;
pub mod timeout;

use std::sync::Arc;
use std::time::Duration;

use docrag_core::config::{Config, EmbeddingBackend, EmbeddingSettings};
use docrag_core::error::Result;
use docrag_core::traits::Embedder;
use tracing::info;

pub use completion::{ChatMessage, CompletionClient, Role};
pub use deterministic::DeterministicEmbedder;
pub use openai::OpenAiEmbedder;
pub use timeout::TimeoutEmbedder;

/// Build the configured embedder, wrapped in a [`TimeoutEmbedder`].
pub fn embedder_from_settings(settings: &EmbeddingSettings) -> Result<Arc<dyn Embedder>> {
    let inner: Arc<dyn Embedder> = match settings.provider {
        EmbeddingBackend::OpenAi => Arc::new(OpenAiEmbedder::new(settings)?),
        EmbeddingBackend::Deterministic => Arc::new(DeterministicEmbedder::new(settings.dimension)),
    };
    info!(embedder = inner.embedder_id(), timeout_secs = settings.timeout_secs, "embedder ready");
    Ok(Arc::new(TimeoutEmbedder::new(inner, Duration::from_secs(settings.timeout_secs))))
}

pub fn embedder_from_config(config: &Config) -> Result<Arc<dyn Embedder>> {
    embedder_from_settings(&config.settings()?.embedding)
}

/// Embedder described by `config.toml` in the working directory and the
/// environment.
pub fn get_default_embedder() -> Result<Arc<dyn Embedder>> {
    embedder_from_config(&Config::load()?)
}
