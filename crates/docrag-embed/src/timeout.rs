use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use docrag_core::error::ProviderError;
use docrag_core::traits::Embedder;
use docrag_core::types::Vector;

/// Bounds every call of the wrapped embedder; expiry is reported as
/// `ProviderError::Unavailable`.
pub struct TimeoutEmbedder {
    inner: Arc<dyn Embedder>,
    timeout: Duration,
}

impl TimeoutEmbedder {
    pub fn new(inner: Arc<dyn Embedder>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Embedder for TimeoutEmbedder {
    fn embedder_id(&self) -> &str {
        self.inner.embedder_id()
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vector>, ProviderError> {
        tokio::time::timeout(self.timeout, self.inner.embed(texts))
            .await
            .map_err(|_| {
                ProviderError::Unavailable(format!(
                    "{}: no response within {:?}",
                    self.inner.embedder_id(),
                    self.timeout
                ))
            })?
    }
}
