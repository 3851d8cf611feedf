use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::{Document, Query, QueryResult, Vector};

/// Turns texts into vectors. Implementations must return exactly one vector
/// per input, in input order, and must not retry on their own.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Stable identifier for the provider/model (e.g. `openai:text-embedding-3-small`).
    fn embedder_id(&self) -> &str;
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vector>, ProviderError>;
}

/// Orders chunks of the given documents by relevance to a query.
pub trait Ranker: Send + Sync {
    fn rank(&self, documents: &[Document], query: &Query<'_>, top_k: usize) -> Vec<QueryResult>;
}

/// Sort descending by score and keep the first `top_k`.
///
/// The sort is stable, so equal scores keep insertion order
/// (document order, then chunk order).
pub fn sort_and_truncate(hits: &mut Vec<QueryResult>, top_k: usize) {
    hits.sort_by(|a, b| b.score.total_cmp(&a.score));
    hits.truncate(top_k);
}
