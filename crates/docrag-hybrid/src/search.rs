use docrag_core::config::RankingSettings;
use docrag_core::traits::Ranker;
use docrag_core::types::{Document, Query, QueryResult};
use docrag_text::LexicalRanker;
use docrag_vector::VectorRanker;
use tracing::debug;

/// Two-stage ranking: the vector ranker when a query vector is available,
/// the lexical ranker otherwise or when the vector ranker finds nothing.
pub struct SearchPipeline {
    primary: Box<dyn Ranker>,
    fallback: Box<dyn Ranker>,
}

impl SearchPipeline {
    pub fn new(primary: Box<dyn Ranker>, fallback: Box<dyn Ranker>) -> Self {
        Self { primary, fallback }
    }

    pub fn from_settings(settings: &RankingSettings) -> Self {
        Self::new(
            Box::new(VectorRanker::from_settings(settings)),
            Box::new(LexicalRanker::from_settings(settings)),
        )
    }

    /// Rank with the primary ranker; fall through to the fallback when it
    /// returns nothing (no query vector, or no stored vectors).
    pub fn rank(&self, documents: &[Document], query: &Query<'_>, top_k: usize) -> Vec<QueryResult> {
        if query.vector.is_some() {
            let hits = self.primary.rank(documents, query, top_k);
            if !hits.is_empty() {
                return hits;
            }
            debug!("primary ranker returned nothing; using lexical ranking");
        }
        self.fallback.rank(documents, query, top_k)
    }

    /// Lexical ranking only.
    pub fn rank_lexical(&self, documents: &[Document], text: &str, top_k: usize) -> Vec<QueryResult> {
        self.fallback.rank(documents, &Query::text(text), top_k)
    }
}
