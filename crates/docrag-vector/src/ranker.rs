use docrag_core::config::RankingSettings;
use docrag_core::traits::{sort_and_truncate, Ranker};
use docrag_core::types::{Document, Query, QueryResult, SourceKind};
use tracing::debug;

use crate::similarity::cosine_similarity;

/// Ranks chunks by cosine similarity to the query vector.
///
/// Chunks scoring strictly above `threshold` are returned as confident
/// matches. When none clear it, every scored chunk is returned instead,
/// marked not confident, so a populated index never yields an empty
/// answer. Without a query vector or any stored vectors the result is
/// empty and the caller should fall back.
#[derive(Debug, Clone, Copy)]
pub struct VectorRanker {
    threshold: f32,
}

impl Default for VectorRanker {
    fn default() -> Self {
        Self::from_settings(&RankingSettings::default())
    }
}

impl VectorRanker {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn from_settings(settings: &RankingSettings) -> Self {
        Self::new(settings.threshold)
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

impl Ranker for VectorRanker {
    fn rank(&self, documents: &[Document], query: &Query<'_>, top_k: usize) -> Vec<QueryResult> {
        let Some(q) = query.vector else {
            return Vec::new();
        };

        let mut scored = Vec::new();
        for doc in documents {
            let Some(vectors) = &doc.vectors else { continue };
            for (chunk, v) in doc.chunks.iter().zip(vectors) {
                scored.push(QueryResult {
                    content: chunk.clone(),
                    source_uri: doc.source_uri.clone(),
                    title: doc.title.clone(),
                    score: cosine_similarity(q, v),
                    source: SourceKind::Vector,
                    confident: false,
                });
            }
        }

        let total = scored.len();
        let mut hits: Vec<QueryResult> = scored
            .iter()
            .filter(|h| h.score > self.threshold)
            .cloned()
            .map(|mut h| {
                h.confident = true;
                h
            })
            .collect();
        if hits.is_empty() {
            debug!(candidates = total, threshold = self.threshold, "no chunk above threshold; widening");
            hits = scored;
        }
        sort_and_truncate(&mut hits, top_k);
        hits
    }
}
