use docrag_core::config::RankingSettings;
use docrag_core::traits::{sort_and_truncate, Ranker};
use docrag_core::types::{Document, Query, QueryResult, SourceKind};
use tracing::debug;

/// Scores each chunk by the share of distinct query terms it contains as
/// case-insensitive substrings. Chunks matching nothing still get `floor`,
/// so a non-empty index never yields an empty result. The floor is capped at
/// half the smallest match score so any match outranks every non-match.
#[derive(Debug, Clone, Copy)]
pub struct LexicalRanker {
    floor: f32,
}

impl Default for LexicalRanker {
    fn default() -> Self {
        Self::from_settings(&RankingSettings::default())
    }
}

impl LexicalRanker {
    pub fn new(floor: f32) -> Self {
        Self { floor }
    }

    pub fn from_settings(settings: &RankingSettings) -> Self {
        Self::new(settings.lexical_floor)
    }

    pub fn floor(&self) -> f32 {
        self.floor
    }

    #[allow(clippy::cast_precision_loss)]
    fn floor_for(&self, term_count: usize) -> f32 {
        if term_count == 0 {
            self.floor
        } else {
            self.floor.min(0.5 / term_count as f32)
        }
    }
}

impl Ranker for LexicalRanker {
    fn rank(&self, documents: &[Document], query: &Query<'_>, top_k: usize) -> Vec<QueryResult> {
        if top_k == 0 {
            return Vec::new();
        }
        let terms = query_terms(query.text);
        let floor = self.floor_for(terms.len());
        let mut hits = Vec::new();
        for doc in documents {
            for chunk in &doc.chunks {
                let matched = matched_terms(&terms, chunk);
                #[allow(clippy::cast_precision_loss)]
                let coverage = if terms.is_empty() { 0.0 } else { matched as f32 / terms.len() as f32 };
                hits.push(QueryResult {
                    content: chunk.clone(),
                    source_uri: doc.source_uri.clone(),
                    title: doc.title.clone(),
                    score: if matched == 0 { floor } else { coverage },
                    source: SourceKind::Text,
                    confident: matched > 0,
                });
            }
        }
        debug!(terms = terms.len(), candidates = hits.len(), "lexical ranking");
        sort_and_truncate(&mut hits, top_k);
        hits
    }
}

/// Lowercased, de-duplicated whitespace tokens with surrounding punctuation
/// removed, in first-seen order.
pub fn query_terms(text: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for raw in text.split_whitespace() {
        let term = raw.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
        if !term.is_empty() && !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}

fn matched_terms(terms: &[String], chunk: &str) -> usize {
    if terms.is_empty() {
        return 0;
    }
    let haystack = chunk.to_lowercase();
    terms.iter().filter(|t| haystack.contains(t.as_str())).count()
}
