//! Retrieval facade: chunk, embed and store documents; answer queries with
//! vector ranking and a lexical fallback.
//!
//! ```no_run
//! # async fn demo() -> docrag_core::Result<()> {
//! use docrag_core::config::Config;
//! use docrag_hybrid::RetrievalEngine;
//!
//! let engine = RetrievalEngine::from_config(&Config::load()?)?;
//! engine.ingest("https://example.org/paris", "Paris", "Paris is the capital of France.").await?;
//! let hits = engine.query("capital of France", 5).await;
//! # let _ = hits;
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod search;

use std::sync::Arc;

use docrag_core::config::{Config, RetrievalSettings};
use docrag_core::error::{Error, Result};
use docrag_core::traits::Embedder;
use docrag_core::types::{content_hash, Document, DocumentSummary, Query, QueryResult};
use docrag_core::Chunker;
use docrag_embed::embedder_from_settings;
use docrag_vector::VectorIndex;
use tracing::{debug, info, warn};

pub use context::{answer_messages, format_context};
pub use search::SearchPipeline;

pub struct RetrievalEngine {
    embedder: Arc<dyn Embedder>,
    chunker: Chunker,
    pipeline: SearchPipeline,
    index: VectorIndex,
    default_top_k: usize,
}

impl RetrievalEngine {
    /// Engine with an empty index. Fails when `settings` do not validate.
    pub fn new(embedder: Arc<dyn Embedder>, settings: &RetrievalSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            embedder,
            chunker: Chunker::from_settings(&settings.chunking)?,
            pipeline: SearchPipeline::from_settings(&settings.ranking),
            index: VectorIndex::new(),
            default_top_k: settings.ranking.top_k,
        })
    }

    /// Engine using the embedder the configuration selects.
    pub fn from_config(config: &Config) -> Result<Self> {
        let settings = config.settings()?;
        let embedder = embedder_from_settings(&settings.embedding)?;
        Self::new(embedder, &settings)
    }

    pub fn embedder(&self) -> &dyn Embedder {
        self.embedder.as_ref()
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn default_top_k(&self) -> usize {
        self.default_top_k
    }

    /// Chunk, embed and store one document.
    ///
    /// Empty or whitespace-only text is rejected. Re-ingesting a URI replaces
    /// the stored document once the new embedding succeeds; unchanged title
    /// and text return the stored document without calling the provider.
    /// Any failure leaves the index as it was.
    pub async fn ingest(&self, source_uri: &str, title: &str, raw_text: &str) -> Result<Document> {
        if source_uri.trim().is_empty() {
            return Err(Error::ingestion("source URI is empty"));
        }
        if raw_text.trim().is_empty() {
            return Err(Error::ingestion(format!("{source_uri}: document has no text")));
        }

        if let Some(stored) = self.index.get(source_uri) {
            if stored.content_hash == content_hash(title, raw_text) {
                debug!(uri = %source_uri, "content unchanged; keeping stored document");
                return Ok(stored);
            }
        }

        let chunks = self.chunker.chunk(raw_text);
        let document = Document::new(source_uri, title, raw_text, chunks);
        match self.index.embed_and_add(self.embedder.as_ref(), document).await {
            Ok(document) => {
                info!(uri = %source_uri, chunks = document.chunks.len(), "ingested");
                Ok(document)
            }
            Err(e) => {
                warn!(uri = %source_uri, error = %e, retryable = e.is_retryable(), "ingestion failed");
                Err(Error::IngestionFailed {
                    reason: format!("{source_uri} was not stored"),
                    source: Some(Box::new(e)),
                })
            }
        }
    }

    /// Top `top_k` chunks for `text`, best first; `0` means the configured
    /// default.
    ///
    /// Never fails: an empty index yields an empty result, and a failed
    /// query embedding degrades to lexical ranking.
    pub async fn query(&self, text: &str, top_k: usize) -> Vec<QueryResult> {
        let top_k = if top_k == 0 { self.default_top_k } else { top_k };
        if self.index.is_empty() {
            return Vec::new();
        }

        let vector = match self.embedder.embed(&[text.to_string()]).await {
            Ok(mut vectors) if vectors.len() == 1 => vectors.pop(),
            Ok(vectors) => {
                warn!(got = vectors.len(), "query embedding returned no single vector; using lexical ranking");
                None
            }
            Err(e) => {
                warn!(error = %e, "query embedding failed; using lexical ranking");
                None
            }
        };
        let query = match &vector {
            Some(v) => Query::embedded(text, v),
            None => Query::text(text),
        };
        let hits = self.index.read(|docs| self.pipeline.rank(docs, &query, top_k));
        debug!(hits = hits.len(), top_k, "query ranked");
        hits
    }

    pub async fn query_default(&self, text: &str) -> Vec<QueryResult> {
        self.query(text, 0).await
    }

    /// Remove a document; absent URIs are a no-op.
    pub fn remove(&self, source_uri: &str) -> usize {
        self.index.remove(source_uri)
    }

    pub fn clear(&self) {
        self.index.clear();
    }

    pub fn list(&self) -> Vec<DocumentSummary> {
        self.index.summaries()
    }

    pub fn contains(&self, source_uri: &str) -> bool {
        self.index.contains(source_uri)
    }

    pub fn document(&self, source_uri: &str) -> Option<Document> {
        self.index.get(source_uri)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
