//! Domain types shared by the index, the rankers and the facade.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

pub type DocumentId = Uuid;
pub type Vector = Vec<f32>;

/// An ingested source and everything derived from it.
///
/// - `id`: assigned at ingestion, opaque
/// - `source_uri`: origin locator; unique within an index
/// - `raw_text`: full extracted plain text
/// - `chunks`: ordered segments of `raw_text`, never empty once stored
/// - `vectors`: one embedding per chunk, absent until embedding succeeds
/// - `content_hash`: blake3 hex digest of `title` and `raw_text`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub source_uri: String,
    pub title: String,
    pub raw_text: String,
    pub chunks: Vec<String>,
    pub vectors: Option<Vec<Vector>>,
    pub content_hash: String,
    pub ingested_at: DateTime<Utc>,
}

impl Document {
    /// A fresh, not yet embedded document.
    pub fn new(
        source_uri: impl Into<String>,
        title: impl Into<String>,
        raw_text: impl Into<String>,
        chunks: Vec<String>,
    ) -> Self {
        let title = title.into();
        let raw_text = raw_text.into();
        Self {
            id: Uuid::new_v4(),
            source_uri: source_uri.into(),
            content_hash: content_hash(&title, &raw_text),
            title,
            raw_text,
            chunks,
            vectors: None,
            ingested_at: Utc::now(),
        }
    }

    pub fn is_embedded(&self) -> bool {
        self.vectors.is_some()
    }

    /// Attach embeddings, enforcing the one-vector-per-chunk invariant.
    pub fn with_vectors(mut self, vectors: Vec<Vector>) -> Result<Self> {
        if vectors.len() != self.chunks.len() {
            return Err(Error::InvalidDocument(format!(
                "{}: {} vector(s) for {} chunk(s)",
                self.source_uri,
                vectors.len(),
                self.chunks.len()
            )));
        }
        self.vectors = Some(vectors);
        Ok(self)
    }

    /// Check the invariants a stored document must hold.
    pub fn validate(&self) -> Result<()> {
        if self.chunks.is_empty() {
            return Err(Error::InvalidDocument(format!("{}: no chunks", self.source_uri)));
        }
        match &self.vectors {
            Some(v) if v.len() == self.chunks.len() => Ok(()),
            Some(v) => Err(Error::InvalidDocument(format!(
                "{}: {} vector(s) for {} chunk(s)",
                self.source_uri,
                v.len(),
                self.chunks.len()
            ))),
            None => Err(Error::InvalidDocument(format!(
                "{}: vectors must be populated before storage",
                self.source_uri
            ))),
        }
    }

    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id,
            source_uri: self.source_uri.clone(),
            title: self.title.clone(),
            chunk_count: self.chunks.len(),
            embedded: self.is_embedded(),
            ingested_at: self.ingested_at,
        }
    }
}

/// Metadata-only view of a stored document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub source_uri: String,
    pub title: String,
    pub chunk_count: usize,
    pub embedded: bool,
    pub ingested_at: DateTime<Utc>,
}

/// Indicates which ranker produced a result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SourceKind {
    Vector,
    Text,
}

/// One ranked chunk. Higher `score` is always better.
///
/// `confident` is false when the score did not clear the relevance
/// threshold and the chunk was returned only to avoid an empty answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryResult {
    pub content: String,
    pub source_uri: String,
    pub title: String,
    pub score: f32,
    pub source: SourceKind,
    pub confident: bool,
}

/// Input to a [`crate::traits::Ranker`].
#[derive(Debug, Clone, Copy)]
pub struct Query<'a> {
    pub text: &'a str,
    pub vector: Option<&'a [f32]>,
}

impl<'a> Query<'a> {
    pub fn text(text: &'a str) -> Self {
        Self { text, vector: None }
    }

    pub fn embedded(text: &'a str, vector: &'a [f32]) -> Self {
        Self { text, vector: Some(vector) }
    }
}

pub fn content_hash(title: &str, raw_text: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(title.as_bytes());
    hasher.update(&[0]);
    hasher.update(raw_text.as_bytes());
    hasher.finalize().to_hex().to_string()
}
