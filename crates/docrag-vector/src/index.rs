//! Process-local document store.
//!
//! One `parking_lot::RwLock` guards the collection: mutations (`add`,
//! `remove`, `clear`) take the write lock, searches and listings take the
//! read lock. Provider calls never happen while the lock is held.

use docrag_core::error::{Error, Result};
use docrag_core::traits::Embedder;
use docrag_core::types::{Document, DocumentSummary};
use parking_lot::RwLock;
use tracing::{debug, info};

#[derive(Default)]
pub struct VectorIndex {
    docs: RwLock<Vec<Document>>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an embedded document.
    ///
    /// `document.vectors` must be populated and aligned with its chunks.
    /// A stored document with the same `source_uri` is replaced in place,
    /// keeping its position in insertion order, and returned.
    pub fn add(&self, document: Document) -> Result<Option<Document>> {
        document.validate()?;
        let uri = document.source_uri.clone();
        let chunks = document.chunks.len();

        let mut docs = self.docs.write();
        let replaced = match docs.iter().position(|d| d.source_uri == uri) {
            Some(pos) => Some(std::mem::replace(&mut docs[pos], document)),
            None => {
                docs.push(document);
                None
            }
        };
        let total = docs.len();
        drop(docs);

        info!(uri = %uri, chunks, replaced = replaced.is_some(), documents = total, "document stored");
        Ok(replaced)
    }

    /// Embed every chunk of `document` in one batch, then store it.
    ///
    /// A provider failure surfaces as `Error::EmbeddingFailed` and leaves
    /// the index untouched.
    pub async fn embed_and_add(&self, embedder: &dyn Embedder, document: Document) -> Result<Document> {
        debug!(uri = %document.source_uri, chunks = document.chunks.len(), embedder = embedder.embedder_id(), "embedding document");
        let vectors = embedder
            .embed(&document.chunks)
            .await
            .map_err(Error::EmbeddingFailed)?;
        let document = document.with_vectors(vectors)?;
        self.add(document.clone())?;
        Ok(document)
    }

    /// Delete every document with `source_uri`; returns how many were removed.
    pub fn remove(&self, source_uri: &str) -> usize {
        let mut docs = self.docs.write();
        let before = docs.len();
        docs.retain(|d| d.source_uri != source_uri);
        let removed = before - docs.len();
        drop(docs);
        if removed > 0 {
            info!(uri = %source_uri, removed, "document removed");
        }
        removed
    }

    pub fn clear(&self) {
        let mut docs = self.docs.write();
        let removed = docs.len();
        docs.clear();
        drop(docs);
        info!(removed, "index cleared");
    }

    /// All documents, insertion order.
    pub fn list(&self) -> Vec<Document> {
        self.docs.read().clone()
    }

    pub fn summaries(&self) -> Vec<DocumentSummary> {
        self.docs.read().iter().map(Document::summary).collect()
    }

    pub fn contains(&self, source_uri: &str) -> bool {
        self.docs.read().iter().any(|d| d.source_uri == source_uri)
    }

    pub fn get(&self, source_uri: &str) -> Option<Document> {
        self.docs.read().iter().find(|d| d.source_uri == source_uri).cloned()
    }

    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    pub fn chunk_count(&self) -> usize {
        self.docs.read().iter().map(|d| d.chunks.len()).sum()
    }

    /// Run `f` over the documents under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&[Document]) -> R) -> R {
        f(&self.docs.read())
    }
}
