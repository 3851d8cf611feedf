//! In-memory document index and the cosine-similarity ranker.
//!
//! - `index`: the process-local document store, safe to share across tasks
//! - `similarity`: cosine similarity over dense vectors
//! - `ranker`: threshold-filtered vector ranking with a widening step

pub mod index;
pub mod ranker;
pub mod similarity;

pub use index::VectorIndex;
pub use ranker::VectorRanker;
pub use similarity::cosine_similarity;
