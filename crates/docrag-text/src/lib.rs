//! docrag-text
//!
//! Keyword scoring used when no query embedding is available. See `lexical`.

pub mod lexical;

pub use lexical::{query_terms, LexicalRanker};
