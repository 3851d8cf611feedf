#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod chunker;
pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use chunker::{chunk, Chunker};
pub use config::{Config, RetrievalSettings};
pub use error::{Error, ProviderError, Result};
pub use traits::{Embedder, Ranker};
pub use types::{Document, DocumentSummary, Query, QueryResult, SourceKind};
