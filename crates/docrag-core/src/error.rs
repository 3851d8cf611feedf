use thiserror::Error;

/// Failures reported by an external embedding or completion provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// Network or transport fault, including an expired timeout.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// Non-2xx response; `body` carries the provider's error payload.
    #[error("provider rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// The response did not carry one item per input.
    #[error("provider returned {got} item(s) for {expected} input(s)")]
    EmptyResponse { expected: usize, got: usize },
}

impl ProviderError {
    /// Whether repeating the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Unavailable(_) => true,
            Self::Rejected { status, .. } => *status == 429 || *status >= 500,
            Self::EmptyResponse { .. } => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Embedding failed: {0}")]
    EmbeddingFailed(#[source] ProviderError),

    #[error("Ingestion failed: {reason}")]
    IngestionFailed {
        reason: String,
        #[source]
        source: Option<Box<Error>>,
    },
}

impl Error {
    pub fn ingestion(reason: impl Into<String>) -> Self {
        Self::IngestionFailed { reason: reason.into(), source: None }
    }

    /// Configuration and document errors are fatal; provider faults defer to
    /// [`ProviderError::is_retryable`].
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Configuration(_) | Self::InvalidDocument(_) => false,
            Self::EmbeddingFailed(e) => e.is_retryable(),
            Self::IngestionFailed { source, .. } => {
                source.as_deref().is_some_and(Error::is_retryable)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
