use thiserror::Error;

/// Errors from the document store (corpus persistence).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("corpus i/o error: {0}")]
    Io(String),

    #[error("malformed corpus file: {0}")]
    Malformed(String),
}

/// Errors from an embedding provider.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding model unavailable: {0}")]
    Model(String),

    #[error("embedding failed: {0}")]
    Runtime(String),

    #[error("provider returned {actual} vectors for {expected} inputs")]
    BatchSize { expected: usize, actual: usize },
}

/// Errors from building, persisting, loading, or querying an index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("corpus is empty, nothing to index")]
    EmptyCorpus,

    #[error("embedding provider error: {0}")]
    EmbeddingProvider(String),

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("index artifact not found: {0}")]
    NotFound(String),

    #[error("corrupt index state: {0}")]
    CorruptState(String),

    #[error("failed to persist index: {0}")]
    Persistence(String),

    #[error("query text is empty")]
    InvalidQuery,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<EmbeddingError> for IndexError {
    fn from(err: EmbeddingError) -> Self {
        IndexError::EmbeddingProvider(err.to_string())
    }
}
