//! Error type for the Qdrant adapter.

use thiserror::Error;

/// Failures inside the Qdrant-backed index collaborator.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Qdrant client errors (wrapped).
    #[error("qdrant error: {0}")]
    Qdrant(String),

    /// HTTP transport failure when calling the embeddings endpoint.
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Embeddings endpoint returned a non-success status.
    #[error("embeddings upstream error: {0}")]
    Upstream(String),

    /// Embeddings response could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Mismatch in embedding dimensionality.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },
}
