//! Adapter configuration.

use crate::errors::IndexError;

/// Configuration for [`crate::QdrantIndex`].
#[derive(Clone, Debug)]
pub struct IndexConfig {
    /// Qdrant endpoint, e.g. `http://localhost:6334`.
    pub qdrant_url: String,
    /// Optional API key for Qdrant Cloud.
    pub qdrant_api_key: Option<String>,
    /// Target collection name.
    pub collection: String,
    /// Embedding dimensionality of the collection's vector space.
    pub embedding_dim: usize,
}

impl IndexConfig {
    /// Sane defaults for a given endpoint, collection, and dimensionality.
    pub fn new(
        url: impl Into<String>,
        collection: impl Into<String>,
        embedding_dim: usize,
    ) -> Self {
        Self {
            qdrant_url: url.into(),
            qdrant_api_key: None,
            collection: collection.into(),
            embedding_dim,
        }
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), IndexError> {
        if self.qdrant_url.trim().is_empty() {
            return Err(IndexError::Config("qdrant_url is empty".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(IndexError::Config("collection is empty".into()));
        }
        if self.embedding_dim == 0 {
            return Err(IndexError::Config("embedding_dim must be > 0".into()));
        }
        Ok(())
    }
}
