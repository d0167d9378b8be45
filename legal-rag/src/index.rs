//! Vector-index collaborator interface.
//!
//! The backing store (embedding model, ANN engine, persistence) is an
//! external service from this crate's point of view. Implement this trait
//! to plug in a concrete backend; construct it once at process start and
//! inject it into [`crate::RagChain`].

use async_trait::async_trait;
use legal_corpus::ChunkRecord;

use crate::errors::RagError;
use crate::types::SearchHit;

/// Opaque vector-index collaborator: chunk upsert plus semantic search.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Inserts or replaces the given chunks in the index.
    ///
    /// # Errors
    /// Returns [`RagError::Index`] on backend failure.
    async fn upsert(&self, chunks: &[ChunkRecord]) -> Result<(), RagError>;

    /// Semantic search for `query`, returning up to `n_results` hits
    /// ordered by ascending distance. `filter_type` restricts results to
    /// one category key (e.g. `statute`).
    ///
    /// # Errors
    /// Returns [`RagError::Index`] on backend failure.
    async fn search(
        &self,
        query: &str,
        n_results: usize,
        filter_type: Option<&str>,
    ) -> Result<Vec<SearchHit>, RagError>;
}
