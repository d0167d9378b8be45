//! Ingestion driver: load + chunk the corpus, then upsert in batches.

use legal_corpus::{ChunkParams, CorpusLoader};
use tracing::{debug, info};

use crate::errors::RagError;
use crate::index::VectorIndex;

/// Default upsert batch size.
pub const DEFAULT_UPSERT_BATCH: usize = 256;

/// Loads and chunks the whole corpus, then upserts every chunk into the
/// index in batches. Returns the number of chunks indexed.
///
/// # Errors
/// Corpus errors and index upsert failures propagate; there are no
/// partial-batch retries.
pub async fn index_corpus(
    loader: &CorpusLoader,
    index: &dyn VectorIndex,
    params: &ChunkParams,
    batch_size: usize,
) -> Result<usize, RagError> {
    let chunks = loader.load_and_chunk(params)?;
    if chunks.is_empty() {
        info!("nothing to index");
        return Ok(0);
    }

    let batch_size = batch_size.max(1);
    info!(
        "indexing {} chunks in batches of {}",
        chunks.len(),
        batch_size
    );

    let mut total = 0usize;
    for batch in chunks.chunks(batch_size) {
        index.upsert(batch).await?;
        total += batch.len();
        debug!("indexed {total}/{} chunks", chunks.len());
    }

    info!("indexed {total} chunks");
    Ok(total)
}
