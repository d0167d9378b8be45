//! Core record types produced by the ingestion pipeline.

use serde::{Deserialize, Serialize};

/// Provenance metadata attached to every loaded document.
///
/// `doc_id` is unique only within its category directory; the global
/// identifier of a document is the pair `(doc_type, doc_id)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocMetadata {
    /// File name without extension.
    pub doc_id: String,
    /// Original path of the source file.
    pub file_path: String,
    /// Category key, e.g. `judgement`.
    #[serde(rename = "type")]
    pub doc_type: String,
    /// Human-readable category label, e.g. `판례`.
    pub type_name: String,
    /// Comma-joined distinct values of the section column, in order of
    /// first appearance. Absent when the source has no section column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections: Option<String>,
}

/// One normalized source document: full text plus provenance.
///
/// Created once per source file during a load pass, immutable afterwards,
/// and consumed entirely by the chunker.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub content: String,
    pub metadata: DocMetadata,
}

/// Metadata carried by a chunk: the owning document's metadata plus the
/// chunk's position within it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChunkMetadata {
    #[serde(flatten)]
    pub doc: DocMetadata,
    /// 0-based sequence number within the document.
    pub chunk_idx: usize,
    /// `{doc_id}_chunk_{chunk_idx}`.
    pub chunk_id: String,
}

/// A contiguous, whitespace-trimmed slice of a document, the atomic unit
/// of retrieval.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub content: String,
    pub metadata: ChunkMetadata,
}

impl ChunkRecord {
    /// Builds a chunk from its owning document's metadata.
    pub fn new(doc_meta: &DocMetadata, content: String, chunk_idx: usize) -> Self {
        let chunk_id = format!("{}_chunk_{}", doc_meta.doc_id, chunk_idx);
        Self {
            content,
            metadata: ChunkMetadata {
                doc: doc_meta.clone(),
                chunk_idx,
                chunk_id,
            },
        }
    }
}
