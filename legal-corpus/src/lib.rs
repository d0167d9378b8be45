//! Corpus ingestion for the criminal-law RAG backend.
//!
//! This crate turns heterogeneous CSV dumps (judgements, decisions, statutes,
//! interpretations) into [`DocumentRecord`]s, then into overlapping,
//! sentence-boundary-aware [`ChunkRecord`]s ready for vector indexing.
//!
//! The design is flat and splits responsibilities into focused modules:
//! - [`loader`] — per-category file scan + CSV parsing with encoding fallback
//! - [`chunker`] — deterministic sliding-window chunking

mod chunker;
mod errors;
mod loader;
mod types;

pub use chunker::{ChunkParams, chunk_document};
pub use errors::CorpusError;
pub use loader::{CATEGORIES, CorpusLoader};
pub use types::{ChunkMetadata, ChunkRecord, DocMetadata, DocumentRecord};
