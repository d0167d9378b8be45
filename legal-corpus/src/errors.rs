//! Unified error type for corpus loading and chunking.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error for legal-corpus operations.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// I/O or filesystem errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing errors.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Neither UTF-8 nor the EUC-KR fallback could decode the file.
    #[error("undecodable file (tried utf-8, euc-kr): {path}")]
    Encoding { path: PathBuf },

    /// Chunking parameters violate `0 <= overlap < chunk_size`.
    #[error("invalid chunking params: chunk_size={chunk_size}, overlap={overlap}")]
    InvalidChunking { chunk_size: usize, overlap: usize },
}
