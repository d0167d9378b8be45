//! Per-category CSV loading with encoding fallback.
//!
//! The corpus root holds one subdirectory per fixed category
//! (`judgement`, `decision`, `statute`, `interpretation`), each containing
//! CSV dumps. Files are decoded as UTF-8 with a single EUC-KR fallback,
//! parsed, and normalized into [`DocumentRecord`]s.
//!
//! Failure isolation: a malformed or undecodable file is logged and
//! skipped; a missing category directory is a warning; a missing corpus
//! root yields an empty result. Loading never aborts on per-file errors.

use std::fs;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, info, warn};

use crate::chunker::{ChunkParams, chunk_document};
use crate::errors::CorpusError;
use crate::types::{ChunkRecord, DocMetadata, DocumentRecord};

/// Fixed category set: directory key and human-readable label.
pub const CATEGORIES: [(&str, &str); 4] = [
    ("judgement", "판례"),
    ("decision", "결정문"),
    ("statute", "법령"),
    ("interpretation", "해석"),
];

/// Canonical content column; when absent the rightmost column is used.
const CONTENT_COLUMN: &str = "내용";
/// Canonical section column; optional.
const SECTION_COLUMN: &str = "구분";

/// Loads the legal corpus from a root directory.
pub struct CorpusLoader {
    root: PathBuf,
}

impl CorpusLoader {
    /// Creates a loader over the given corpus root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Loads every parseable CSV file from every present category directory.
    ///
    /// Per-file parse or decode failures are logged and skipped. Missing
    /// category directories produce a warning only. A missing root yields
    /// an empty vector.
    ///
    /// # Errors
    /// Returns [`CorpusError::Io`] only when a *present* category directory
    /// cannot be listed.
    pub fn load_all(&self) -> Result<Vec<DocumentRecord>, CorpusError> {
        let mut documents = Vec::new();

        for (doc_type, type_name) in CATEGORIES {
            let dir = self.root.join(doc_type);
            if !dir.is_dir() {
                warn!("category directory missing, skipping: {:?}", dir);
                continue;
            }

            let files = csv_files(&dir)?;
            info!("[{type_name}] loading {} files", files.len());

            let bar = ProgressBar::new(files.len() as u64);
            bar.set_style(
                ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}/{len:3} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar.set_message(type_name.to_string());

            for path in files {
                match self.load_csv(&path) {
                    Ok(mut doc) => {
                        doc.metadata.doc_type = doc_type.to_string();
                        doc.metadata.type_name = type_name.to_string();
                        documents.push(doc);
                    }
                    Err(e) => {
                        error!("skipping {:?}: {e}", path);
                    }
                }
                bar.inc(1);
            }
            bar.finish_and_clear();
        }

        info!("loaded {} documents", documents.len());
        Ok(documents)
    }

    /// Parses a single CSV file into a [`DocumentRecord`].
    ///
    /// Content is the newline-joined non-empty cells of the canonical
    /// content column, or of the rightmost column when no canonical column
    /// exists. Distinct section values, in order of first appearance, are
    /// comma-joined into `metadata.sections`.
    ///
    /// Category fields (`doc_type`, `type_name`) are filled by the caller.
    ///
    /// # Errors
    /// [`CorpusError::Io`] on read failure, [`CorpusError::Encoding`] when
    /// both decode attempts fail, [`CorpusError::Csv`] on parse failure.
    pub fn load_csv(&self, path: &Path) -> Result<DocumentRecord, CorpusError> {
        let bytes = fs::read(path)?;
        let text = decode_with_fallback(&bytes, path)?;

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());

        // Column-name whitespace (and a possible BOM) is trimmed before lookup.
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let content_col = headers
            .iter()
            .position(|h| h == CONTENT_COLUMN)
            .or_else(|| headers.len().checked_sub(1));
        let section_col = headers.iter().position(|h| h == SECTION_COLUMN);

        let mut lines: Vec<String> = Vec::new();
        let mut sections: Vec<String> = Vec::new();

        for record in reader.records() {
            let record = record?;

            if let Some(idx) = content_col {
                if let Some(cell) = record.get(idx) {
                    let cell = cell.trim();
                    if !cell.is_empty() {
                        lines.push(cell.to_string());
                    }
                }
            }

            if let Some(idx) = section_col {
                if let Some(cell) = record.get(idx) {
                    let cell = cell.trim();
                    if !cell.is_empty() && !sections.iter().any(|s| s == cell) {
                        sections.push(cell.to_string());
                    }
                }
            }
        }

        let doc_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        debug!("parsed {:?}: {} rows of content", path, lines.len());

        Ok(DocumentRecord {
            content: lines.join("\n"),
            metadata: DocMetadata {
                doc_id,
                file_path: path.to_string_lossy().into_owned(),
                doc_type: String::new(),
                type_name: String::new(),
                sections: if sections.is_empty() {
                    None
                } else {
                    Some(sections.join(", "))
                },
            },
        })
    }

    /// Loads the whole corpus and chunks every document.
    ///
    /// # Errors
    /// Propagates directory-listing failures and invalid chunk parameters.
    pub fn load_and_chunk(&self, params: &ChunkParams) -> Result<Vec<ChunkRecord>, CorpusError> {
        params.validate()?;
        let documents = self.load_all()?;

        info!(
            "chunking {} documents (chunk_size={}, overlap={})",
            documents.len(),
            params.chunk_size,
            params.overlap
        );

        let mut all_chunks = Vec::new();
        for doc in &documents {
            all_chunks.extend(chunk_document(doc, params)?);
        }

        info!("produced {} chunks", all_chunks.len());
        Ok(all_chunks)
    }
}

/// Lists `*.csv` files in a directory, sorted by file name for stable runs.
fn csv_files(dir: &Path) -> Result<Vec<PathBuf>, CorpusError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Decodes file bytes as UTF-8, falling back exactly once to EUC-KR.
fn decode_with_fallback(bytes: &[u8], path: &Path) -> Result<String, CorpusError> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Ok(s.to_string()),
        Err(_) => {
            let (text, _, had_errors) = encoding_rs::EUC_KR.decode(bytes);
            if had_errors {
                Err(CorpusError::Encoding {
                    path: path.to_path_buf(),
                })
            } else {
                debug!("decoded {:?} as euc-kr", path);
                Ok(text.into_owned())
            }
        }
    }
}
