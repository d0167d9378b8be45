//! Sliding-window chunking with soft sentence alignment.
//!
//! Goals:
//! - Deterministic, pure splitting: same input always yields the same chunks.
//! - Windows end on the last sentence terminator when one exists past the
//!   window midpoint, so chunks rarely cut mid-sentence.
//! - Consecutive windows overlap by `overlap` characters (minus any
//!   boundary truncation), so retrieval never loses cross-window context.
//!
//! Window arithmetic is in *characters*, not bytes: the corpus is Korean
//! text and byte-offset windows would split multi-byte code points.

use crate::errors::CorpusError;
use crate::types::{ChunkRecord, DocumentRecord};
use tracing::{debug, trace};

/// Sentence terminator searched for when truncating a window.
const SENTENCE_TERMINATOR: char = '.';

/// Window parameters for [`chunk_document`].
///
/// Invariant: `0 <= overlap < chunk_size`.
#[derive(Clone, Copy, Debug)]
pub struct ChunkParams {
    /// Window width in characters.
    pub chunk_size: usize,
    /// Characters shared between consecutive windows.
    pub overlap: usize,
}

impl Default for ChunkParams {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
        }
    }
}

impl ChunkParams {
    /// Validates the `overlap < chunk_size` invariant.
    ///
    /// # Errors
    /// Returns [`CorpusError::InvalidChunking`] when `chunk_size` is zero or
    /// `overlap >= chunk_size`.
    pub fn validate(&self) -> Result<(), CorpusError> {
        if self.chunk_size == 0 || self.overlap >= self.chunk_size {
            return Err(CorpusError::InvalidChunking {
                chunk_size: self.chunk_size,
                overlap: self.overlap,
            });
        }
        Ok(())
    }
}

/// Splits a document into overlapping, sentence-aware chunks.
///
/// Each chunk carries a copy of the document metadata plus `chunk_idx` and
/// `chunk_id = {doc_id}_chunk_{chunk_idx}`. Empty content yields no chunks;
/// content no longer than `chunk_size` yields exactly one chunk equal to the
/// trimmed content.
///
/// Non-final windows are truncated to end just after the last `.` inside the
/// window when that terminator sits past the window midpoint; a window with
/// no terminator in its latter half is emitted at full width even if that
/// cuts mid-word.
///
/// # Errors
/// Returns [`CorpusError::InvalidChunking`] for invalid `params`.
pub fn chunk_document(
    doc: &DocumentRecord,
    params: &ChunkParams,
) -> Result<Vec<ChunkRecord>, CorpusError> {
    params.validate()?;

    let chars: Vec<char> = doc.content.chars().collect();
    let total = chars.len();
    if total == 0 {
        trace!("chunk_document: empty content for {}", doc.metadata.doc_id);
        return Ok(Vec::new());
    }

    let mut out = Vec::new();
    let mut start = 0usize;
    let mut chunk_idx = 0usize;

    while start < total {
        let tentative = start + params.chunk_size;
        let mut end = tentative.min(total);

        if tentative < total {
            // Not the final window: pull the end back to the last sentence
            // terminator, but only past the midpoint so windows never
            // degenerate to near-empty slices.
            if let Some(rel) = chars[start..end]
                .iter()
                .rposition(|&c| c == SENTENCE_TERMINATOR)
            {
                if rel > params.chunk_size / 2 {
                    end = start + rel + 1;
                }
            }
        }

        let text: String = chars[start..end].iter().collect();
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            out.push(ChunkRecord::new(
                &doc.metadata,
                trimmed.to_string(),
                chunk_idx,
            ));
            chunk_idx += 1;
        }

        if end == total {
            break;
        }

        // Advance from the *emitted* end. The clamp keeps the loop moving
        // forward when truncation lands within `overlap` of `start`.
        let next = end.saturating_sub(params.overlap);
        start = if next > start { next } else { end };
    }

    debug!(
        "chunk_document: {} chars -> {} chunks for {}",
        total,
        out.len(),
        doc.metadata.doc_id
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocMetadata;

    fn doc(content: &str) -> DocumentRecord {
        DocumentRecord {
            content: content.to_string(),
            metadata: DocMetadata {
                doc_id: "case_001".into(),
                file_path: "data_sampled/judgement/case_001.csv".into(),
                doc_type: "judgement".into(),
                type_name: "판례".into(),
                sections: None,
            },
        }
    }

    fn params(chunk_size: usize, overlap: usize) -> ChunkParams {
        ChunkParams {
            chunk_size,
            overlap,
        }
    }

    #[test]
    fn empty_content_yields_no_chunks() {
        let chunks = chunk_document(&doc(""), &ChunkParams::default()).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn short_document_is_a_single_trimmed_chunk() {
        let chunks = chunk_document(&doc("  짧은 판결문입니다.  "), &ChunkParams::default()).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "짧은 판결문입니다.");
        assert_eq!(chunks[0].metadata.chunk_idx, 0);
        assert_eq!(chunks[0].metadata.chunk_id, "case_001_chunk_0");
    }

    #[test]
    fn truncates_at_last_period_past_midpoint() {
        // 20-char window over "Sentence one. Sentence two. Sentence three.":
        // the last '.' before position 20 is at index 12, which is past the
        // midpoint (10), so the first chunk ends right after it.
        let text = "Sentence one. Sentence two. Sentence three.";
        let chunks = chunk_document(&doc(text), &params(20, 5)).unwrap();
        assert_eq!(chunks[0].content, "Sentence one.");
        // No chunk splits inside a word.
        for c in &chunks {
            assert!(!c.content.starts_with("ntence"), "mid-word cut: {:?}", c.content);
        }
    }

    #[test]
    fn windows_overlap_and_cover_the_document() {
        let text = "가나다라마바사아자차카타파하".repeat(40); // 560 chars, no '.'
        let chunks = chunk_document(&doc(&text), &params(100, 20)).unwrap();
        // No terminator anywhere: full-width windows advancing by 80.
        assert_eq!(chunks.len(), 7);
        assert_eq!(chunks[0].content.chars().count(), 100);
        // Consecutive chunks share the overlap region.
        let first: String = chunks[0].content.chars().skip(80).collect();
        let second: String = chunks[1].content.chars().take(20).collect();
        assert_eq!(first, second);
        // Last chunk ends exactly at the end of the document.
        let tail: String = text.chars().skip(480).collect();
        assert_eq!(chunks[6].content, tail);
    }

    #[test]
    fn chunk_ids_increase_from_zero() {
        let text = "문장 하나. ".repeat(200);
        let chunks = chunk_document(&doc(&text), &params(50, 10)).unwrap();
        assert!(chunks.len() > 1);
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.metadata.chunk_idx, i);
            assert_eq!(c.metadata.chunk_id, format!("case_001_chunk_{i}"));
        }
    }

    #[test]
    fn whitespace_only_document_yields_no_chunks() {
        let chunks = chunk_document(&doc("   \n\n   "), &ChunkParams::default()).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn rejects_overlap_not_below_chunk_size() {
        let err = chunk_document(&doc("abc"), &params(10, 10)).unwrap_err();
        assert!(matches!(err, CorpusError::InvalidChunking { .. }));
    }

    #[test]
    fn terminator_only_before_midpoint_keeps_full_window() {
        // '.' at index 3 is before the midpoint of a 20-char window, so the
        // window stays full width even though that cuts mid-word.
        let text = "abc. defghijklmnopqrstuvwxyz0123456789";
        let chunks = chunk_document(&doc(text), &params(20, 5)).unwrap();
        assert_eq!(chunks[0].content.chars().count(), 20);
    }
}
