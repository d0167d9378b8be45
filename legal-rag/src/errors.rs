//! Unified error type for retrieval and answer generation.

use reqwest::StatusCode;
use thiserror::Error;

/// Top-level error for legal-rag operations.
///
/// Collaborator-side failures (search or completion) are not retried here;
/// they propagate to the caller as the failure of that single query.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RagError {
    /// Corpus loading or chunking failure during ingestion.
    #[error("corpus error: {0}")]
    Corpus(#[from] legal_corpus::CorpusError),

    /// Vector-index collaborator failure (search or upsert).
    #[error("vector index error: {0}")]
    Index(String),

    /// No usable credential in any configured source.
    #[error("no LLM credential found; set {0} in the secrets file or environment")]
    MissingCredential(&'static str),

    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// HTTP transport failure when calling the LLM backend.
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// LLM backend returned a non-success HTTP status.
    #[error("HTTP {status} from {url}: {snippet}")]
    Status {
        status: StatusCode,
        url: String,
        snippet: String,
    },

    /// LLM response body could not be decoded as expected.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Trims a response body to a short, single-line snippet for error messages.
pub(crate) fn make_snippet(body: &str) -> String {
    const MAX: usize = 240;
    let one_line = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if one_line.len() <= MAX {
        return one_line;
    }
    let mut end = MAX;
    while end > 0 && !one_line.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &one_line[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_collapses_whitespace_and_truncates() {
        let short = make_snippet("a\n b\t c");
        assert_eq!(short, "a b c");

        let long = make_snippet(&"x".repeat(500));
        assert!(long.chars().count() <= 241);
        assert!(long.ends_with('…'));
    }
}
