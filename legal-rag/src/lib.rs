//! Retrieval-augmented answering over the criminal-law corpus.
//!
//! Public surface:
//! - [`RagChain`] — search → context assembly → one chat completion,
//!   with source attribution in ranking order
//! - [`VectorIndex`] / [`ChatCompleter`] — collaborator traits, injected
//!   once at process start (no hidden globals)
//! - [`OpenRouterChat`] — the bundled OpenRouter chat backend
//! - [`ingest::index_corpus`] — corpus → chunks → batched upsert

mod chain;
pub mod credentials;
mod errors;
mod index;
pub mod ingest;
mod llm;
pub mod prompt;
mod types;

pub use chain::{DEFAULT_N_RESULTS, NO_EVIDENCE_ANSWER, RagChain};
pub use credentials::{API_KEY_NAME, CredentialSource, default_sources};
pub use errors::RagError;
pub use index::VectorIndex;
pub use llm::{ChatCompleter, DEFAULT_ENDPOINT, DEFAULT_MODEL, LlmConfig, OpenRouterChat};
pub use types::{QueryResult, SearchHit, SourceRef};
