//! The retrieval-augmented answer pipeline.
//!
//! One query is handled start to finish: search the vector index, assemble
//! the ranked hits into a context block, run a single chat completion, and
//! attribute sources in ranking order. No internal retries; collaborator
//! failures propagate as the failure of that single query.

use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::RagError;
use crate::index::VectorIndex;
use crate::llm::ChatCompleter;
use crate::prompt;
use crate::types::{QueryResult, SourceRef};

/// Default number of results fetched per query.
pub const DEFAULT_N_RESULTS: usize = 5;

/// Fixed answer when retrieval yields no evidence. The LLM is not called.
pub const NO_EVIDENCE_ANSWER: &str = "관련 문서를 찾을 수 없습니다.";

/// Search + answer-generation chain over injected collaborators.
///
/// Construct the vector index and chat collaborators once at process start
/// and pass them in; the chain holds no other state and is safe for
/// sequential reuse across queries.
pub struct RagChain {
    index: Arc<dyn VectorIndex>,
    chat: Arc<dyn ChatCompleter>,
    temperature: f32,
    max_tokens: u32,
}

impl RagChain {
    /// Creates a chain with the default sampling knobs
    /// (temperature 0.7, 2000 output tokens).
    pub fn new(index: Arc<dyn VectorIndex>, chat: Arc<dyn ChatCompleter>) -> Self {
        Self {
            index,
            chat,
            temperature: 0.7,
            max_tokens: 2000,
        }
    }

    /// Overrides the sampling temperature (non-zero by default: repeated
    /// identical queries may produce different answers).
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Overrides the output-length cap.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Answers a question from retrieved corpus evidence.
    ///
    /// Trusts the collaborator's ascending-distance ordering: context blocks
    /// and `sources` follow it exactly. With no hits, returns the fixed
    /// no-evidence answer without invoking the LLM.
    ///
    /// # Errors
    /// Search or completion failures propagate unretried; the chain stays
    /// usable for the next query.
    pub async fn query(
        &self,
        question: &str,
        n_results: usize,
        filter_type: Option<&str>,
    ) -> Result<QueryResult, RagError> {
        debug!(n_results, ?filter_type, "querying: {question}");

        let hits = self.index.search(question, n_results, filter_type).await?;

        if hits.is_empty() {
            info!("no relevant documents for query");
            return Ok(QueryResult {
                answer: NO_EVIDENCE_ANSWER.to_string(),
                sources: Vec::new(),
                question: question.to_string(),
            });
        }

        let context = prompt::format_context(&hits);
        let user_message = prompt::build_user_prompt(&context, question);

        let answer = self
            .chat
            .complete(
                prompt::SYSTEM_PROMPT,
                &user_message,
                self.temperature,
                self.max_tokens,
            )
            .await?;

        let sources = hits
            .iter()
            .map(|h| SourceRef {
                doc_id: h.doc_id.clone(),
                type_name: h.type_name.clone(),
                distance: h.distance,
            })
            .collect();

        info!("answered with {} sources", hits.len());

        Ok(QueryResult {
            answer,
            sources,
            question: question.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SearchHit;
    use async_trait::async_trait;
    use legal_corpus::ChunkRecord;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Index stub returning a fixed ranking.
    struct FixedIndex {
        hits: Vec<SearchHit>,
    }

    #[async_trait]
    impl VectorIndex for FixedIndex {
        async fn upsert(&self, _chunks: &[ChunkRecord]) -> Result<(), RagError> {
            Ok(())
        }

        async fn search(
            &self,
            _query: &str,
            n_results: usize,
            _filter_type: Option<&str>,
        ) -> Result<Vec<SearchHit>, RagError> {
            Ok(self.hits.iter().take(n_results).cloned().collect())
        }
    }

    /// Chat stub that counts invocations and records the last user message.
    struct RecordingChat {
        calls: AtomicUsize,
        last_user: Mutex<Option<String>>,
    }

    impl RecordingChat {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                last_user: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl ChatCompleter for RecordingChat {
        async fn complete(
            &self,
            _system: &str,
            user: &str,
            _temperature: f32,
            _max_tokens: u32,
        ) -> Result<String, RagError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_user.lock().unwrap() = Some(user.to_string());
            Ok("폭행죄는 형법 제260조에 따라 처벌됩니다.".to_string())
        }
    }

    fn hit(doc_id: &str, distance: f32) -> SearchHit {
        SearchHit {
            content: format!("{doc_id} 본문"),
            doc_id: doc_id.into(),
            type_name: "판례".into(),
            distance,
        }
    }

    #[tokio::test]
    async fn empty_search_short_circuits_without_llm_call() {
        let chat = Arc::new(RecordingChat::new());
        let chain = RagChain::new(Arc::new(FixedIndex { hits: vec![] }), chat.clone());

        let result = chain.query("사기죄 성립 요건은?", 5, None).await.unwrap();

        assert_eq!(result.answer, NO_EVIDENCE_ANSWER);
        assert!(result.sources.is_empty());
        assert_eq!(result.question, "사기죄 성립 요건은?");
        assert_eq!(chat.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn sources_and_context_preserve_ranking_order() {
        let hits = vec![hit("A", 0.1), hit("B", 0.2), hit("C", 0.3)];
        let chat = Arc::new(RecordingChat::new());
        let chain = RagChain::new(Arc::new(FixedIndex { hits }), chat.clone());

        let result = chain.query("질문", 5, None).await.unwrap();

        let ids: Vec<&str> = result.sources.iter().map(|s| s.doc_id.as_str()).collect();
        assert_eq!(ids, ["A", "B", "C"]);
        assert_eq!(result.sources[0].distance, 0.1);

        let user = chat.last_user.lock().unwrap().clone().unwrap();
        let a = user.find("- A").unwrap();
        let b = user.find("- B").unwrap();
        let c = user.find("- C").unwrap();
        assert!(a < b && b < c);
        // The verbatim question follows the context.
        assert!(user.find("질문: 질문").unwrap() > c);
    }

    #[tokio::test]
    async fn n_results_caps_retrieval() {
        let hits = vec![hit("A", 0.1), hit("B", 0.2), hit("C", 0.3)];
        let chain = RagChain::new(
            Arc::new(FixedIndex { hits }),
            Arc::new(RecordingChat::new()),
        );

        let result = chain.query("질문", 2, None).await.unwrap();
        assert_eq!(result.sources.len(), 2);
    }

    #[tokio::test]
    async fn index_failure_propagates() {
        struct FailingIndex;

        #[async_trait]
        impl VectorIndex for FailingIndex {
            async fn upsert(&self, _chunks: &[ChunkRecord]) -> Result<(), RagError> {
                Ok(())
            }
            async fn search(
                &self,
                _query: &str,
                _n_results: usize,
                _filter_type: Option<&str>,
            ) -> Result<Vec<SearchHit>, RagError> {
                Err(RagError::Index("backend unavailable".into()))
            }
        }

        let chat = Arc::new(RecordingChat::new());
        let chain = RagChain::new(Arc::new(FailingIndex), chat.clone());

        let err = chain.query("질문", 5, None).await.unwrap_err();
        assert!(matches!(err, RagError::Index(_)));
        assert_eq!(chat.calls.load(Ordering::SeqCst), 0);
    }
}
