//! Qdrant-backed [`VectorIndex`] collaborator.
//!
//! Wires an embeddings provider and a Qdrant collection into the
//! `legal-rag` index seam: chunk upsert with deterministic point ids and
//! full metadata payloads, and semantic search returning ascending-distance
//! hits.
//!
//! Qdrant scores cosine results as *similarity* (higher = closer); this
//! adapter exposes `distance = 1 - score` so consumers keep the
//! ascending-distance contract.

mod config;
mod embed;
mod errors;
mod facade;

pub use config::IndexConfig;
pub use embed::{EmbedConfig, EmbeddingsProvider, HttpEmbedder};
pub use errors::IndexError;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use legal_corpus::ChunkRecord;
use legal_rag::{RagError, SearchHit, VectorIndex};
use qdrant_client::qdrant::{PointStruct, Value as QValue, value};
use tracing::{debug, info};
use uuid::Uuid;

/// Qdrant adapter implementing [`VectorIndex`].
pub struct QdrantIndex {
    facade: facade::QdrantFacade,
    embedder: Arc<dyn EmbeddingsProvider>,
    dim: usize,
    // Collection existence is verified at most once per adapter instance;
    // `ensure_collection` is idempotent, so a racing duplicate check is
    // harmless.
    collection_ready: AtomicBool,
}

impl QdrantIndex {
    /// Constructs the adapter from configuration and an embeddings provider.
    ///
    /// # Errors
    /// Returns [`IndexError::Config`] or [`IndexError::Qdrant`] when the
    /// configuration is invalid or the client cannot be built.
    pub fn new(cfg: IndexConfig, embedder: Arc<dyn EmbeddingsProvider>) -> Result<Self, IndexError> {
        let facade = facade::QdrantFacade::new(&cfg)?;
        info!(
            collection = %cfg.collection,
            dim = cfg.embedding_dim,
            "QdrantIndex initialized"
        );
        Ok(Self {
            facade,
            embedder,
            dim: cfg.embedding_dim,
            collection_ready: AtomicBool::new(false),
        })
    }

    async fn ensure_collection_once(&self) -> Result<(), IndexError> {
        if self.collection_ready.load(Ordering::Acquire) {
            return Ok(());
        }
        self.facade.ensure_collection(self.dim).await?;
        self.collection_ready.store(true, Ordering::Release);
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn upsert(&self, chunks: &[ChunkRecord]) -> Result<(), RagError> {
        self.ensure_collection_once().await.map_err(to_rag_error)?;

        let mut points = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let vector = self
                .embedder
                .embed(&chunk.content)
                .await
                .map_err(to_rag_error)?;
            points.push(PointStruct {
                id: Some(stable_point_id(chunk).to_string().into()),
                payload: chunk_payload(chunk),
                vectors: Some(vector.into()),
                ..Default::default()
            });
        }

        debug!("upserting {} chunk points", points.len());
        self.facade
            .upsert_points(points)
            .await
            .map_err(to_rag_error)
    }

    async fn search(
        &self,
        query: &str,
        n_results: usize,
        filter_type: Option<&str>,
    ) -> Result<Vec<SearchHit>, RagError> {
        let vector = self.embedder.embed(query).await.map_err(to_rag_error)?;
        let filter = filter_type.map(facade::type_filter);

        let raw = self
            .facade
            .search(vector, n_results as u64, filter)
            .await
            .map_err(to_rag_error)?;

        // Qdrant ranks by descending similarity; 1 - score preserves that
        // ranking as ascending distance.
        Ok(raw
            .into_iter()
            .map(|(score, payload)| hit_from_payload(score, &payload))
            .collect())
    }
}

fn to_rag_error(e: IndexError) -> RagError {
    RagError::Index(e.to_string())
}

/// Deterministic UUIDv5 point id from the chunk's global identifier.
///
/// `chunk_id` is unique only per category, so the category key is part of
/// the name.
fn stable_point_id(chunk: &ChunkRecord) -> Uuid {
    let global = format!(
        "{}/{}",
        chunk.metadata.doc.doc_type, chunk.metadata.chunk_id
    );
    Uuid::new_v5(&Uuid::NAMESPACE_URL, global.as_bytes())
}

/// Builds the point payload: chunk text plus full provenance metadata.
fn chunk_payload(chunk: &ChunkRecord) -> std::collections::HashMap<String, QValue> {
    let meta = &chunk.metadata;
    let mut payload = std::collections::HashMap::new();
    payload.insert("content".to_string(), qstring(&chunk.content));
    payload.insert("doc_id".to_string(), qstring(&meta.doc.doc_id));
    payload.insert("file_path".to_string(), qstring(&meta.doc.file_path));
    payload.insert("type".to_string(), qstring(&meta.doc.doc_type));
    payload.insert("type_name".to_string(), qstring(&meta.doc.type_name));
    payload.insert("chunk_id".to_string(), qstring(&meta.chunk_id));
    payload.insert(
        "chunk_idx".to_string(),
        QValue {
            kind: Some(value::Kind::IntegerValue(meta.chunk_idx as i64)),
        },
    );
    if let Some(sections) = &meta.doc.sections {
        payload.insert("sections".to_string(), qstring(sections));
    }
    payload
}

/// Maps a `(score, payload)` search tuple to a [`SearchHit`].
fn hit_from_payload(score: f32, payload: &serde_json::Value) -> SearchHit {
    let get = |key: &str| {
        payload
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    };
    SearchHit {
        content: get("content"),
        doc_id: get("doc_id"),
        type_name: get("type_name"),
        distance: 1.0 - score,
    }
}

/// Wraps a string into a Qdrant `Value`.
fn qstring(s: &str) -> QValue {
    QValue {
        kind: Some(value::Kind::StringValue(s.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use legal_corpus::{ChunkRecord, DocMetadata};

    fn chunk(doc_type: &str, doc_id: &str, idx: usize) -> ChunkRecord {
        let meta = DocMetadata {
            doc_id: doc_id.into(),
            file_path: format!("data_sampled/{doc_type}/{doc_id}.csv"),
            doc_type: doc_type.into(),
            type_name: "판례".into(),
            sections: Some("판시사항".into()),
        };
        ChunkRecord::new(&meta, "본문".into(), idx)
    }

    #[test]
    fn point_ids_are_stable_and_category_scoped() {
        let a = stable_point_id(&chunk("judgement", "doc_1", 0));
        let b = stable_point_id(&chunk("judgement", "doc_1", 0));
        assert_eq!(a, b);

        // Same doc_id in a different category is a different point.
        let c = stable_point_id(&chunk("statute", "doc_1", 0));
        assert_ne!(a, c);
    }

    #[test]
    fn payload_carries_full_provenance() {
        let payload = chunk_payload(&chunk("judgement", "2020do1234", 3));
        let as_str = |key: &str| match &payload[key].kind {
            Some(value::Kind::StringValue(s)) => s.clone(),
            other => panic!("expected string for {key}, got {other:?}"),
        };
        assert_eq!(as_str("doc_id"), "2020do1234");
        assert_eq!(as_str("type"), "judgement");
        assert_eq!(as_str("chunk_id"), "2020do1234_chunk_3");
        assert_eq!(as_str("sections"), "판시사항");
        assert!(matches!(
            payload["chunk_idx"].kind,
            Some(value::Kind::IntegerValue(3))
        ));
    }

    struct FixedEmbedder;

    #[async_trait]
    impl EmbeddingsProvider for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, IndexError> {
            Ok(vec![0.0; 4])
        }
    }

    #[tokio::test]
    async fn collection_check_runs_at_most_once() {
        // Unreachable endpoint: any collection round trip would fail, so a
        // clean return proves the verified flag short-circuits the check.
        let cfg = IndexConfig::new("http://127.0.0.1:1", "legal_documents", 4);
        let index = QdrantIndex::new(cfg, Arc::new(FixedEmbedder)).unwrap();

        index.collection_ready.store(true, Ordering::Release);
        index.ensure_collection_once().await.unwrap();
    }

    #[test]
    fn similarity_scores_become_distances() {
        let hit = hit_from_payload(
            0.92,
            &serde_json::json!({
                "content": "본문",
                "doc_id": "doc_1",
                "type_name": "법령",
            }),
        );
        assert!((hit.distance - 0.08).abs() < 1e-6);
        assert_eq!(hit.doc_id, "doc_1");
        assert_eq!(hit.type_name, "법령");
    }
}
