//! Thin adapter around `qdrant-client` to isolate API usage.
//!
//! Concentrates all Qdrant interactions behind a minimal API, hiding the
//! verbose builder pattern from the rest of the adapter.

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, Distance, FieldCondition, Filter, Match, PointStruct,
    SearchPointsBuilder, UpsertPointsBuilder, Value as QValue, VectorParamsBuilder,
    condition::ConditionOneOf, r#match::MatchValue,
};
use tracing::{debug, info, warn};

use crate::config::IndexConfig;
use crate::errors::IndexError;

/// Facade over the Qdrant client; cosine distance throughout.
pub struct QdrantFacade {
    client: Qdrant,
    collection: String,
}

impl QdrantFacade {
    /// Creates a new facade from the given configuration.
    pub fn new(cfg: &IndexConfig) -> Result<Self, IndexError> {
        cfg.validate()?;

        let mut builder = Qdrant::from_url(&cfg.qdrant_url);
        if let Some(key) = &cfg.qdrant_api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| IndexError::Qdrant(e.to_string()))?;

        Ok(Self {
            client,
            collection: cfg.collection.clone(),
        })
    }

    /// Ensures the collection exists, creating it with a cosine vector
    /// space of the given dimensionality when missing.
    pub async fn ensure_collection(&self, dim: usize) -> Result<(), IndexError> {
        match self.client.collection_info(&self.collection).await {
            Ok(_) => {
                debug!("collection '{}' already exists", self.collection);
                return Ok(());
            }
            Err(err) => {
                warn!(
                    "collection '{}' not found, creating (error={})",
                    self.collection, err
                );
            }
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(dim as u64, Distance::Cosine)),
            )
            .await
            .map_err(|e| IndexError::Qdrant(e.to_string()))?;

        info!("collection '{}' created (dim={dim})", self.collection);
        Ok(())
    }

    /// Upserts a batch of points into the collection.
    pub async fn upsert_points(&self, points: Vec<PointStruct>) -> Result<(), IndexError> {
        if points.is_empty() {
            debug!("no points provided for upsert");
            return Ok(());
        }

        debug!(
            "upserting {} points into '{}'",
            points.len(),
            self.collection
        );

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points))
            .await
            .map_err(|e| IndexError::Qdrant(e.to_string()))?;

        Ok(())
    }

    /// Similarity search. Returns `(score, payload)` tuples in the order
    /// Qdrant ranks them (descending cosine similarity).
    pub async fn search(
        &self,
        vector: Vec<f32>,
        top_k: u64,
        filter: Option<Filter>,
    ) -> Result<Vec<(f32, serde_json::Value)>, IndexError> {
        debug!("searching '{}' with top_k={top_k}", self.collection);

        let mut builder =
            SearchPointsBuilder::new(&self.collection, vector, top_k).with_payload(true);
        if let Some(f) = filter {
            builder = builder.filter(f);
        }

        let res = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| IndexError::Qdrant(e.to_string()))?;

        let mut out = Vec::with_capacity(res.result.len());
        for r in res.result.into_iter() {
            out.push((r.score, qpayload_to_json(r.payload)));
        }

        debug!("search completed: {} hits", out.len());
        Ok(out)
    }
}

/// Exact-match filter on the category key, for `filter_type` queries.
pub fn type_filter(doc_type: &str) -> Filter {
    Filter {
        must: vec![Condition {
            condition_one_of: Some(ConditionOneOf::Field(FieldCondition {
                key: "type".to_string(),
                r#match: Some(Match {
                    match_value: Some(MatchValue::Keyword(doc_type.to_string())),
                }),
                ..Default::default()
            })),
        }],
        ..Default::default()
    }
}

/// Converts a Qdrant payload into JSON. Nested values unsupported by the
/// scalar mapping become `Null`.
fn qpayload_to_json(mut p: std::collections::HashMap<String, QValue>) -> serde_json::Value {
    use qdrant_client::qdrant::value::Kind as K;
    let mut m = serde_json::Map::new();
    for (k, v) in p.drain() {
        let j = match v.kind {
            Some(K::StringValue(s)) => serde_json::Value::String(s),
            Some(K::IntegerValue(i)) => serde_json::Value::Number(i.into()),
            Some(K::DoubleValue(f)) => serde_json::json!(f),
            Some(K::BoolValue(b)) => serde_json::Value::Bool(b),
            _ => serde_json::Value::Null,
        };
        m.insert(k, j);
    }
    serde_json::Value::Object(m)
}
