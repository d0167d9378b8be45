//! Embeddings provider: trait plus an OpenAI-compatible HTTP backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::errors::IndexError;

/// Provider interface for embedding generation.
///
/// Implement this to plug in another backend (local model, different API).
#[async_trait]
pub trait EmbeddingsProvider: Send + Sync {
    /// Produces an embedding vector for the given text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, IndexError>;
}

/// Configuration for [`HttpEmbedder`].
#[derive(Clone, Debug)]
pub struct EmbedConfig {
    /// API base exposing `/embeddings` (OpenAI wire shape).
    pub endpoint: String,
    /// Embedding model identifier, e.g. `intfloat/multilingual-e5-large`.
    pub model: String,
    /// Optional bearer credential.
    pub api_key: Option<String>,
    /// Expected embedding dimensionality.
    pub dim: usize,
}

/// OpenAI-compatible `/embeddings` client with a dimensionality check.
pub struct HttpEmbedder {
    client: reqwest::Client,
    url: String,
    model: String,
    dim: usize,
}

impl HttpEmbedder {
    /// Builds the HTTP client and endpoint URL.
    ///
    /// # Errors
    /// [`IndexError::Config`] for a malformed endpoint or credential,
    /// [`IndexError::Http`] if the client cannot be built.
    pub fn new(cfg: EmbedConfig) -> Result<Self, IndexError> {
        let endpoint = cfg.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(IndexError::Config(format!("invalid endpoint: {endpoint}")));
        }

        let mut headers = header::HeaderMap::new();
        if let Some(key) = &cfg.api_key {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {key}"))
                    .map_err(|e| IndexError::Config(format!("invalid API key header: {e}")))?,
            );
        }
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            url: format!("{}/embeddings", endpoint.trim_end_matches('/')),
            model: cfg.model,
            dim: cfg.dim,
        })
    }
}

#[async_trait]
impl EmbeddingsProvider for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, IndexError> {
        trace!(input_len = text.len(), "POST {}", self.url);

        let body = EmbeddingsRequest {
            model: &self.model,
            input: text,
        };
        let resp = self.client.post(&self.url).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(IndexError::Upstream(format!(
                "{status}: {}",
                text.chars().take(200).collect::<String>()
            )));
        }

        let out: EmbeddingsResponse = resp
            .json()
            .await
            .map_err(|e| IndexError::Decode(format!("expected `data[0].embedding`: {e}")))?;

        let first = out
            .data
            .into_iter()
            .next()
            .ok_or_else(|| IndexError::Decode("empty `data` in embeddings response".into()))?;

        if first.embedding.len() != self.dim {
            return Err(IndexError::VectorSizeMismatch {
                got: first.embedding.len(),
                want: self.dim,
            });
        }

        debug!("embedding computed, dim={}", self.dim);
        Ok(first.embedding)
    }
}

/// Request body for `/embeddings`.
#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a str,
}

/// Response body for `/embeddings`.
#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}
