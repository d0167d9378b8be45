//! LLM collaborator interface and the OpenRouter-backed implementation.
//!
//! Minimal, non-streaming client around the OpenAI-compatible REST surface:
//! - POST {endpoint}/chat/completions — chat completion
//!
//! Constructor validation:
//! - credential must resolve from the configured source chain
//! - `endpoint` must start with http:// or https://

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::credentials::{self, CredentialSource};
use crate::errors::{RagError, make_snippet};

/// Default OpenRouter API base.
pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1";
/// Default chat model.
pub const DEFAULT_MODEL: &str = "meta-llama/llama-3.3-70b-instruct:free";

/// Chat-completion collaborator: one `(system, user)` exchange per call.
#[async_trait]
pub trait ChatCompleter: Send + Sync {
    /// Sends one prompt pair and returns the assistant's text.
    ///
    /// # Errors
    /// Transport, HTTP-status, and decode failures propagate unretried.
    async fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, RagError>;
}

/// Configuration for [`OpenRouterChat`].
#[derive(Clone, Debug)]
pub struct LlmConfig {
    /// Model identifier, e.g. `meta-llama/llama-3.3-70b-instruct:free`.
    pub model: String,
    /// API base URL.
    pub endpoint: String,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: Some(120),
        }
    }
}

/// Thin chat client for the OpenRouter API.
///
/// Keeps a preconfigured `reqwest::Client` with the bearer credential and a
/// timeout. Construct once and share; safe for sequential reuse across
/// queries with no per-query setup.
pub struct OpenRouterChat {
    client: reqwest::Client,
    model: String,
    url_chat: String,
}

impl OpenRouterChat {
    /// Creates a client, resolving the credential from `sources`.
    ///
    /// # Errors
    /// - [`RagError::MissingCredential`] if no source yields a key — this is
    ///   fatal at construction, before any query can proceed
    /// - [`RagError::Config`] for a malformed endpoint
    /// - [`RagError::Http`] if the HTTP client cannot be built
    pub fn new(cfg: LlmConfig, sources: &[CredentialSource]) -> Result<Self, RagError> {
        let api_key = credentials::resolve(sources)?;

        let endpoint = cfg.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(RagError::Config(format!("invalid endpoint: {endpoint}")));
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| RagError::Config(format!("invalid API key header: {e}")))?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(120));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let url_chat = format!("{}/chat/completions", endpoint.trim_end_matches('/'));

        info!(
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            "OpenRouterChat initialized"
        );

        Ok(Self {
            client,
            model: cfg.model,
            url_chat,
        })
    }

    /// Convenience constructor using [`credentials::default_sources`].
    pub fn from_default_sources(cfg: LlmConfig) -> Result<Self, RagError> {
        Self::new(cfg, &credentials::default_sources())
    }
}

#[async_trait]
impl ChatCompleter for OpenRouterChat {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, RagError> {
        let started = Instant::now();
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature,
            max_tokens,
        };

        debug!(
            model = %self.model,
            user_len = user.len(),
            "POST {}", self.url_chat
        );

        let resp = self.client.post(&self.url_chat).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_chat.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(
                %status,
                %url,
                %snippet,
                latency_ms = started.elapsed().as_millis(),
                "chat completion returned non-success status"
            );

            return Err(RagError::Status {
                status,
                url,
                snippet,
            });
        }

        let out: ChatCompletionResponse = resp.json().await.map_err(|e| {
            RagError::Decode(format!(
                "serde error: {e}; expected `choices[0].message.content`"
            ))
        })?;

        let content = out
            .choices
            .into_iter()
            .find_map(|c| c.message.content)
            .ok_or_else(|| RagError::Decode("empty `choices` in chat response".into()))?;

        info!(
            model = %self.model,
            latency_ms = started.elapsed().as_millis(),
            "chat completion completed"
        );

        Ok(content)
    }
}

/// Minimal request body for `/chat/completions` (non-streaming).
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Minimal response for `/chat/completions`.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageOut,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    content: Option<String>,
}
