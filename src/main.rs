//! Operational entry point: corpus indexing and one-shot questions.
//!
//! Usage:
//!   justiq-backend --index            build the vector index from the corpus
//!   justiq-backend <question...>      answer a single question
//!
//! Configuration comes from the environment (a `.env` file is honored);
//! the OpenRouter credential is resolved from the secrets file first, then
//! the environment.

use std::error::Error;
use std::sync::Arc;

use legal_corpus::{ChunkParams, CorpusLoader};
use legal_rag::{CredentialSource, LlmConfig, OpenRouterChat, RagChain, VectorIndex, ingest};
use qdrant_index::{EmbedConfig, HttpEmbedder, IndexConfig, QdrantIndex};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from .env when present.
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("--index") => run_index().await,
        Some(_) => run_ask(&args.join(" ")).await,
        None => {
            eprintln!("usage: justiq-backend --index | justiq-backend <question>");
            Ok(())
        }
    }
}

/// Builds the vector index from the corpus root.
async fn run_index() -> Result<(), Box<dyn Error>> {
    let loader = CorpusLoader::new(env("CORPUS_DIR", "data_sampled"));
    let index = build_index()?;

    let params = ChunkParams {
        chunk_size: parse("CHUNK_SIZE", 1000usize),
        overlap: parse("CHUNK_OVERLAP", 200usize),
    };
    let total = ingest::index_corpus(
        &loader,
        index.as_ref(),
        &params,
        parse("UPSERT_BATCH", ingest::DEFAULT_UPSERT_BATCH),
    )
    .await?;

    println!("indexed {total} chunks");
    Ok(())
}

/// Answers one question and prints the attributed sources.
async fn run_ask(question: &str) -> Result<(), Box<dyn Error>> {
    let index = build_index()?;

    let chat = OpenRouterChat::new(
        LlmConfig {
            model: env("LLM_MODEL", legal_rag::DEFAULT_MODEL),
            endpoint: env("LLM_ENDPOINT", legal_rag::DEFAULT_ENDPOINT),
            timeout_secs: Some(parse("LLM_TIMEOUT_SECS", 120u64)),
        },
        &credential_sources(),
    )?;

    let chain = RagChain::new(index, Arc::new(chat));
    let result = chain
        .query(
            question,
            parse("N_RESULTS", legal_rag::DEFAULT_N_RESULTS),
            None,
        )
        .await?;

    println!("{}\n", result.answer);
    println!("참고 문서:");
    for src in &result.sources {
        // Similarity for display is the inverse of the stored distance.
        let similarity = 1.0 - src.distance;
        println!(
            "  - [{}] {} (유사도: {:.2}%)",
            src.type_name,
            src.doc_id,
            similarity * 100.0
        );
    }
    Ok(())
}

/// Constructs the Qdrant collaborator once; callers inject it where needed.
fn build_index() -> Result<Arc<dyn VectorIndex>, Box<dyn Error>> {
    let dim = parse("EMBEDDING_DIM", 1024usize);

    let embedder = HttpEmbedder::new(EmbedConfig {
        endpoint: env("EMBEDDINGS_URL", "http://localhost:11434/v1"),
        model: env("EMBED_MODEL", "multilingual-e5-large"),
        api_key: std::env::var("EMBEDDINGS_API_KEY").ok(),
        dim,
    })?;

    let mut cfg = IndexConfig::new(
        env("QDRANT_URL", "http://localhost:6334"),
        env("QDRANT_COLLECTION", "legal_documents"),
        dim,
    );
    cfg.qdrant_api_key = std::env::var("QDRANT_API_KEY").ok();

    Ok(Arc::new(QdrantIndex::new(cfg, Arc::new(embedder))?))
}

/// Secrets file first, environment second.
fn credential_sources() -> Vec<CredentialSource> {
    match std::env::var("SECRETS_FILE") {
        Ok(path) => vec![
            CredentialSource::SecretsFile {
                path: path.into(),
                key: legal_rag::API_KEY_NAME.to_string(),
            },
            CredentialSource::Env {
                var: legal_rag::API_KEY_NAME.to_string(),
            },
        ],
        Err(_) => legal_rag::default_sources(),
    }
}

fn env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(key, value = %raw, "unparseable value, using default");
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::parse;

    #[test]
    fn parse_keeps_default_on_malformed_value() {
        // SAFETY: single-threaded test process section; the key is unique
        // to this test.
        unsafe { std::env::set_var("JUSTIQ_TEST_CHUNK_SIZE", "abc") };
        assert_eq!(parse("JUSTIQ_TEST_CHUNK_SIZE", 1000usize), 1000);

        unsafe { std::env::set_var("JUSTIQ_TEST_CHUNK_SIZE", "250") };
        assert_eq!(parse("JUSTIQ_TEST_CHUNK_SIZE", 1000usize), 250);
    }

    #[test]
    fn parse_keeps_default_when_unset() {
        assert_eq!(parse("JUSTIQ_TEST_UNSET_KEY", 42u64), 42);
    }
}
