//! Text embeddings for semantic similarity.
//!
//! `Embedder` is the seam the Enhanced Matcher scores through. Production uses
//! `CachedEmbedder<OpenAiEmbedder>`; tests plug in deterministic fakes.

pub mod cache;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::ingestion::text::truncate_chars;

pub use cache::EmbeddingCache;

const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";
pub const EMBEDDING_MODEL: &str = "text-embedding-3-small";
/// Inputs are truncated to this many characters before embedding.
const MAX_INPUT_CHARS: usize = 8000;
const EMBEDDING_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("embedding API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("embedding response had no vector")]
    EmptyResponse,
}

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Arc<Vec<f32>>, EmbeddingError>;
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// OpenAI embeddings endpoint client.
pub struct OpenAiEmbedder {
    http: Client,
    api_key: String,
}

impl OpenAiEmbedder {
    pub fn new(http: Client, api_key: String) -> Self {
        Self { http, api_key }
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Arc<Vec<f32>>, EmbeddingError> {
        let input = truncate_chars(text, MAX_INPUT_CHARS);
        let response = self
            .http
            .post(OPENAI_EMBEDDINGS_URL)
            .bearer_auth(&self.api_key)
            .timeout(EMBEDDING_TIMEOUT)
            .json(&EmbeddingRequest {
                model: EMBEDDING_MODEL,
                input: &input,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                message: truncate_chars(&message, 300),
            });
        }

        let body: EmbeddingResponse = response.json().await?;
        body.data
            .into_iter()
            .next()
            .map(|d| Arc::new(d.embedding))
            .ok_or(EmbeddingError::EmptyResponse)
    }
}

/// Consults the shared cache before delegating; successful results are stored.
pub struct CachedEmbedder<E> {
    inner: E,
    cache: Arc<EmbeddingCache>,
}

impl<E: Embedder> CachedEmbedder<E> {
    pub fn new(inner: E, cache: Arc<EmbeddingCache>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl<E: Embedder> Embedder for CachedEmbedder<E> {
    async fn embed(&self, text: &str) -> Result<Arc<Vec<f32>>, EmbeddingError> {
        if let Some(hit) = self.cache.get(text) {
            return Ok(hit);
        }
        let vector = self.inner.embed(text).await?;
        self.cache.insert(text, Arc::clone(&vector));
        debug!(cached = self.cache.len(), "embedding cached");
        Ok(vector)
    }
}

/// Cosine similarity in [-1, 1]; 0 for mismatched lengths or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct Counting {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for Counting {
        async fn embed(&self, text: &str) -> Result<Arc<Vec<f32>>, EmbeddingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(vec![text.len() as f32, 1.0]))
        }
    }

    struct AlwaysFails;

    #[async_trait]
    impl Embedder for AlwaysFails {
        async fn embed(&self, _text: &str) -> Result<Arc<Vec<f32>>, EmbeddingError> {
            Err(EmbeddingError::EmptyResponse)
        }
    }

    #[test]
    fn test_cosine_identical_and_orthogonal() {
        assert!((cosine_similarity(&[1.0, 2.0], &[1.0, 2.0]) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn test_cosine_degenerate_inputs_are_zero() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[tokio::test]
    async fn test_cached_embedder_calls_inner_once_per_text() {
        let cache = Arc::new(EmbeddingCache::new(16, Duration::from_secs(60)));
        let embedder = CachedEmbedder::new(
            Counting {
                calls: AtomicUsize::new(0),
            },
            cache.clone(),
        );

        let first = embedder.embed("backend engineer").await.unwrap();
        let second = embedder.embed("backend engineer").await.unwrap();
        embedder.embed("data analyst").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(embedder.inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let cache = Arc::new(EmbeddingCache::new(16, Duration::from_secs(60)));
        let embedder = CachedEmbedder::new(AlwaysFails, cache.clone());

        assert!(embedder.embed("anything").await.is_err());
        assert_eq!(cache.len(), 0);
    }
}
