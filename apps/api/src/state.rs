use std::sync::Arc;

use reqwest::Client;

use crate::config::Config;
use crate::embeddings::EmbeddingCache;
use crate::ingestion::rate_limit::PaidLimiters;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// One connection pool for every outbound call: sources, embeddings, LLMs.
    pub http: Client,
    pub config: Config,
    /// Process-wide so repeated texts across requests skip the embedding call.
    pub embedding_cache: Arc<EmbeddingCache>,
    /// Paid-search pacing shared by all concurrent requests.
    pub limiters: PaidLimiters,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http = Client::builder().build()?;
        let embedding_cache = Arc::new(EmbeddingCache::new(
            config.embedding_cache_capacity,
            config.embedding_cache_ttl,
        ));
        let limiters = PaidLimiters::from_config(&config);
        Ok(Self {
            http,
            config,
            embedding_cache,
            limiters,
        })
    }
}
