use std::time::Duration;

use anyhow::{Context, Result};

use crate::analysis::{OPENAI_ANALYSIS_MODEL, OPENROUTER_ANALYSIS_MODEL};

/// Application configuration loaded from environment variables.
/// Every external key is optional: sources and matchers that need a missing
/// key are skipped at request time.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub serp_api_key: Option<String>,
    pub jsearch_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub openrouter_api_key: Option<String>,
    pub feed_user_agent: String,
    pub network_timeout: Duration,
    pub board_timeout: Duration,
    pub paid_timeout: Duration,
    pub listing_timeout: Duration,
    pub serp_pacing: Duration,
    pub jsearch_pacing: Duration,
    pub embedding_cache_capacity: usize,
    pub embedding_cache_ttl: Duration,
    pub openrouter_analysis_model: String,
    pub openai_analysis_model: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            serp_api_key: optional_env("SERP_API_KEY"),
            jsearch_key: optional_env("JSEARCH_KEY"),
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openrouter_api_key: optional_env("OPENROUTER_API_KEY"),
            feed_user_agent: std::env::var("FEED_USER_AGENT")
                .unwrap_or_else(|_| "JobBot/1.0".to_string()),
            network_timeout: Duration::from_secs(parse_env("NETWORK_TIMEOUT_SECS", 25)?),
            board_timeout: Duration::from_secs(parse_env("BOARD_TIMEOUT_SECS", 10)?),
            paid_timeout: Duration::from_secs(parse_env("PAID_TIMEOUT_SECS", 15)?),
            listing_timeout: Duration::from_secs(parse_env("LISTING_TIMEOUT_SECS", 8)?),
            serp_pacing: Duration::from_millis(parse_env("SERP_PACING_MS", 1100)?),
            jsearch_pacing: Duration::from_millis(parse_env("JSEARCH_PACING_MS", 1200)?),
            embedding_cache_capacity: parse_env("EMBEDDING_CACHE_CAPACITY", 2048)?,
            embedding_cache_ttl: Duration::from_secs(parse_env(
                "EMBEDDING_CACHE_TTL_SECS",
                86_400,
            )?),
            openrouter_analysis_model: optional_env("OPENROUTER_ANALYSIS_MODEL")
                .unwrap_or_else(|| OPENROUTER_ANALYSIS_MODEL.to_string()),
            openai_analysis_model: optional_env("OPENAI_ANALYSIS_MODEL")
                .unwrap_or_else(|| OPENAI_ANALYSIS_MODEL.to_string()),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            serp_api_key: None,
            jsearch_key: None,
            openai_api_key: None,
            openrouter_api_key: None,
            feed_user_agent: "JobBot/1.0".to_string(),
            network_timeout: Duration::from_secs(25),
            board_timeout: Duration::from_secs(10),
            paid_timeout: Duration::from_secs(15),
            listing_timeout: Duration::from_secs(8),
            serp_pacing: Duration::from_millis(1100),
            jsearch_pacing: Duration::from_millis(1200),
            embedding_cache_capacity: 2048,
            embedding_cache_ttl: Duration::from_secs(86_400),
            openrouter_analysis_model: OPENROUTER_ANALYSIS_MODEL.to_string(),
            openai_analysis_model: OPENAI_ANALYSIS_MODEL.to_string(),
        }
    }
}

/// Reads a variable, treating unset and blank values alike.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}
