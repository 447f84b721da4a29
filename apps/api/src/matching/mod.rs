//! Scoring Engine — pluggable matchers behind one trait.
//!
//! `HeuristicMatcher` needs nothing external; `EnhancedMatcher` needs an
//! embedding key. `select_matcher` turns a requested strategy plus the
//! resolved credentials into a concrete matcher.

pub mod enhanced;
pub mod experience;
pub mod handlers;
pub mod heuristic;
pub mod ranking;
pub mod signals;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use crate::embeddings::EmbeddingCache;
use crate::errors::AppError;
use crate::models::credentials::Credentials;
use crate::models::job::{JobPosting, ScoredJob};
use crate::models::profile::CandidateProfile;
use crate::progress::ProgressSink;

use enhanced::EnhancedMatcher;
use heuristic::HeuristicMatcher;

/// Carried by handlers as `Box<dyn JobMatcher>`; swap strategies without
/// touching the pipeline.
#[async_trait]
pub trait JobMatcher: Send + Sync {
    fn name(&self) -> &'static str;

    /// Filters, scores, ranks and caps `jobs`. Never fails: per-job problems
    /// degrade that job's score instead.
    async fn match_jobs(
        &self,
        jobs: Vec<JobPosting>,
        profile: &CandidateProfile,
        sink: &dyn ProgressSink,
    ) -> Vec<ScoredJob>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// Enhanced when an embedding key resolves, heuristic otherwise.
    #[default]
    Auto,
    Heuristic,
    Enhanced,
}

pub fn select_matcher(
    strategy: MatchStrategy,
    credentials: &Credentials,
    http: &Client,
    cache: &Arc<EmbeddingCache>,
) -> Result<Box<dyn JobMatcher>, AppError> {
    let matcher: Box<dyn JobMatcher> = match strategy {
        MatchStrategy::Heuristic => Box::new(HeuristicMatcher),
        MatchStrategy::Enhanced => Box::new(EnhancedMatcher::from_credentials(
            credentials,
            http.clone(),
            Arc::clone(cache),
        )?),
        MatchStrategy::Auto => {
            match EnhancedMatcher::from_credentials(credentials, http.clone(), Arc::clone(cache)) {
                Ok(enhanced) => Box::new(enhanced),
                Err(_) => {
                    info!("no embedding key, falling back to heuristic matching");
                    Box::new(HeuristicMatcher)
                }
            }
        }
    };
    Ok(matcher)
}
