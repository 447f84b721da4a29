//! Match pipeline — ingestion, then scoring, with progress captured for the
//! response.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::ingestion::orchestrator::{fetch_all_jobs, SourceCatalog};
use crate::matching::JobMatcher;
use crate::models::job::ScoredJob;
use crate::models::profile::{CandidateProfile, SearchPreferences};
use crate::progress::ProgressLog;

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub matches: Vec<ScoredJob>,
    /// Unique postings fetched, before scoring.
    pub total: usize,
    pub sources: BTreeMap<String, usize>,
    pub logs: Vec<String>,
}

pub async fn run_match_pipeline(
    catalog: &dyn SourceCatalog,
    matcher: &dyn JobMatcher,
    profile: &CandidateProfile,
    preferences: &SearchPreferences,
) -> Result<MatchResponse, AppError> {
    let run_id = Uuid::new_v4();
    let span = info_span!("match_run", %run_id, matcher = matcher.name());

    async move {
        let log = ProgressLog::new();
        let report = fetch_all_jobs(catalog, profile, preferences, &log).await?;
        if !report.failed_sources.is_empty() {
            info!(failed = ?report.failed_sources, "some sources returned nothing");
        }
        let total = report.jobs.len();
        let matches = matcher.match_jobs(report.jobs, profile, &log).await;
        info!(
            total,
            matched = matches.len(),
            queries = report.queries.len(),
            location = report.location.as_deref().unwrap_or("remote"),
            "match run complete"
        );

        Ok::<_, AppError>(MatchResponse {
            matches,
            total,
            sources: report.sources,
            logs: log.into_messages(),
        })
    }
    .instrument(span)
    .await
}
