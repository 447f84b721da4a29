//! Axum route handlers for the Matching API.

use std::collections::HashMap;

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::ingestion::orchestrator::DefaultCatalog;
use crate::matching::{select_matcher, MatchStrategy};
use crate::models::credentials::Credentials;
use crate::models::profile::{CandidateProfile, SearchPreferences};
use crate::pipeline::{run_match_pipeline, MatchResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchJobsRequest {
    pub profile: CandidateProfile,
    #[serde(default)]
    pub preferences: SearchPreferences,
    /// Caller-supplied keys by variable name; override the environment.
    #[serde(default)]
    pub api_keys: HashMap<String, String>,
    #[serde(default)]
    pub strategy: MatchStrategy,
}

/// POST /api/v1/jobs/match
pub async fn handle_match_jobs(
    State(state): State<AppState>,
    Json(req): Json<MatchJobsRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let profile = req.profile.normalized();
    if profile.skills.is_empty() {
        return Err(AppError::Validation(
            "Profile with skills required".to_string(),
        ));
    }

    let credentials = Credentials::resolve(&req.api_keys, &state.config);
    let matcher = select_matcher(
        req.strategy,
        &credentials,
        &state.http,
        &state.embedding_cache,
    )?;
    let catalog = DefaultCatalog::new(
        state.http.clone(),
        state.config.clone(),
        credentials,
        state.limiters.clone(),
    );

    let response =
        run_match_pipeline(&catalog, matcher.as_ref(), &profile, &req.preferences).await?;
    Ok(Json(response))
}
