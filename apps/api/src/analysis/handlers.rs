//! Axum route handlers for the Analysis API.

use std::collections::HashMap;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::analysis::{analysis_client, analyze_job, JobAnalysis};
use crate::errors::AppError;
use crate::models::credentials::Credentials;
use crate::models::job::JobPosting;
use crate::models::profile::CandidateProfile;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeJobRequest {
    pub job: JobPosting,
    pub profile: CandidateProfile,
    #[serde(default)]
    pub api_keys: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeJobResponse {
    pub analysis: JobAnalysis,
}

/// POST /api/v1/jobs/analyze
pub async fn handle_analyze_job(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeJobRequest>,
) -> Result<Json<AnalyzeJobResponse>, AppError> {
    let credentials = Credentials::resolve(&req.api_keys, &state.config);
    let llm = analysis_client(&credentials, state.http.clone(), &state.config)?;
    let profile = req.profile.normalized();
    let analysis = analyze_job(&req.job, &profile, &llm).await?;
    Ok(Json(AnalyzeJobResponse { analysis }))
}
