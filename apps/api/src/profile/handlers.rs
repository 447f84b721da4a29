//! Axum route handlers for the Profile API.

use std::collections::HashMap;

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::credentials::{Credentials, OPENROUTER_API_KEY};
use crate::models::profile::CandidateProfile;
use crate::profile::extract::{extract_pdf_text, extract_profile, extraction_client};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ParseProfileResponse {
    pub profile: CandidateProfile,
}

/// POST /api/v1/profile/parse
/// Multipart form: `file` (PDF), optional `apiKey` (OpenRouter).
pub async fn handle_parse_profile(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ParseProfileResponse>, AppError> {
    let mut file: Option<Bytes> = None;
    let mut overrides = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read file: {e}")))?;
                file = Some(data);
            }
            Some("apiKey") => {
                let key = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read apiKey: {e}")))?;
                overrides.insert(OPENROUTER_API_KEY.to_string(), key);
            }
            _ => {}
        }
    }

    let file = file
        .filter(|f| !f.is_empty())
        .ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;
    let api_key = Credentials::resolve(&overrides, &state.config)
        .openrouter_api_key
        .ok_or_else(|| AppError::MissingCredential(OPENROUTER_API_KEY.to_string()))?;

    info!("parsing resume upload ({} bytes)", file.len());
    let text = extract_pdf_text(file).await?;
    let llm = extraction_client(state.http.clone(), api_key);
    let profile = extract_profile(&text, &llm).await?;
    Ok(Json(ParseProfileResponse { profile }))
}
