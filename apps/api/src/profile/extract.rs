//! Profile Extraction — resume PDF bytes to a normalized `CandidateProfile`.

use std::collections::BTreeSet;

use bytes::Bytes;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::ingestion::text::truncate_chars;
use crate::llm_client::prompts::render;
use crate::llm_client::{LlmClient, Provider};
use crate::models::profile::{CandidateProfile, MAX_SEARCH_TERMS};
use crate::profile::prompts::{PROFILE_EXTRACT_PROMPT_TEMPLATE, PROFILE_EXTRACT_SYSTEM};

pub const EXTRACTION_MODEL: &str = "google/gemini-2.5-flash";
const EXTRACTION_MAX_TOKENS: u32 = 600;
/// Only the head of the resume is sent to the model.
const MAX_RESUME_CHARS: usize = 6000;
const DEFAULT_NAME: &str = "Candidate";

/// The model's reply, before normalization. List fields are loose JSON so a
/// stray number or null inside them does not sink the whole extraction.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ExtractedProfile {
    pub name: Option<String>,
    pub headline: Option<String>,
    pub industry: Option<String>,
    pub skills: Value,
    pub search_terms: Value,
}

/// Deterministic, low-budget OpenRouter client for extraction.
pub fn extraction_client(http: Client, api_key: String) -> LlmClient {
    LlmClient::new(http, Provider::OpenRouter, api_key, EXTRACTION_MODEL)
        .with_temperature(0.0)
        .with_max_tokens(EXTRACTION_MAX_TOKENS)
}

/// Extracts plain text from a PDF on the blocking pool. A parser failure or
/// panic on a malformed file is reported as unprocessable input.
pub async fn extract_pdf_text(pdf: Bytes) -> Result<String, AppError> {
    debug!("extracting text from {} byte PDF", pdf.len());
    let extracted = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf))
        .await
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!("spawn_blocking failed in PDF extraction: {e}"))
        })?;
    extracted.map_err(|e| AppError::UnprocessableEntity(format!("PDF could not be read: {e}")))
}

pub async fn extract_profile(text: &str, llm: &LlmClient) -> Result<CandidateProfile, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::UnprocessableEntity(
            "Could not extract text from PDF".to_string(),
        ));
    }

    let resume_text = truncate_chars(text, MAX_RESUME_CHARS);
    let prompt = render(PROFILE_EXTRACT_PROMPT_TEMPLATE, &[("resume_text", resume_text.as_str())]);
    let extracted: ExtractedProfile = llm
        .call_json(&prompt, PROFILE_EXTRACT_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Profile extraction failed: {e}")))?;

    let profile = normalize_extracted(extracted)?;
    info!(
        skills = profile.skills.len(),
        search_terms = profile.search_terms.len(),
        "profile extracted"
    );
    Ok(profile)
}

/// Applies defaults and cleans lists: skills become lowercase, unique and
/// sorted; search terms keep order and are capped. No skills is an error.
pub fn normalize_extracted(raw: ExtractedProfile) -> Result<CandidateProfile, AppError> {
    let skills: BTreeSet<String> = strings(&raw.skills)
        .map(str::to_lowercase)
        .collect();
    if skills.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "Could not extract any skills from resume. Try a different resume or enter skills manually."
                .to_string(),
        ));
    }

    let search_terms = strings(&raw.search_terms)
        .map(str::to_string)
        .take(MAX_SEARCH_TERMS)
        .collect();

    Ok(CandidateProfile {
        name: non_blank(raw.name).unwrap_or_else(|| DEFAULT_NAME.to_string()),
        headline: non_blank(raw.headline).unwrap_or_default(),
        industry: non_blank(raw.industry).unwrap_or_default(),
        skills: skills.into_iter().collect(),
        search_terms,
        ..Default::default()
    })
}

/// Trimmed, non-blank string items of a JSON array. Anything else yields nothing.
fn strings(value: &Value) -> impl Iterator<Item = &str> {
    value
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
