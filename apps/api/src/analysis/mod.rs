//! Job Analysis — an on-demand LLM narrative for one job and one profile.
//!
//! Not part of ranking: the client calls it lazily for the matches a user opens.

pub mod handlers;
pub mod prompts;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::config::Config;
use crate::errors::AppError;
use crate::llm_client::prompts::render;
use crate::llm_client::{LlmClient, Provider};
use crate::models::credentials::{Credentials, OPENAI_API_KEY, OPENROUTER_API_KEY};
use crate::models::job::JobPosting;
use crate::models::profile::CandidateProfile;
use prompts::{ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_SYSTEM};

pub const OPENROUTER_ANALYSIS_MODEL: &str = "openai/gpt-4o";
pub const OPENAI_ANALYSIS_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobAnalysis {
    /// Always within 0–100.
    pub fit_score: u8,
    pub strong_signals: Vec<String>,
    pub gaps: Vec<String>,
    pub salary_estimate: String,
    pub verdict: String,
}

/// The model's reply before clamping. `fit_score` may arrive as a number or
/// a numeric string.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAnalysis {
    fit_score: Value,
    strong_signals: Vec<String>,
    gaps: Vec<String>,
    salary_estimate: Option<String>,
    verdict: Option<String>,
}

impl From<RawAnalysis> for JobAnalysis {
    fn from(raw: RawAnalysis) -> Self {
        let score = match &raw.fit_score {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .unwrap_or(0.0);

        JobAnalysis {
            fit_score: score.clamp(0.0, 100.0).round() as u8,
            strong_signals: raw.strong_signals,
            gaps: raw.gaps,
            salary_estimate: raw.salary_estimate.unwrap_or_default(),
            verdict: raw.verdict.unwrap_or_default(),
        }
    }
}

/// OpenRouter when its key resolves, OpenAI otherwise. Models come from config.
pub fn analysis_client(
    credentials: &Credentials,
    http: Client,
    config: &Config,
) -> Result<LlmClient, AppError> {
    if let Some(key) = credentials.openrouter_api_key.clone() {
        return Ok(LlmClient::new(
            http,
            Provider::OpenRouter,
            key,
            &config.openrouter_analysis_model,
        ));
    }
    if let Some(key) = credentials.openai_api_key.clone() {
        return Ok(LlmClient::new(
            http,
            Provider::OpenAi,
            key,
            &config.openai_analysis_model,
        ));
    }
    Err(AppError::MissingCredential(format!(
        "{OPENROUTER_API_KEY} or {OPENAI_API_KEY}"
    )))
}

pub fn build_prompt(job: &JobPosting, profile: &CandidateProfile) -> String {
    let experience = profile
        .experience_years
        .map(|y| y.to_string())
        .unwrap_or_else(|| "Not specified".to_string());
    let skills = profile.skills.join(", ");
    render(
        ANALYSIS_PROMPT_TEMPLATE,
        &[
            ("headline", profile.headline.as_str()),
            ("experience_years", experience.as_str()),
            ("skills", skills.as_str()),
            ("title", job.title.as_str()),
            ("company", job.company.as_str()),
            ("location", job.location.as_str()),
            ("summary", job.summary.as_str()),
        ],
    )
}

pub async fn analyze_job(
    job: &JobPosting,
    profile: &CandidateProfile,
    llm: &LlmClient,
) -> Result<JobAnalysis, AppError> {
    info!(
        provider = llm.provider().label(),
        model = llm.model(),
        "analyzing fit for job: {}",
        job.title
    );
    let raw: RawAnalysis = llm
        .call_json(&build_prompt(job, profile), ANALYSIS_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Job analysis failed: {e}")))?;
    Ok(raw.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(raw: &str) -> JobAnalysis {
        serde_json::from_str::<RawAnalysis>(raw).unwrap().into()
    }

    #[test]
    fn test_fit_score_is_clamped() {
        assert_eq!(analysis(r#"{"fit_score": 140}"#).fit_score, 100);
        assert_eq!(analysis(r#"{"fit_score": -5}"#).fit_score, 0);
        assert_eq!(analysis(r#"{"fit_score": 72.6}"#).fit_score, 73);
    }

    #[test]
    fn test_fit_score_accepts_numeric_string() {
        assert_eq!(analysis(r#"{"fit_score": " 64 "}"#).fit_score, 64);
        assert_eq!(analysis(r#"{"fit_score": "high"}"#).fit_score, 0);
    }

    #[test]
    fn test_missing_fields_default() {
        let a = analysis(r#"{"fit_score": 55, "gaps": ["Kafka"]}"#);
        assert_eq!(a.gaps, vec!["Kafka"]);
        assert!(a.strong_signals.is_empty());
        assert_eq!(a.verdict, "");
    }

    #[test]
    fn test_openrouter_preferred_over_openai() {
        let creds = Credentials {
            openrouter_api_key: Some("or".to_string()),
            openai_api_key: Some("oa".to_string()),
            ..Default::default()
        };
        let llm = analysis_client(&creds, Client::new(), &Config::default()).unwrap();
        assert_eq!(llm.provider(), Provider::OpenRouter);
        assert_eq!(llm.model(), OPENROUTER_ANALYSIS_MODEL);
    }

    #[test]
    fn test_analysis_model_is_configurable() {
        let creds = Credentials {
            openrouter_api_key: Some("or".to_string()),
            ..Default::default()
        };
        let config = Config {
            openrouter_analysis_model: "meta-llama/llama-3.1-70b-instruct".to_string(),
            ..Config::default()
        };
        let llm = analysis_client(&creds, Client::new(), &config).unwrap();
        assert_eq!(llm.model(), "meta-llama/llama-3.1-70b-instruct");
    }

    #[test]
    fn test_openai_fallback_and_missing_key() {
        let creds = Credentials {
            openai_api_key: Some("oa".to_string()),
            ..Default::default()
        };
        let llm = analysis_client(&creds, Client::new(), &Config::default()).unwrap();
        assert_eq!(llm.provider(), Provider::OpenAi);
        assert_eq!(llm.model(), OPENAI_ANALYSIS_MODEL);

        let err = analysis_client(&Credentials::default(), Client::new(), &Config::default()).err();
        assert!(matches!(err, Some(AppError::MissingCredential(_))));
    }

    #[test]
    fn test_prompt_includes_job_and_profile() {
        let job = JobPosting {
            title: "Backend Engineer".to_string(),
            company: "Meesho".to_string(),
            ..Default::default()
        };
        let profile = CandidateProfile {
            skills: vec!["rust".to_string(), "sql".to_string()],
            ..Default::default()
        };
        let prompt = build_prompt(&job, &profile);
        assert!(prompt.contains("Title: Backend Engineer"));
        assert!(prompt.contains("Skills: rust, sql"));
        assert!(prompt.contains("Experience years: Not specified"));
    }
}
