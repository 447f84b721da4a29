//! Enhanced Matcher — five-signal scoring with embedding similarity.
//!
//! Signals (summed, then clamped to 0–100):
//!   semantic    round(clamp(cos × 100) × 0.3)     max 30
//!   skills      10 exact / 5 partial, capped        max 30
//!   title       round(Jaccard% × 0.2)              max 20
//!   experience  10 − mismatch penalty               may go negative
//!   recency     15 / 10 / 5 / 0 by age              not capped per signal

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use tracing::debug;

use super::experience::candidate_years;
use super::ranking::rank;
use super::signals::{
    experience_penalty, is_disqualified, recency_points, skill_match, title_similarity,
    EXPERIENCE_BASE,
};
use super::JobMatcher;
use crate::embeddings::{cosine_similarity, CachedEmbedder, Embedder, EmbeddingCache, OpenAiEmbedder};
use crate::errors::AppError;
use crate::models::credentials::{Credentials, OPENAI_API_KEY};
use crate::models::job::{JobPosting, ScoreBreakdown, ScoredJob};
use crate::models::profile::CandidateProfile;
use crate::progress::ProgressSink;

pub const ENHANCED_THRESHOLD: u8 = 50;
const SEMANTIC_WEIGHT: f64 = 0.3;
const SKILLS_CAP: i32 = 30;
const TITLE_WEIGHT: f64 = 0.2;
/// Texts shorter than this are not worth an embedding call.
const MIN_EMBED_CHARS: usize = 3;
const PROGRESS_EVERY: usize = 10;

pub struct EnhancedMatcher {
    embedder: Arc<dyn Embedder>,
}

impl EnhancedMatcher {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    /// Production wiring: OpenAI embeddings behind the shared cache.
    /// Fails when no embedding key resolves.
    pub fn from_credentials(
        credentials: &Credentials,
        http: Client,
        cache: Arc<EmbeddingCache>,
    ) -> Result<Self, AppError> {
        let key = credentials
            .openai_api_key
            .clone()
            .ok_or_else(|| AppError::MissingCredential(OPENAI_API_KEY.to_string()))?;
        let embedder = CachedEmbedder::new(OpenAiEmbedder::new(http, key), cache);
        Ok(Self::new(Arc::new(embedder)))
    }

    /// `None` for too-short text or a failed embedding call.
    async fn embed(&self, text: &str) -> Option<Arc<Vec<f32>>> {
        if text.trim().chars().count() < MIN_EMBED_CHARS {
            return None;
        }
        match self.embedder.embed(text).await {
            Ok(vector) => Some(vector),
            Err(e) => {
                debug!("embedding failed, semantic signal is 0: {e}");
                None
            }
        }
    }

    async fn semantic_points(&self, profile_vec: Option<&[f32]>, job: &JobPosting) -> i32 {
        let Some(profile_vec) = profile_vec else {
            return 0;
        };
        let Some(job_vec) = self.embed(&job.match_text()).await else {
            return 0;
        };
        let pct = (f64::from(cosine_similarity(profile_vec, &job_vec)) * 100.0).clamp(0.0, 100.0);
        (pct * SEMANTIC_WEIGHT).round() as i32
    }

    async fn score(
        &self,
        job: &JobPosting,
        profile: &CandidateProfile,
        profile_vec: Option<&[f32]>,
        years: u32,
        now: DateTime<Utc>,
    ) -> ScoreBreakdown {
        let skills = skill_match(&job.match_text(), &profile.skills);
        ScoreBreakdown {
            semantic: self.semantic_points(profile_vec, job).await,
            skills: skills.points.min(SKILLS_CAP),
            title: (title_similarity(&profile.headline, &job.title) * TITLE_WEIGHT).round() as i32,
            experience: EXPERIENCE_BASE - experience_penalty(years, &job.title),
            recency: recency_points(&job.date_posted, now),
            matched_skills: skills.matched,
        }
    }
}

#[async_trait]
impl JobMatcher for EnhancedMatcher {
    fn name(&self) -> &'static str {
        "enhanced"
    }

    async fn match_jobs(
        &self,
        jobs: Vec<JobPosting>,
        profile: &CandidateProfile,
        sink: &dyn ProgressSink,
    ) -> Vec<ScoredJob> {
        let years = candidate_years(profile);
        let now = Utc::now();
        sink.report(&format!("Starting enhanced matching for {} jobs...", jobs.len()));

        let jobs: Vec<JobPosting> = jobs.into_iter().filter(|j| !is_disqualified(j)).collect();
        sink.report(&format!("After negative filter: {} jobs", jobs.len()));

        let profile_vec = self.embed(&profile.embedding_text()).await;
        let total = jobs.len();
        let mut candidates = Vec::new();

        for (i, job) in jobs.into_iter().enumerate() {
            let breakdown = self
                .score(&job, profile, profile_vec.as_deref().map(Vec::as_slice), years, now)
                .await;
            let scored = ScoredJob::new(job, breakdown);
            if scored.match_score >= ENHANCED_THRESHOLD {
                candidates.push(scored);
            }
            if (i + 1) % PROGRESS_EVERY == 0 {
                sink.report(&format!("Scored {}/{total} jobs...", i + 1));
            }
        }
        sink.report(&format!(
            "After scoring (threshold {ENHANCED_THRESHOLD}): {} candidates",
            candidates.len()
        ));

        let matches = rank(candidates);
        sink.report(&format!("Final matches: {}", matches.len()));
        matches
    }
}
