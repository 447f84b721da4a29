//! Heuristic Matcher — keyword and overlap scoring with no external calls.

use async_trait::async_trait;

use super::experience::candidate_years;
use super::ranking::rank;
use super::signals::{experience_penalty, is_disqualified, skill_match, title_similarity, EXPERIENCE_BASE};
use super::JobMatcher;
use crate::models::job::{JobPosting, ScoreBreakdown, ScoredJob};
use crate::models::profile::CandidateProfile;
use crate::progress::ProgressSink;

pub const HEURISTIC_THRESHOLD: u8 = 30;
const SKILLS_CAP: i32 = 50;
const TITLE_WEIGHT: f64 = 0.4;

/// Skills (max 50) + title overlap (max 40) + experience alignment (max 10).
pub struct HeuristicMatcher;

impl HeuristicMatcher {
    fn score(&self, job: &JobPosting, profile: &CandidateProfile, years: u32) -> ScoreBreakdown {
        let skills = skill_match(&job.match_text(), &profile.skills);
        ScoreBreakdown {
            semantic: 0,
            skills: skills.points.min(SKILLS_CAP),
            title: (title_similarity(&profile.headline, &job.title) * TITLE_WEIGHT).round() as i32,
            experience: EXPERIENCE_BASE - experience_penalty(years, &job.title),
            recency: 0,
            matched_skills: skills.matched,
        }
    }
}

#[async_trait]
impl JobMatcher for HeuristicMatcher {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn match_jobs(
        &self,
        jobs: Vec<JobPosting>,
        profile: &CandidateProfile,
        sink: &dyn ProgressSink,
    ) -> Vec<ScoredJob> {
        let years = candidate_years(profile);
        sink.report(&format!("Starting heuristic matching for {} jobs...", jobs.len()));

        let candidates: Vec<ScoredJob> = jobs
            .into_iter()
            .filter(|job| !is_disqualified(job))
            .map(|job| {
                let breakdown = self.score(&job, profile, years);
                ScoredJob::new(job, breakdown)
            })
            .filter(|scored| scored.match_score >= HEURISTIC_THRESHOLD)
            .collect();
        sink.report(&format!(
            "After scoring (threshold {HEURISTIC_THRESHOLD}): {} candidates",
            candidates.len()
        ));

        let matches = rank(candidates);
        sink.report(&format!("Final matches: {}", matches.len()));
        matches
    }
}
