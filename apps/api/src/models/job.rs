use serde::{Deserialize, Serialize};

/// The canonical normalized job record every source adapter produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    /// Plain text, markup stripped, length-capped.
    #[serde(default)]
    pub summary: String,
    /// Dedup key. Empty means "no URL" and is never deduplicated.
    #[serde(default)]
    pub apply_url: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub location: String,
    /// ISO 8601, RFC 2822 or a source-native string. May be empty.
    #[serde(default)]
    pub date_posted: String,
    #[serde(default)]
    pub location_tags: Vec<String>,
}

impl JobPosting {
    /// Text used for keyword matching and the job side of semantic similarity.
    pub fn match_text(&self) -> String {
        format!("{} {}", self.title, self.summary)
    }
}

/// Per-signal component scores. Internal only; stripped before a match list
/// leaves the scoring engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub semantic: i32,
    pub skills: i32,
    pub title: i32,
    pub experience: i32,
    pub recency: i32,
    pub matched_skills: Vec<String>,
}

impl ScoreBreakdown {
    /// Sum of all components clamped to the 0–100 match score range.
    pub fn total(&self) -> u8 {
        let sum = self.semantic + self.skills + self.title + self.experience + self.recency;
        sum.clamp(0, 100) as u8
    }
}

/// A posting with its match score attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredJob {
    #[serde(flatten)]
    pub posting: JobPosting,
    pub match_score: u8,
    #[serde(skip)]
    pub breakdown: Option<ScoreBreakdown>,
}

impl ScoredJob {
    pub fn new(posting: JobPosting, breakdown: ScoreBreakdown) -> Self {
        Self {
            posting,
            match_score: breakdown.total(),
            breakdown: Some(breakdown),
        }
    }

    pub fn company(&self) -> &str {
        if self.posting.company.is_empty() {
            "Unknown"
        } else {
            &self.posting.company
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakdown_total_clamps_negative_experience() {
        let breakdown = ScoreBreakdown {
            semantic: 20,
            skills: 30,
            title: 10,
            experience: -90,
            recency: 15,
            matched_skills: vec![],
        };
        assert_eq!(breakdown.total(), 0);
    }

    #[test]
    fn test_breakdown_total_clamps_above_hundred() {
        let breakdown = ScoreBreakdown {
            semantic: 30,
            skills: 30,
            title: 20,
            experience: 10,
            recency: 15,
            matched_skills: vec![],
        };
        assert_eq!(breakdown.total(), 100);
    }

    #[test]
    fn test_scored_job_serializes_flat_without_breakdown() {
        let posting = JobPosting {
            title: "Backend Engineer".to_string(),
            company: "Meesho".to_string(),
            apply_url: "https://jobs.example/1".to_string(),
            ..Default::default()
        };
        let scored = ScoredJob::new(
            posting,
            ScoreBreakdown {
                skills: 30,
                experience: 10,
                ..Default::default()
            },
        );

        let value = serde_json::to_value(&scored).unwrap();
        assert_eq!(value["title"], "Backend Engineer");
        assert_eq!(value["match_score"], 40);
        assert!(value.get("breakdown").is_none());
    }
}
