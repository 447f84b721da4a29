//! Candidate experience estimation.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::profile::CandidateProfile;

/// Experience buckets offered by the profile form, hyphen and en-dash spellings.
const BUCKETS: &[(&str, u32)] = &[
    ("0-1 years", 0),
    ("0–1 years", 0),
    ("1-3 years", 2),
    ("1–3 years", 2),
    ("3-6 years", 4),
    ("3–6 years", 4),
    ("6-10 years", 7),
    ("6–10 years", 7),
    ("10+ years", 12),
];

/// Headline keyword groups, checked in order.
const HEADLINE_TIERS: &[(&[&str], u32)] = &[
    (&["intern", "trainee", "fresher"], 0),
    (&["junior", "associate"], 1),
    (&["senior", "lead", "manager"], 5),
    (&["director", "head of", "vp"], 10),
];

const DEFAULT_YEARS: u32 = 3;

static YEARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\+?\s*(?:years?|yrs?)").expect("valid regex"));

/// Explicit `experience_years` when present, otherwise an estimate.
pub fn candidate_years(profile: &CandidateProfile) -> u32 {
    profile
        .experience_years
        .unwrap_or_else(|| estimate_years(profile))
}

/// Estimates years of experience from the bucket string, then the headline.
pub fn estimate_years(profile: &CandidateProfile) -> u32 {
    if let Some(bucket) = profile.experience.as_deref().map(str::trim) {
        if let Some((_, years)) = BUCKETS.iter().find(|(label, _)| *label == bucket) {
            return *years;
        }
    }

    let headline = profile.headline.to_lowercase();
    if let Some(years) = YEARS_RE
        .captures(&headline)
        .and_then(|caps| caps[1].parse().ok())
    {
        return years;
    }

    HEADLINE_TIERS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| headline.contains(k)))
        .map(|(_, years)| *years)
        .unwrap_or(DEFAULT_YEARS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with(headline: &str, bucket: Option<&str>) -> CandidateProfile {
        CandidateProfile {
            headline: headline.to_string(),
            experience: bucket.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_bucket_takes_priority() {
        assert_eq!(estimate_years(&with("Senior Engineer", Some("1-3 years"))), 2);
        assert_eq!(estimate_years(&with("", Some("6–10 years"))), 7);
        assert_eq!(estimate_years(&with("", Some(" 10+ years "))), 12);
    }

    #[test]
    fn test_years_in_headline() {
        assert_eq!(estimate_years(&with("Backend engineer with 6+ years", None)), 6);
        assert_eq!(estimate_years(&with("PM, 4 yrs fintech", None)), 4);
    }

    #[test]
    fn test_headline_keywords() {
        assert_eq!(estimate_years(&with("Software Engineering Intern", None)), 0);
        assert_eq!(estimate_years(&with("Junior Analyst", None)), 1);
        assert_eq!(estimate_years(&with("Operations Manager", None)), 5);
        assert_eq!(estimate_years(&with("Director of Engineering", None)), 10);
        assert_eq!(estimate_years(&with("Backend Engineer", None)), 3);
    }

    #[test]
    fn test_unknown_bucket_falls_through() {
        assert_eq!(estimate_years(&with("Junior Analyst", Some("a while"))), 1);
    }

    #[test]
    fn test_explicit_years_win() {
        let profile = CandidateProfile {
            experience_years: Some(9),
            headline: "Intern".to_string(),
            ..Default::default()
        };
        assert_eq!(candidate_years(&profile), 9);
    }
}
