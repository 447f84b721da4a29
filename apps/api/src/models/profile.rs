use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

/// Maximum number of explicit search terms carried on a profile.
pub const MAX_SEARCH_TERMS: usize = 5;

/// Structured candidate profile, produced by resume extraction or user input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(default)]
    pub name: String,
    /// Current or target job title.
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub search_terms: Vec<String>,
    /// Whole years; fractional input is floored and negatives count as zero.
    #[serde(default, deserialize_with = "whole_years")]
    pub experience_years: Option<u32>,
    /// Experience bucket as picked in the UI, e.g. "3-6 years".
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl CandidateProfile {
    /// Lowercases, trims and deduplicates skills (first occurrence wins) and
    /// drops blank search terms beyond the cap.
    pub fn normalized(mut self) -> Self {
        let mut seen = HashSet::new();
        self.skills = self
            .skills
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty() && seen.insert(s.clone()))
            .collect();

        self.search_terms = self
            .search_terms
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .take(MAX_SEARCH_TERMS)
            .collect();

        self.headline = self.headline.trim().to_string();
        self.industry = self.industry.trim().to_string();
        self
    }

    /// Text used for the profile side of semantic similarity.
    pub fn embedding_text(&self) -> String {
        format!("{} {}", self.headline, self.skills.join(" "))
    }
}

fn whole_years<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let years = Option::<f64>::deserialize(deserializer)?;
    Ok(years.map(|y| y.max(0.0).floor() as u32))
}

/// Location preferences chosen by the user for one search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPreferences {
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub remote_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fractional_experience_years_are_floored() {
        let profile: CandidateProfile =
            serde_json::from_str(r#"{"skills": ["rust"], "experience_years": 3.5}"#).unwrap();
        assert_eq!(profile.experience_years, Some(3));

        let profile: CandidateProfile =
            serde_json::from_str(r#"{"skills": ["rust"], "experience_years": -2}"#).unwrap();
        assert_eq!(profile.experience_years, Some(0));

        let profile: CandidateProfile = serde_json::from_str(r#"{"skills": ["rust"]}"#).unwrap();
        assert_eq!(profile.experience_years, None);
    }

    #[test]
    fn test_normalized_dedups_skills_case_insensitively() {
        let profile = CandidateProfile {
            skills: vec![
                "Rust".to_string(),
                " rust ".to_string(),
                "Payment Gateway".to_string(),
                "".to_string(),
            ],
            ..Default::default()
        }
        .normalized();

        assert_eq!(profile.skills, vec!["rust", "payment gateway"]);
    }

    #[test]
    fn test_normalized_caps_search_terms() {
        let profile = CandidateProfile {
            search_terms: (0..8).map(|i| format!("term {i}")).collect(),
            ..Default::default()
        }
        .normalized();

        assert_eq!(profile.search_terms.len(), MAX_SEARCH_TERMS);
        assert_eq!(profile.search_terms[0], "term 0");
    }

    #[test]
    fn test_preferences_use_camel_case_on_the_wire() {
        let prefs: SearchPreferences =
            serde_json::from_str(r#"{"location": "Pune", "remoteOnly": true}"#).unwrap();
        assert_eq!(prefs.location, "Pune");
        assert!(prefs.remote_only);
    }
}
