//! Query Builder — derives search queries and a location filter from a profile.

use std::collections::HashSet;

use serde::Serialize;

use crate::models::profile::{CandidateProfile, SearchPreferences, MAX_SEARCH_TERMS};

/// Headline and industry are only appended while the list is shorter than this.
const SOFT_QUERY_CAP: usize = 8;
/// Hard ceiling on the number of queries.
const MAX_QUERIES: usize = 10;
/// Number of leading skills considered for "{skill} specialist" queries.
const SKILL_QUERY_CANDIDATES: usize = 2;
const MAX_SKILL_QUERY_WORDS: usize = 3;

/// Location values that mean "no geographic filter".
const REMOTE_LOCATIONS: &[&str] = &["remote only", "remote", "global"];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchPlan {
    pub queries: Vec<String>,
    /// `None` when the search is remote-first.
    pub location: Option<String>,
}

impl SearchPlan {
    pub fn remote_preferred(&self, preferences: &SearchPreferences) -> bool {
        preferences.remote_only || self.location.is_none()
    }
}

/// Builds the bounded, case-insensitively deduplicated query list.
pub fn build_queries(profile: &CandidateProfile, preferences: &SearchPreferences) -> SearchPlan {
    let headline = profile.headline.trim();
    let industry = profile.industry.trim();

    let mut queries: Vec<String> = profile
        .search_terms
        .iter()
        .take(MAX_SEARCH_TERMS)
        .cloned()
        .collect();

    if !headline.is_empty() && queries.len() < SOFT_QUERY_CAP {
        queries.push(headline.to_string());
    }
    if !industry.is_empty() && queries.len() < SOFT_QUERY_CAP {
        queries.push(format!("{industry} jobs"));
    }
    for skill in profile.skills.iter().take(SKILL_QUERY_CANDIDATES) {
        if queries.len() < MAX_QUERIES && skill.split(' ').count() <= MAX_SKILL_QUERY_WORDS {
            queries.push(format!("{skill} specialist"));
        }
    }

    let mut seen = HashSet::new();
    let queries = queries
        .into_iter()
        .filter(|q| seen.insert(q.trim().to_lowercase()))
        .take(MAX_QUERIES)
        .collect();

    SearchPlan {
        queries,
        location: resolve_location(profile, preferences),
    }
}

/// Preference location wins over the profile country. Remote-only searches
/// and the remote/global sentinels resolve to no location.
fn resolve_location(profile: &CandidateProfile, preferences: &SearchPreferences) -> Option<String> {
    let preferred = if preferences.location.trim().is_empty() {
        profile.country.as_deref().unwrap_or("").trim()
    } else {
        preferences.location.trim()
    };

    let is_remote =
        preferences.remote_only || REMOTE_LOCATIONS.contains(&preferred.to_lowercase().as_str());

    if is_remote || preferred.is_empty() {
        None
    } else {
        Some(preferred.to_string())
    }
}
