//! Post-scoring steps shared by every matcher: order, diversify, cap, strip.

use std::collections::HashMap;

use crate::models::job::ScoredJob;

pub const MAX_MATCHES: usize = 25;
pub const MAX_PER_COMPANY: usize = 3;

/// Sorts by score (stable, so ties keep ingestion order), applies the greedy
/// per-company cap, truncates to `MAX_MATCHES` and drops score breakdowns.
pub fn rank(mut scored: Vec<ScoredJob>) -> Vec<ScoredJob> {
    scored.sort_by(|a, b| b.match_score.cmp(&a.match_score));

    let mut per_company: HashMap<String, usize> = HashMap::new();
    scored
        .into_iter()
        .filter(|job| {
            let count = per_company.entry(job.company().to_string()).or_insert(0);
            if *count < MAX_PER_COMPANY {
                *count += 1;
                true
            } else {
                false
            }
        })
        .take(MAX_MATCHES)
        .map(|mut job| {
            job.breakdown = None;
            job
        })
        .collect()
}
