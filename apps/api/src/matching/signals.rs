//! Individual scoring signals shared by both matchers.
//!
//! Every function here is pure. Scores are plain integers or percentages; the
//! matchers decide how to weight them.

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

use crate::models::job::JobPosting;

// ────────────────────────────────────────────────────────────────────────────
// Negative filter
// ────────────────────────────────────────────────────────────────────────────

/// Postings whose title or summary contains any of these are dropped outright.
const NEGATIVE_KEYWORDS: &[&str] = &[
    // executive
    "ceo",
    "cto",
    "coo",
    "cfo",
    "chief executive officer",
    "chief technology officer",
    "chief operating officer",
    "chief financial officer",
    "founder",
    "co-founder",
    "vp of",
    "vice president",
    // unrelated professions
    "medical doctor",
    "physician",
    "surgeon",
    "nurse practitioner",
    "truck driver",
    "delivery driver",
    "hair stylist",
    "barber",
    // low quality
    "crypto",
    "nft",
    "web3",
    "blockchain engineer",
    "make money fast",
    "work from home easy",
    "mlm",
    "multi-level",
];

/// Case-insensitive substring test over title + summary.
pub fn is_disqualified(job: &JobPosting) -> bool {
    let text = job.match_text().to_lowercase();
    NEGATIVE_KEYWORDS.iter().any(|kw| text.contains(kw))
}

// ────────────────────────────────────────────────────────────────────────────
// Skills
// ────────────────────────────────────────────────────────────────────────────

pub const SKILL_EXACT_POINTS: i32 = 10;
pub const SKILL_PARTIAL_POINTS: i32 = 5;
/// Words of a multi-word skill shorter than this never count as a partial hit.
const MIN_PARTIAL_WORD_CHARS: usize = 4;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillMatch {
    /// Uncapped points.
    pub points: i32,
    pub matched: Vec<String>,
}

/// 10 points per skill found verbatim in the job text, otherwise 5 when any
/// of its longer words appears.
pub fn skill_match(job_text: &str, skills: &[String]) -> SkillMatch {
    let job_lower = job_text.to_lowercase();
    let mut result = SkillMatch::default();

    for skill in skills {
        let skill_lower = skill.trim().to_lowercase();
        if skill_lower.is_empty() {
            continue;
        }
        if job_lower.contains(&skill_lower) {
            result.points += SKILL_EXACT_POINTS;
            result.matched.push(skill.clone());
        } else if skill_lower
            .split_whitespace()
            .filter(|w| w.chars().count() >= MIN_PARTIAL_WORD_CHARS)
            .any(|w| job_lower.contains(w))
        {
            result.points += SKILL_PARTIAL_POINTS;
            result.matched.push(skill.clone());
        }
    }
    result
}

// ────────────────────────────────────────────────────────────────────────────
// Title similarity
// ────────────────────────────────────────────────────────────────────────────

const STOP_WORDS: &[&str] = &["the", "a", "an", "and", "or", "for", "in", "at", "to", "of"];

fn title_tokens(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Jaccard overlap of headline and title words as a percentage (0–100).
pub fn title_similarity(headline: &str, title: &str) -> f64 {
    let a = title_tokens(headline);
    let b = title_tokens(title);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(&b).count();
    let union = a.union(&b).count();
    intersection as f64 / union as f64 * 100.0
}

// ────────────────────────────────────────────────────────────────────────────
// Experience alignment
// ────────────────────────────────────────────────────────────────────────────

pub const EXPERIENCE_BASE: i32 = 10;

const SENIOR_MARKERS: &[&str] = &[
    "lead",
    "head of",
    "head,",
    "director",
    "vp ",
    "vice president",
    "principal",
    "chief",
    "cto",
    "coo",
    "ceo",
    "cfo",
    "founding",
    "co-founder",
    "partner",
    "svp",
    "evp",
    "staff engineer",
    "staff developer",
    "distinguished",
    "senior",
    "sr ",
    "sr.",
];
const MID_MARKERS: &[&str] = &["manager", "team lead", "associate", "mid-level"];
const EXECUTIVE_MARKERS: &[&str] = &["director", "vp ", "head of"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seniority {
    Senior,
    Mid,
    Open,
}

pub fn title_seniority(title: &str) -> Seniority {
    let t = title.to_lowercase();
    if SENIOR_MARKERS.iter().any(|m| t.contains(m)) {
        Seniority::Senior
    } else if MID_MARKERS.iter().any(|m| t.contains(m)) {
        Seniority::Mid
    } else {
        Seniority::Open
    }
}

/// Points subtracted from `EXPERIENCE_BASE` for a seniority mismatch.
/// Under 8 years against a senior title is disqualifying (100).
pub fn experience_penalty(candidate_years: u32, title: &str) -> i32 {
    let seniority = title_seniority(title);
    let lower = title.to_lowercase();

    if candidate_years < 8 && seniority == Seniority::Senior {
        return 100;
    }
    if candidate_years < 7 && EXECUTIVE_MARKERS.iter().any(|m| lower.contains(m)) {
        return 40;
    }
    if candidate_years > 8 && seniority == Seniority::Open && lower.contains("junior") {
        return 15;
    }
    0
}

// ────────────────────────────────────────────────────────────────────────────
// Recency
// ────────────────────────────────────────────────────────────────────────────

/// Bounds "N units ago" so absurd values cannot overflow date arithmetic.
const MAX_RELATIVE_UNITS: i64 = 10_000;

static RELATIVE_AGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\+?\s*(minute|min|hour|hr|day|week|month)s?\s+ago$").expect("valid regex")
});

/// Parses the date formats sources actually emit. Unknown formats yield `None`.
pub fn parse_posted_date(raw: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    let lower = raw.to_lowercase();
    if matches!(lower.as_str(), "today" | "just posted" | "just now") {
        return Some(now);
    }
    let caps = RELATIVE_AGE_RE.captures(&lower)?;
    let n: i64 = caps[1].parse::<i64>().ok()?.min(MAX_RELATIVE_UNITS);
    let age = match &caps[2] {
        "minute" | "min" => Duration::minutes(n),
        "hour" | "hr" => Duration::hours(n),
        "day" => Duration::days(n),
        "week" => Duration::weeks(n),
        _ => Duration::days(n * 30),
    };
    Some(now - age)
}

/// 15 / 10 / 5 / 0 points for postings under 1 / 3 / 7 days old or older.
/// Undated or unparseable postings score 0.
pub fn recency_points(date_posted: &str, now: DateTime<Utc>) -> i32 {
    let Some(posted) = parse_posted_date(date_posted, now) else {
        return 0;
    };
    let age_days = (now - posted).num_days();
    match age_days {
        d if d < 1 => 15,
        d if d < 3 => 10,
        d if d < 7 => 5,
        _ => 0,
    }
}
