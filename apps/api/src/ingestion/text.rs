//! Text normalization shared by every source adapter.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Character budget for a posting summary.
pub const SUMMARY_MAX_CHARS: usize = 1000;

/// Company name used when a source gives none.
pub const UNKNOWN_COMPANY: &str = "Unknown";

/// Separators tried in order when a feed packs "Company: Title" into one field.
const TITLE_SEPARATORS: &[&str] = &[":", " - ", " – ", " | "];

/// Region tag → lowercase keywords. Some keywords carry a trailing space so
/// that timezone abbreviations do not match inside words.
const REGION_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "americas",
        &[
            "americas",
            "north america",
            "est ",
            "pst ",
            "cst ",
            "us only",
            "usa only",
            "eastern time",
            "pacific time",
        ],
    ),
    (
        "europe",
        &["emea", "europe", "cet ", "gmt", "uk only", "european hours"],
    ),
    (
        "asia",
        &[
            "apac",
            "asia",
            "ist ",
            "india",
            "singapore",
            "bangalore",
            "bengaluru",
            "mumbai",
            "delhi",
            "hyderabad",
        ],
    ),
    (
        "global",
        &[
            "anywhere",
            "worldwide",
            "global",
            "any timezone",
            "fully remote",
            "work from anywhere",
        ],
    ),
];

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Replaces tags with spaces, decodes the common entities and collapses whitespace.
pub fn strip_html(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let without_tags = TAG_RE.replace_all(text, " ");
    let decoded = without_tags
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ");
    WHITESPACE_RE.replace_all(&decoded, " ").trim().to_string()
}

/// Truncates to at most `max` characters without splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Strips markup and applies the summary budget.
pub fn summarize(raw: &str) -> String {
    truncate_chars(&strip_html(raw), SUMMARY_MAX_CHARS)
}

/// Splits "Company: Job Title" into `(company, title)`.
///
/// The first occurrence of each separator is accepted only when it sits past
/// the first two characters and before the last three. Without a usable
/// separator the company is "Unknown" and the title is returned unchanged.
pub fn split_company_title(raw: &str) -> (String, String) {
    if raw.is_empty() {
        return (UNKNOWN_COMPANY.to_string(), String::new());
    }
    let char_len = raw.chars().count();

    for sep in TITLE_SEPARATORS {
        if let Some(byte_idx) = raw.find(sep) {
            let char_idx = raw[..byte_idx].chars().count();
            if char_idx > 2 && char_idx + 3 < char_len {
                let company = raw[..byte_idx].trim().to_string();
                let title = raw[byte_idx + sep.len()..].trim().to_string();
                return (company, title);
            }
        }
    }

    (UNKNOWN_COMPANY.to_string(), raw.to_string())
}

/// Derives sorted region tags from free text; `["global"]` when nothing matches.
pub fn location_tags(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let tags: BTreeSet<&str> = REGION_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|kw| lower.contains(kw)))
        .map(|(region, _)| *region)
        .collect();

    if tags.is_empty() {
        vec!["global".to_string()]
    } else {
        tags.into_iter().map(String::from).collect()
    }
}

/// Returns `value` unless it is blank, in which case `fallback`.
pub fn or_default(value: Option<&str>, fallback: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}
