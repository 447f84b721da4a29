//! SerpAPI Google Jobs adapter (metered).

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use super::{send_for_json, FetchContext, SourceAdapter, SourceError};
use crate::ingestion::rate_limit::RateLimiter;
use crate::ingestion::text::{location_tags, or_default, summarize, UNKNOWN_COMPANY};
use crate::models::job::JobPosting;

const SERP_URL: &str = "https://serpapi.com/search.json";
const SOURCE_NAME: &str = "SerpAPI";
const DEFAULT_VIA: &str = "Google Jobs";
const MAX_QUERIES: usize = 6;
const RESULTS_PER_QUERY: &str = "10";

/// SerpAPI only accepts canonical "City, State, Country" locations.
const CITY_ALIASES: &[(&str, &str)] = &[
    ("bangalore", "Bengaluru, Karnataka, India"),
    ("bangalore urban", "Bengaluru, Karnataka, India"),
    ("bangalore, india", "Bengaluru, Karnataka, India"),
    ("bengaluru", "Bengaluru, Karnataka, India"),
    ("karnataka (bangalore)", "Bengaluru, Karnataka, India"),
    ("mumbai", "Mumbai, Maharashtra, India"),
    ("mumbai, india", "Mumbai, Maharashtra, India"),
    ("delhi", "Delhi, India"),
    ("new delhi", "Delhi, India"),
    ("delhi, india", "Delhi, India"),
    ("hyderabad", "Hyderabad, Telangana, India"),
    ("hyderabad, india", "Hyderabad, Telangana, India"),
    ("pune", "Pune, Maharashtra, India"),
    ("pune, india", "Pune, Maharashtra, India"),
    ("chennai", "Chennai, Tamil Nadu, India"),
    ("chennai, india", "Chennai, Tamil Nadu, India"),
    ("kolkata", "Kolkata, West Bengal, India"),
    ("kolkata, india", "Kolkata, West Bengal, India"),
    ("india", "India"),
];

const ADMIN_SUFFIXES: &[&str] = &[" urban", " rural", " district"];

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    jobs_results: Vec<SerpJob>,
}

#[derive(Debug, Deserialize)]
struct SerpJob {
    title: Option<String>,
    company_name: Option<String>,
    description: Option<String>,
    location: Option<String>,
    via: Option<String>,
    job_id: Option<String>,
    detected_extensions: Option<DetectedExtensions>,
}

#[derive(Debug, Deserialize)]
struct DetectedExtensions {
    posted_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListingResponse {
    #[serde(default)]
    apply_options: Vec<ApplyOption>,
}

#[derive(Debug, Deserialize)]
struct ApplyOption {
    link: Option<String>,
}

pub struct SerpAdapter {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    limiter: Arc<dyn RateLimiter>,
    timeout: Duration,
    listing_timeout: Duration,
}

impl SerpAdapter {
    pub fn new(
        http: Client,
        api_key: Option<String>,
        limiter: Arc<dyn RateLimiter>,
        timeout: Duration,
        listing_timeout: Duration,
    ) -> Self {
        Self {
            http,
            base_url: SERP_URL.to_string(),
            api_key,
            limiter,
            timeout,
            listing_timeout,
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    async fn search(
        &self,
        api_key: &str,
        query: &str,
        location: Option<&str>,
    ) -> Result<Vec<SerpJob>, SourceError> {
        let mut params = vec![
            ("engine", "google_jobs"),
            ("q", query),
            ("api_key", api_key),
            ("num", RESULTS_PER_QUERY),
        ];
        if let Some(loc) = location {
            params.push(("location", loc));
        }
        let request = self.http.get(&self.base_url).query(&params);
        let response: SearchResponse = send_for_json(request, self.timeout).await?;
        Ok(response.jobs_results)
    }

    /// Resolves the employer's apply link; `None` on any failure. Listing
    /// lookups are billed like searches, so they share the same pacing.
    async fn lookup_apply_link(&self, api_key: &str, job_id: &str) -> Option<String> {
        self.limiter.acquire().await;
        let request = self.http.get(&self.base_url).query(&[
            ("engine", "google_jobs_listing"),
            ("q", job_id),
            ("api_key", api_key),
        ]);
        match send_for_json::<ListingResponse>(request, self.listing_timeout).await {
            Ok(listing) => listing
                .apply_options
                .into_iter()
                .next()
                .and_then(|o| o.link)
                .filter(|l| !l.is_empty()),
            Err(e) => {
                debug!(job_id, "listing lookup failed: {e}");
                None
            }
        }
    }
}

#[async_trait]
impl SourceAdapter for SerpAdapter {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn try_fetch(&self, ctx: &FetchContext) -> Result<Vec<JobPosting>, SourceError> {
        let Some(api_key) = self.api_key.as_deref() else {
            info!("SerpAPI skipped: SERP_API_KEY not configured");
            return Ok(Vec::new());
        };
        if ctx.queries.is_empty() {
            info!("SerpAPI skipped: no queries");
            return Ok(Vec::new());
        }

        let location = ctx.location.as_deref().map(canonical_location);
        let queries: Vec<&String> = ctx.queries.iter().take(MAX_QUERIES).collect();
        let mut seen = HashSet::new();
        let mut postings = Vec::new();
        let mut succeeded = 0usize;

        for query in &queries {
            self.limiter.acquire().await;
            let results = match self.search(api_key, query, location.as_deref()).await {
                Ok(results) => results,
                Err(e) => {
                    log_query_failure(query, &e);
                    continue;
                }
            };
            succeeded += 1;
            debug!(query = %query, found = results.len(), "SerpAPI query complete");

            for job in results {
                if !seen.insert(dedup_key(&job)) {
                    continue;
                }
                let link = match job.job_id.as_deref() {
                    Some(id) if !id.is_empty() => self.lookup_apply_link(api_key, id).await,
                    _ => None,
                };
                postings.push(to_posting(job, link));
            }
        }

        info!(
            attempted = queries.len(),
            succeeded,
            jobs = postings.len(),
            "SerpAPI summary"
        );
        if succeeded == 0 {
            return Err(SourceError::AllQueriesFailed {
                attempted: queries.len(),
            });
        }
        Ok(postings)
    }
}

fn log_query_failure(query: &str, err: &SourceError) {
    match err {
        SourceError::Status { status: 400, .. } => {
            error!(query, "SerpAPI bad request, check query/location format (HTTP 400)")
        }
        SourceError::Status { status: 401, .. } => error!(query, "SerpAPI invalid API key (HTTP 401)"),
        SourceError::Status { status: 403, .. } => error!(query, "SerpAPI access forbidden (HTTP 403)"),
        SourceError::Status { status: 429, .. } => warn!(query, "SerpAPI rate limit exceeded (HTTP 429)"),
        other => warn!(query, "SerpAPI query failed: {other}"),
    }
}

/// Maps common city spellings to SerpAPI's canonical form; otherwise drops
/// administrative suffixes such as "Urban" or "District".
pub fn canonical_location(raw: &str) -> String {
    let key = raw.trim().to_lowercase();
    if let Some((_, canonical)) = CITY_ALIASES.iter().find(|(alias, _)| *alias == key) {
        return canonical.to_string();
    }

    let mut out = raw.to_string();
    for suffix in ADMIN_SUFFIXES {
        // Lowercasing ASCII suffixes keeps byte offsets aligned.
        while let Some(idx) = out.to_ascii_lowercase().find(suffix) {
            out.replace_range(idx..idx + suffix.len(), "");
        }
    }
    out.trim().to_string()
}

fn dedup_key(job: &SerpJob) -> String {
    format!(
        "{}__{}",
        job.title.as_deref().unwrap_or_default(),
        job.company_name.as_deref().unwrap_or_default()
    )
    .to_lowercase()
}

fn fallback_apply_url(title: &str, company: &str) -> String {
    let q = urlencoding::encode(&format!("{title} {company} apply")).into_owned();
    format!("https://www.google.com/search?q={q}&ibp=htl;jobs")
}

fn to_posting(job: SerpJob, apply_link: Option<String>) -> JobPosting {
    let title = job.title.unwrap_or_default();
    let company_name = job.company_name.unwrap_or_default();
    let description = job.description.unwrap_or_default();
    let location = job.location.unwrap_or_default();

    let source = job
        .via
        .as_deref()
        .map(|v| v.replacen("via ", "", 1))
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_VIA.to_string());
    let apply_url = apply_link.unwrap_or_else(|| fallback_apply_url(&title, &company_name));
    let location_tags = location_tags(&format!("{title} {description} {location}"));

    JobPosting {
        company: or_default(Some(company_name.as_str()), UNKNOWN_COMPANY),
        summary: summarize(&description),
        date_posted: job
            .detected_extensions
            .and_then(|d| d.posted_at)
            .unwrap_or_default(),
        title,
        location,
        apply_url,
        source,
        location_tags,
    }
}
