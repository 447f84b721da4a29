//! Lever posting-board adapter.
//!
//! Lever has no cross-company search, so a fixed roster of company slugs is
//! queried one at a time. A failing company is logged and skipped.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{send_for_json, FetchContext, SourceAdapter, SourceError};
use crate::ingestion::text::{location_tags, summarize};
use crate::models::job::JobPosting;

const SOURCE_NAME: &str = "Lever";
const MAX_PER_COMPANY: usize = 15;

pub const LEVER_COMPANIES: &[&str] = &[
    "meesho",
    "cred",
    "razorpay",
    "groww",
    "zerodha",
    "phonepe",
    "swiggy",
    "zomato",
    "ola",
    "flipkart",
    "paytm",
    "dream11",
    "slice",
    "jupiter",
    "fi-money",
    "smallcase",
    "cleartax",
    "browserstack",
    "postman",
    "freshworks",
    "zoho",
    "chargebee",
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeverPosting {
    text: Option<String>,
    description_plain: Option<String>,
    description: Option<String>,
    hosted_url: Option<String>,
    apply_url: Option<String>,
    /// Epoch milliseconds.
    created_at: Option<i64>,
    categories: Option<LeverCategories>,
}

#[derive(Debug, Deserialize)]
struct LeverCategories {
    location: Option<String>,
}

pub struct LeverAdapter {
    http: Client,
    companies: Vec<String>,
    per_company_timeout: Duration,
}

impl LeverAdapter {
    pub fn new(http: Client, per_company_timeout: Duration) -> Self {
        Self {
            http,
            companies: LEVER_COMPANIES.iter().map(|c| c.to_string()).collect(),
            per_company_timeout,
        }
    }

    async fn fetch_company(&self, company: &str) -> Result<Vec<JobPosting>, SourceError> {
        let url = format!(
            "https://api.lever.co/v0/postings/{company}?mode=json&limit={MAX_PER_COMPANY}"
        );
        let postings: Vec<LeverPosting> =
            send_for_json(self.http.get(url), self.per_company_timeout).await?;
        Ok(postings
            .into_iter()
            .map(|p| to_posting(p, company))
            .collect())
    }
}

#[async_trait]
impl SourceAdapter for LeverAdapter {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn try_fetch(&self, _ctx: &FetchContext) -> Result<Vec<JobPosting>, SourceError> {
        let mut all = Vec::new();
        // Sequential on purpose: Lever rate-limits bursts per client.
        for company in &self.companies {
            match self.fetch_company(company).await {
                Ok(jobs) => {
                    debug!(company = %company, count = jobs.len(), "lever company fetched");
                    all.extend(jobs);
                }
                Err(e) => warn!(company = %company, "lever company skipped: {e}"),
            }
        }
        Ok(all)
    }
}

/// "fi-money" → "Fi-money".
fn display_name(slug: &str) -> String {
    let mut chars = slug.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn to_posting(p: LeverPosting, company_slug: &str) -> JobPosting {
    let title = p.text.unwrap_or_default();
    let location = p.categories.and_then(|c| c.location).unwrap_or_default();
    let description = p
        .description_plain
        .filter(|d| !d.is_empty())
        .or(p.description)
        .unwrap_or_default();
    let apply_url = p
        .hosted_url
        .filter(|u| !u.is_empty())
        .or(p.apply_url)
        .unwrap_or_default();
    let date_posted = p
        .created_at
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default();

    JobPosting {
        location_tags: location_tags(&format!("{title} {location}")),
        company: display_name(company_slug),
        summary: summarize(&description),
        source: SOURCE_NAME.to_string(),
        title,
        apply_url,
        location,
        date_posted,
    }
}
