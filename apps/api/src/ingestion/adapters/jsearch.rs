//! JSearch (RapidAPI) adapter (metered).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use super::{send_for_json, FetchContext, SourceAdapter, SourceError};
use crate::ingestion::rate_limit::RateLimiter;
use crate::ingestion::text::{location_tags, or_default, summarize, UNKNOWN_COMPANY};
use crate::models::job::JobPosting;

const JSEARCH_URL: &str = "https://jsearch.p.rapidapi.com/search";
const JSEARCH_HOST: &str = "jsearch.p.rapidapi.com";
const SOURCE_NAME: &str = "JSearch";
const MAX_QUERIES: usize = 5;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<JSearchJob>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JSearchJob {
    job_title: Option<String>,
    employer_name: Option<String>,
    job_description: Option<String>,
    job_apply_link: Option<String>,
    job_publisher: Option<String>,
    job_city: Option<String>,
    job_state: Option<String>,
    job_country: Option<String>,
    job_posted_at_datetime_utc: Option<String>,
}

pub struct JSearchAdapter {
    http: Client,
    api_key: Option<String>,
    limiter: Arc<dyn RateLimiter>,
    timeout: Duration,
}

impl JSearchAdapter {
    pub fn new(
        http: Client,
        api_key: Option<String>,
        limiter: Arc<dyn RateLimiter>,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            api_key,
            limiter,
            timeout,
        }
    }

    async fn search(&self, api_key: &str, query: &str) -> Result<Vec<JSearchJob>, SourceError> {
        let request = self
            .http
            .get(JSEARCH_URL)
            .header("X-RapidAPI-Key", api_key)
            .header("X-RapidAPI-Host", JSEARCH_HOST)
            .query(&[("query", query), ("num_pages", "1")]);
        let response: SearchResponse = send_for_json(request, self.timeout).await?;
        Ok(response.data)
    }
}

#[async_trait]
impl SourceAdapter for JSearchAdapter {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn try_fetch(&self, ctx: &FetchContext) -> Result<Vec<JobPosting>, SourceError> {
        let Some(api_key) = self.api_key.as_deref() else {
            info!("JSearch skipped: JSEARCH_KEY not configured");
            return Ok(Vec::new());
        };

        let mut postings = Vec::new();
        for query in ctx.queries.iter().take(MAX_QUERIES) {
            let query = scoped_query(query, ctx.location.as_deref());
            self.limiter.acquire().await;
            match self.search(api_key, &query).await {
                Ok(jobs) => postings.extend(jobs.into_iter().map(to_posting)),
                Err(e) => warn!(query = %query, "JSearch query failed: {e}"),
            }
        }
        Ok(postings)
    }
}

fn scoped_query(query: &str, location: Option<&str>) -> String {
    match location {
        Some(loc) => format!("{query} in {loc}"),
        None => query.to_string(),
    }
}

fn to_posting(job: JSearchJob) -> JobPosting {
    let title = job.job_title.unwrap_or_default();
    let description = job.job_description.unwrap_or_default();
    let location = [&job.job_city, &job.job_state, &job.job_country]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let location_tags = location_tags(&format!(
        "{title} {description} {} {}",
        job.job_city.as_deref().unwrap_or_default(),
        job.job_country.as_deref().unwrap_or_default()
    ));

    JobPosting {
        company: or_default(job.employer_name.as_deref(), UNKNOWN_COMPANY),
        summary: summarize(&description),
        apply_url: job.job_apply_link.unwrap_or_default(),
        source: or_default(job.job_publisher.as_deref(), SOURCE_NAME),
        date_posted: job.job_posted_at_datetime_utc.unwrap_or_default(),
        title,
        location,
        location_tags,
    }
}
