//! Remotive JSON job-search API adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{send_for_json, FetchContext, SourceAdapter, SourceError};
use crate::ingestion::text::{location_tags, or_default, summarize, UNKNOWN_COMPANY};
use crate::models::job::JobPosting;

const REMOTIVE_URL: &str = "https://remotive.com/api/remote-jobs?limit=30";
const SOURCE_NAME: &str = "Remotive";

#[derive(Debug, Deserialize)]
struct RemotiveResponse {
    #[serde(default)]
    jobs: Vec<RemotiveJob>,
}

#[derive(Debug, Deserialize)]
struct RemotiveJob {
    title: Option<String>,
    company_name: Option<String>,
    description: Option<String>,
    url: Option<String>,
    publication_date: Option<String>,
    candidate_required_location: Option<String>,
}

pub struct RemotiveAdapter {
    http: Client,
    timeout: Duration,
}

impl RemotiveAdapter {
    pub fn new(http: Client, timeout: Duration) -> Self {
        Self { http, timeout }
    }
}

#[async_trait]
impl SourceAdapter for RemotiveAdapter {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn try_fetch(&self, _ctx: &FetchContext) -> Result<Vec<JobPosting>, SourceError> {
        let response: RemotiveResponse =
            send_for_json(self.http.get(REMOTIVE_URL), self.timeout).await?;
        Ok(response.jobs.into_iter().map(to_posting).collect())
    }
}

fn to_posting(job: RemotiveJob) -> JobPosting {
    let title = job.title.unwrap_or_default();
    let description = job.description.unwrap_or_default();
    let location = job.candidate_required_location.unwrap_or_default();
    let location_tags = location_tags(&format!("{title} {description} {location}"));

    JobPosting {
        company: or_default(job.company_name.as_deref(), UNKNOWN_COMPANY),
        summary: summarize(&description),
        apply_url: job.url.unwrap_or_default(),
        source: SOURCE_NAME.to_string(),
        date_posted: job.publication_date.unwrap_or_default(),
        title,
        location,
        location_tags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_native_fields() {
        let body = r#"{
            "job-count": 2,
            "jobs": [
                {
                    "id": 1,
                    "title": "Support Engineer",
                    "company_name": "Postman",
                    "description": "<p>Help customers in <b>APAC</b></p>",
                    "url": "https://remotive.com/remote-jobs/1",
                    "publication_date": "2026-10-18T09:00:00",
                    "candidate_required_location": "India"
                },
                {
                    "id": 2,
                    "title": "Designer",
                    "company_name": "",
                    "url": "https://remotive.com/remote-jobs/2"
                }
            ]
        }"#;
        let response: RemotiveResponse = serde_json::from_str(body).unwrap();
        let jobs: Vec<JobPosting> = response.jobs.into_iter().map(to_posting).collect();

        assert_eq!(jobs[0].company, "Postman");
        assert_eq!(jobs[0].summary, "Help customers in APAC");
        assert_eq!(jobs[0].location, "India");
        assert_eq!(jobs[0].location_tags, vec!["asia"]);
        assert_eq!(jobs[0].date_posted, "2026-10-18T09:00:00");

        assert_eq!(jobs[1].company, "Unknown");
        assert_eq!(jobs[1].summary, "");
        assert_eq!(jobs[1].location_tags, vec!["global"]);
    }

    #[test]
    fn test_missing_jobs_array_is_empty() {
        let response: RemotiveResponse = serde_json::from_str("{}").unwrap();
        assert!(response.jobs.is_empty());
    }
}
