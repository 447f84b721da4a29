//! Source Adapters — one per external job source.
//!
//! Every adapter implements the fallible `try_fetch`; callers only ever use the
//! provided `fetch`, which never fails. A failing source is logged and
//! contributes zero postings, so one unreachable provider cannot sink a search.

pub mod feed;
pub mod jsearch;
pub mod lever;
pub mod remotive;
pub mod serp;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::job::JobPosting;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed payload: {0}")]
    Payload(String),

    #[error("all {attempted} queries failed")]
    AllQueriesFailed { attempted: usize },

    /// The adapter's task panicked or was cancelled.
    #[error("task aborted: {0}")]
    Aborted(String),
}

/// Inputs shared by every adapter for one search.
#[derive(Debug, Clone, Default)]
pub struct FetchContext {
    pub queries: Vec<String>,
    pub location: Option<String>,
}

/// Result of one adapter run. `error` is kept for logs and telemetry only;
/// it is never surfaced to the API caller.
#[derive(Debug)]
pub struct SourceOutcome {
    pub source: String,
    pub postings: Vec<JobPosting>,
    pub error: Option<SourceError>,
}

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Display name, also used as `JobPosting::source` where the payload has none.
    fn name(&self) -> &str;

    async fn try_fetch(&self, ctx: &FetchContext) -> Result<Vec<JobPosting>, SourceError>;

    async fn fetch(&self, ctx: &FetchContext) -> SourceOutcome {
        match self.try_fetch(ctx).await {
            Ok(postings) => {
                debug!(source = self.name(), count = postings.len(), "source fetched");
                SourceOutcome {
                    source: self.name().to_string(),
                    postings,
                    error: None,
                }
            }
            Err(e) => {
                warn!(source = self.name(), "source failed: {e}");
                SourceOutcome {
                    source: self.name().to_string(),
                    postings: Vec::new(),
                    error: Some(e),
                }
            }
        }
    }
}

/// Sends a request with a timeout and returns the body of a 2xx response.
pub(crate) async fn send_for_text(
    request: RequestBuilder,
    timeout: Duration,
) -> Result<String, SourceError> {
    let response = request.timeout(timeout).send().await?;
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(SourceError::Status {
            status: status.as_u16(),
            body: body.chars().take(500).collect(),
        });
    }
    Ok(body)
}

/// Like `send_for_text`, deserializing the body as JSON.
pub(crate) async fn send_for_json<T: DeserializeOwned>(
    request: RequestBuilder,
    timeout: Duration,
) -> Result<T, SourceError> {
    let body = send_for_text(request, timeout).await?;
    serde_json::from_str(&body).map_err(|e| SourceError::Payload(e.to_string()))
}
