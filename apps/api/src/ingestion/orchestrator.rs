//! Ingestion Orchestrator — fans out to every source, merges and deduplicates.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use reqwest::Client;
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{info, warn};

use super::adapters::feed::{
    FeedAdapter, JOBICY_FEED, LOCAL_WWR_FEED_COUNT, REMOTEOK_FEED, SIMPLYHIRED_FEED, WWR_FEEDS,
};
use super::adapters::jsearch::JSearchAdapter;
use super::adapters::lever::LeverAdapter;
use super::adapters::remotive::RemotiveAdapter;
use super::adapters::serp::SerpAdapter;
use super::adapters::{FetchContext, SourceAdapter, SourceError, SourceOutcome};
use super::query::build_queries;
use super::rate_limit::PaidLimiters;
use crate::config::Config;
use crate::errors::AppError;
use crate::models::credentials::Credentials;
use crate::models::job::JobPosting;
use crate::models::profile::{CandidateProfile, SearchPreferences};
use crate::progress::ProgressSink;

const REMOTEOK_MAX_ITEMS: usize = 100;

/// Adapters grouped by how they are scheduled.
#[derive(Default)]
pub struct SourceStages {
    /// Run together; merged in declaration order.
    pub concurrent: Vec<Arc<dyn SourceAdapter>>,
    /// Posting boards, run sequentially after the concurrent stage.
    pub board: Vec<Arc<dyn SourceAdapter>>,
    /// Metered search APIs, run sequentially and only when queries exist.
    pub paid: Vec<Arc<dyn SourceAdapter>>,
}

/// Supplies the adapters for one search.
pub trait SourceCatalog: Send + Sync {
    fn stages(&self, remote_preferred: bool) -> SourceStages;
}

/// Production source set.
pub struct DefaultCatalog {
    http: Client,
    config: Config,
    credentials: Credentials,
    limiters: PaidLimiters,
}

impl DefaultCatalog {
    pub fn new(http: Client, config: Config, credentials: Credentials, limiters: PaidLimiters) -> Self {
        Self {
            http,
            config,
            credentials,
            limiters,
        }
    }

    fn feed(&self, name: &str, url: &str) -> FeedAdapter {
        FeedAdapter::new(
            self.http.clone(),
            name,
            url,
            self.config.network_timeout,
            &self.config.feed_user_agent,
        )
    }
}

impl SourceCatalog for DefaultCatalog {
    fn stages(&self, remote_preferred: bool) -> SourceStages {
        let wwr_count = if remote_preferred {
            WWR_FEEDS.len()
        } else {
            LOCAL_WWR_FEED_COUNT
        };

        let mut concurrent: Vec<Arc<dyn SourceAdapter>> = WWR_FEEDS
            .iter()
            .take(wwr_count)
            .map(|url| Arc::new(self.feed("WeWorkRemotely", url)) as Arc<dyn SourceAdapter>)
            .collect();
        concurrent.push(Arc::new(
            self.feed("RemoteOK", REMOTEOK_FEED)
                .with_max_items(REMOTEOK_MAX_ITEMS),
        ));
        concurrent.push(Arc::new(self.feed("Jobicy", JOBICY_FEED)));
        concurrent.push(Arc::new(RemotiveAdapter::new(
            self.http.clone(),
            self.config.network_timeout,
        )));
        concurrent.push(Arc::new(self.feed("SimplyHired", SIMPLYHIRED_FEED)));

        SourceStages {
            concurrent,
            board: vec![Arc::new(LeverAdapter::new(
                self.http.clone(),
                self.config.board_timeout,
            )) as Arc<dyn SourceAdapter>],
            paid: vec![
                Arc::new(SerpAdapter::new(
                    self.http.clone(),
                    self.credentials.serp_api_key.clone(),
                    self.limiters.serp.clone(),
                    self.config.paid_timeout,
                    self.config.listing_timeout,
                )) as Arc<dyn SourceAdapter>,
                Arc::new(JSearchAdapter::new(
                    self.http.clone(),
                    self.credentials.jsearch_key.clone(),
                    self.limiters.jsearch.clone(),
                    self.config.paid_timeout,
                )),
            ],
        }
    }
}

/// Everything ingestion produced for one search.
#[derive(Debug, Clone, Serialize)]
pub struct IngestionReport {
    pub jobs: Vec<JobPosting>,
    /// Surviving postings per `JobPosting::source`.
    pub sources: BTreeMap<String, usize>,
    pub queries: Vec<String>,
    pub location: Option<String>,
    /// Sources that errored or aborted; they contributed no postings.
    pub failed_sources: Vec<String>,
}

/// Fetches from every source in the catalog and returns the merged,
/// URL-deduplicated posting list.
///
/// Individual source failures never fail the call; only an invalid profile does.
pub async fn fetch_all_jobs(
    catalog: &dyn SourceCatalog,
    profile: &CandidateProfile,
    preferences: &SearchPreferences,
    sink: &dyn ProgressSink,
) -> Result<IngestionReport, AppError> {
    if profile.skills.is_empty() {
        return Err(AppError::Validation(
            "profile must contain at least one skill".to_string(),
        ));
    }

    let plan = build_queries(profile, preferences);
    let remote_preferred = plan.remote_preferred(preferences);
    match &plan.location {
        Some(loc) if !remote_preferred => sink.report(&format!("Fetching jobs near {loc}...")),
        _ => sink.report("Fetching remote-first jobs..."),
    }

    let ctx = FetchContext {
        queries: plan.queries.clone(),
        location: plan.location.clone(),
    };
    let stages = catalog.stages(remote_preferred);

    // ── Stage 1: feeds and JSON APIs, concurrently ───────────────────────
    let mut failed = Vec::new();
    let mut jobs = merge_outcomes(run_concurrent(&stages.concurrent, &ctx).await, &mut failed);
    sink.report(&format!("RSS complete: {} jobs", jobs.len()));

    // ── Stage 2: posting boards ──────────────────────────────────────────
    let board_names: Vec<&str> = stages.board.iter().map(|a| a.name()).collect();
    let board_jobs = merge_outcomes(run_sequential(&stages.board, &ctx).await, &mut failed);
    sink.report(&format!(
        "board complete: +{} {}",
        board_jobs.len(),
        board_names.join(", ")
    ));
    jobs.extend(board_jobs);

    // ── Stage 3: paid search ─────────────────────────────────────────────
    if ctx.queries.is_empty() {
        warn!("paid search skipped: no queries generated");
    } else {
        let paid_jobs = merge_outcomes(run_sequential(&stages.paid, &ctx).await, &mut failed);
        sink.report(&format!("paid search complete: +{}", paid_jobs.len()));
        jobs.extend(paid_jobs);
    }

    let fetched = jobs.len();
    let jobs = dedup_by_url(jobs);
    let sources = tally_sources(&jobs);
    info!(
        fetched,
        unique = jobs.len(),
        queries = plan.queries.len(),
        failed = failed.len(),
        "ingestion complete"
    );
    sink.report(&format!("Total: {} unique jobs", jobs.len()));

    Ok(IngestionReport {
        jobs,
        sources,
        queries: plan.queries,
        location: plan.location,
        failed_sources: failed,
    })
}

/// Spawns every adapter and returns outcomes in adapter order, regardless of
/// completion order. A panicked task becomes an empty, aborted outcome.
async fn run_concurrent(
    adapters: &[Arc<dyn SourceAdapter>],
    ctx: &FetchContext,
) -> Vec<SourceOutcome> {
    let mut set = JoinSet::new();
    for (idx, adapter) in adapters.iter().enumerate() {
        let adapter = Arc::clone(adapter);
        let ctx = ctx.clone();
        set.spawn(async move { (idx, adapter.fetch(&ctx).await) });
    }

    let mut slots: Vec<Option<SourceOutcome>> = adapters.iter().map(|_| None).collect();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((idx, outcome)) => slots[idx] = Some(outcome),
            Err(e) => warn!("source task aborted: {e}"),
        }
    }

    slots
        .into_iter()
        .zip(adapters)
        .map(|(slot, adapter)| {
            slot.unwrap_or_else(|| SourceOutcome {
                source: adapter.name().to_string(),
                postings: Vec::new(),
                error: Some(SourceError::Aborted("panicked or cancelled".to_string())),
            })
        })
        .collect()
}

async fn run_sequential(
    adapters: &[Arc<dyn SourceAdapter>],
    ctx: &FetchContext,
) -> Vec<SourceOutcome> {
    let mut outcomes = Vec::with_capacity(adapters.len());
    for adapter in adapters {
        outcomes.push(adapter.fetch(ctx).await);
    }
    outcomes
}

/// Flattens outcomes into postings, noting which sources failed.
fn merge_outcomes(outcomes: Vec<SourceOutcome>, failed: &mut Vec<String>) -> Vec<JobPosting> {
    let mut jobs = Vec::new();
    for outcome in outcomes {
        if outcome.error.is_some() {
            failed.push(outcome.source);
        }
        jobs.extend(outcome.postings);
    }
    jobs
}

/// Keeps the first posting per apply URL. Postings without a URL are never merged.
pub fn dedup_by_url(jobs: Vec<JobPosting>) -> Vec<JobPosting> {
    let mut seen = HashSet::new();
    jobs.into_iter()
        .filter(|job| job.apply_url.is_empty() || seen.insert(job.apply_url.clone()))
        .collect()
}

fn tally_sources(jobs: &[JobPosting]) -> BTreeMap<String, usize> {
    let mut sources = BTreeMap::new();
    for job in jobs {
        *sources.entry(job.source.clone()).or_insert(0) += 1;
    }
    sources
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::progress::ProgressLog;

    fn src<A: SourceAdapter + 'static>(adapter: A) -> Arc<dyn SourceAdapter> {
        Arc::new(adapter)
    }

    fn posting(title: &str, url: &str, source: &str) -> JobPosting {
        JobPosting {
            title: title.to_string(),
            company: "Acme".to_string(),
            apply_url: url.to_string(),
            source: source.to_string(),
            location_tags: vec!["global".to_string()],
            ..Default::default()
        }
    }

    struct Fixed {
        name: &'static str,
        jobs: Vec<JobPosting>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(name: &'static str, jobs: Vec<JobPosting>) -> Self {
            Self {
                name,
                jobs,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }

        fn delayed(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    #[async_trait]
    impl SourceAdapter for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        async fn try_fetch(&self, _ctx: &FetchContext) -> Result<Vec<JobPosting>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(self.jobs.clone())
        }
    }

    struct Failing;

    #[async_trait]
    impl SourceAdapter for Failing {
        fn name(&self) -> &str {
            "Failing"
        }

        async fn try_fetch(&self, _ctx: &FetchContext) -> Result<Vec<JobPosting>, SourceError> {
            Err(SourceError::Status {
                status: 503,
                body: "unavailable".to_string(),
            })
        }
    }

    struct Panicking;

    #[async_trait]
    impl SourceAdapter for Panicking {
        fn name(&self) -> &str {
            "Panicking"
        }

        async fn try_fetch(&self, _ctx: &FetchContext) -> Result<Vec<JobPosting>, SourceError> {
            panic!("adapter bug");
        }
    }

    /// Returns prebuilt adapters and records the remote flag it was asked for.
    struct StubCatalog {
        concurrent: Vec<Arc<dyn SourceAdapter>>,
        board: Vec<Arc<dyn SourceAdapter>>,
        paid: Vec<Arc<dyn SourceAdapter>>,
        remote_seen: Mutex<Option<bool>>,
    }

    impl StubCatalog {
        fn new(
            concurrent: Vec<Arc<dyn SourceAdapter>>,
            board: Vec<Arc<dyn SourceAdapter>>,
            paid: Vec<Arc<dyn SourceAdapter>>,
        ) -> Self {
            Self {
                concurrent,
                board,
                paid,
                remote_seen: Mutex::new(None),
            }
        }
    }

    impl SourceCatalog for StubCatalog {
        fn stages(&self, remote_preferred: bool) -> SourceStages {
            *self.remote_seen.lock().unwrap() = Some(remote_preferred);
            SourceStages {
                concurrent: self.concurrent.clone(),
                board: self.board.clone(),
                paid: self.paid.clone(),
            }
        }
    }

    fn profile() -> CandidateProfile {
        CandidateProfile {
            headline: "Backend Engineer".to_string(),
            skills: vec!["rust".to_string()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_rejects_profile_without_skills() {
        let catalog = StubCatalog::new(vec![], vec![], vec![]);
        let sink = ProgressLog::new();
        let result = fetch_all_jobs(
            &catalog,
            &CandidateProfile::default(),
            &SearchPreferences::default(),
            &sink,
        )
        .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(catalog.remote_seen.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_sources_do_not_sink_the_search() {
        let catalog = StubCatalog::new(
            vec![
                src(Failing),
                src(Panicking),
                src(Fixed::new("RemoteOK", vec![posting("A", "https://a", "RemoteOK")])),
            ],
            vec![src(Failing)],
            vec![],
        );
        let sink = ProgressLog::new();
        let report = fetch_all_jobs(&catalog, &profile(), &SearchPreferences::default(), &sink)
            .await
            .unwrap();

        assert_eq!(report.jobs.len(), 1);
        assert_eq!(report.sources.get("RemoteOK"), Some(&1));
        assert_eq!(report.failed_sources, vec!["Failing", "Panicking", "Failing"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_results_merge_in_catalog_order() {
        let slow = Fixed::new("Slow", vec![posting("slow", "https://slow", "Slow")])
            .delayed(Duration::from_secs(5));
        let fast = Fixed::new("Fast", vec![posting("fast", "https://fast", "Fast")]);
        let catalog = StubCatalog::new(vec![src(slow), src(fast)], vec![], vec![]);

        let report = fetch_all_jobs(
            &catalog,
            &profile(),
            &SearchPreferences::default(),
            &crate::progress::NoProgress,
        )
        .await
        .unwrap();

        let titles: Vec<&str> = report.jobs.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["slow", "fast"]);
    }

    #[tokio::test]
    async fn test_dedup_keeps_first_url_and_all_empty_urls() {
        let catalog = StubCatalog::new(
            vec![src(Fixed::new(
                "WeWorkRemotely",
                vec![
                    posting("first", "https://same", "WeWorkRemotely"),
                    posting("no-url-1", "", "WeWorkRemotely"),
                ],
            ))],
            vec![src(Fixed::new(
                "Lever",
                vec![
                    posting("second", "https://same", "Lever"),
                    posting("no-url-2", "", "Lever"),
                ],
            ))],
            vec![],
        );
        let report = fetch_all_jobs(
            &catalog,
            &profile(),
            &SearchPreferences::default(),
            &crate::progress::NoProgress,
        )
        .await
        .unwrap();

        let titles: Vec<&str> = report.jobs.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "no-url-1", "no-url-2"]);
        assert_eq!(report.sources.get("WeWorkRemotely"), Some(&2));
        assert_eq!(report.sources.get("Lever"), Some(&1));
    }

    #[tokio::test]
    async fn test_progress_messages_and_remote_flag() {
        let paid = Arc::new(Fixed::new("SerpAPI", vec![posting("p", "https://p", "LinkedIn")]));
        let catalog = StubCatalog::new(
            vec![src(Fixed::new("Jobicy", vec![posting("j", "https://j", "Jobicy")]))],
            vec![src(Fixed::new("Lever", vec![posting("l", "https://l", "Lever")]))],
            vec![paid.clone() as Arc<dyn SourceAdapter>],
        );
        let prefs = SearchPreferences {
            location: "Pune".to_string(),
            remote_only: false,
        };
        let sink = ProgressLog::new();
        let report = fetch_all_jobs(&catalog, &profile(), &prefs, &sink).await.unwrap();

        assert_eq!(*catalog.remote_seen.lock().unwrap(), Some(false));
        assert_eq!(report.location.as_deref(), Some("Pune"));
        assert_eq!(paid.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            sink.into_messages(),
            vec![
                "Fetching jobs near Pune...",
                "RSS complete: 1 jobs",
                "board complete: +1 Lever",
                "paid search complete: +1",
                "Total: 3 unique jobs",
            ]
        );
    }

    #[tokio::test]
    async fn test_paid_stage_skipped_without_queries() {
        let paid = Arc::new(Fixed::new("SerpAPI", vec![posting("p", "https://p", "LinkedIn")]));
        let catalog = StubCatalog::new(vec![], vec![], vec![paid.clone() as Arc<dyn SourceAdapter>]);
        // No headline, terms or industry, and a four-word skill: zero queries.
        let profile = CandidateProfile {
            skills: vec!["extract transform load pipelines".to_string()],
            ..Default::default()
        };
        let sink = ProgressLog::new();
        let report = fetch_all_jobs(&catalog, &profile, &SearchPreferences::default(), &sink)
            .await
            .unwrap();

        assert!(report.queries.is_empty());
        assert_eq!(paid.calls.load(Ordering::SeqCst), 0);
        assert_eq!(*catalog.remote_seen.lock().unwrap(), Some(true));
        assert!(!sink
            .into_messages()
            .iter()
            .any(|m| m.starts_with("paid search")));
    }

    #[test]
    fn test_default_catalog_feed_selection() {
        let catalog = DefaultCatalog::new(
            Client::new(),
            Config::default(),
            Credentials::default(),
            PaidLimiters::unlimited(),
        );

        let remote = catalog.stages(true);
        let wwr = |s: &SourceStages| {
            s.concurrent
                .iter()
                .filter(|a| a.name() == "WeWorkRemotely")
                .count()
        };
        assert_eq!(wwr(&remote), 6);
        assert_eq!(remote.concurrent.len(), 10);
        assert_eq!(remote.board.len(), 1);
        assert_eq!(remote.paid.len(), 2);

        let local = catalog.stages(false);
        assert_eq!(wwr(&local), 2);
    }
}
