//! Syndicated RSS feed adapter.

use std::borrow::Cow;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use tracing::debug;

use super::{send_for_text, FetchContext, SourceAdapter, SourceError};
use crate::ingestion::text::{location_tags, split_company_title, summarize};
use crate::models::job::JobPosting;

pub const WWR_FEEDS: &[&str] = &[
    "https://weworkremotely.com/categories/remote-programming-jobs.rss",
    "https://weworkremotely.com/categories/remote-customer-support-jobs.rss",
    "https://weworkremotely.com/categories/remote-product-jobs.rss",
    "https://weworkremotely.com/categories/remote-devops-sysadmin-jobs.rss",
    "https://weworkremotely.com/categories/remote-finance-legal-jobs.rss",
    "https://weworkremotely.com/categories/remote-business-exec-management-jobs.rss",
];
/// WeWorkRemotely feeds used when the search has a concrete location.
pub const LOCAL_WWR_FEED_COUNT: usize = 2;

pub const REMOTEOK_FEED: &str = "https://remoteok.com/remote-jobs.rss";
pub const JOBICY_FEED: &str = "https://jobicy.com/feed/newjobs";
pub const SIMPLYHIRED_FEED: &str = "https://www.simplyhired.com/search/rss";

pub const DEFAULT_MAX_ITEMS: usize = 50;

// Items are read one at a time; a malformed item only loses itself.
static ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<item(?:\s[^>]*)?>(.*?)</item>").expect("valid regex"));
static CDATA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").expect("valid regex"));
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| field_regex("title"));
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| field_regex("link"));
static DESCRIPTION_RE: LazyLock<Regex> = LazyLock::new(|| field_regex("description"));
static PUB_DATE_RE: LazyLock<Regex> = LazyLock::new(|| field_regex("pubDate"));

fn field_regex(tag: &str) -> Regex {
    Regex::new(&format!(r"(?s)<{tag}(?:\s[^>]*)?>(.*?)</{tag}>")).expect("valid regex")
}

#[derive(Debug)]
struct Item {
    title: String,
    link: String,
    description: String,
    pub_date: String,
}

pub struct FeedAdapter {
    http: Client,
    name: String,
    url: String,
    max_items: usize,
    timeout: Duration,
    user_agent: String,
}

impl FeedAdapter {
    pub fn new(http: Client, name: &str, url: &str, timeout: Duration, user_agent: &str) -> Self {
        Self {
            http,
            name: name.to_string(),
            url: url.to_string(),
            max_items: DEFAULT_MAX_ITEMS,
            timeout,
            user_agent: user_agent.to_string(),
        }
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }
}

#[async_trait]
impl SourceAdapter for FeedAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn try_fetch(&self, _ctx: &FetchContext) -> Result<Vec<JobPosting>, SourceError> {
        let request = self
            .http
            .get(&self.url)
            .header(reqwest::header::USER_AGENT, &self.user_agent);
        let xml = send_for_text(request, self.timeout).await?;
        parse_feed(&xml, &self.name, self.max_items)
    }
}

/// Parses an RSS document into postings, keeping at most `max_items`.
/// Items with neither a title nor a link are skipped; the rest of the feed
/// is still read.
pub fn parse_feed(xml: &str, source: &str, max_items: usize) -> Result<Vec<JobPosting>, SourceError> {
    if !xml.contains("<channel") {
        return Err(SourceError::Payload("document has no RSS channel".to_string()));
    }

    Ok(ITEM_RE
        .captures_iter(xml)
        .filter_map(|caps| {
            let item = parse_item(&caps[1]);
            if item.is_none() {
                debug!(source, "skipping feed item without title or link");
            }
            item
        })
        .take(max_items)
        .map(|item| item_to_posting(item, source))
        .collect())
}

fn parse_item(fragment: &str) -> Option<Item> {
    let item = Item {
        title: field(fragment, &TITLE_RE),
        link: field(fragment, &LINK_RE),
        description: field(fragment, &DESCRIPTION_RE),
        pub_date: field(fragment, &PUB_DATE_RE),
    };
    if item.title.trim().is_empty() && item.link.trim().is_empty() {
        return None;
    }
    Some(item)
}

/// Text content of the first `re` element in the fragment, with CDATA
/// unwrapped and XML entities decoded. Entities the decoder does not know
/// are left in place for `strip_html`.
fn field(fragment: &str, re: &Regex) -> String {
    let Some(raw) = re.captures(fragment).and_then(|c| c.get(1)) else {
        return String::new();
    };
    let raw = raw.as_str().trim();
    if raw.contains("<![CDATA[") {
        return CDATA_RE.replace_all(raw, "$1").into_owned();
    }
    decode_entities(raw).into_owned()
}

fn decode_entities(raw: &str) -> Cow<'_, str> {
    quick_xml::escape::unescape_with(raw, |entity| match entity {
        "lt" => Some("<"),
        "gt" => Some(">"),
        "amp" => Some("&"),
        "quot" => Some("\""),
        "apos" => Some("'"),
        "nbsp" => Some(" "),
        _ => None,
    })
    .unwrap_or(Cow::Borrowed(raw))
}

fn item_to_posting(item: Item, source: &str) -> JobPosting {
    let raw_title = item.title.trim();
    let (company, title) = split_company_title(raw_title);
    let title = if title.is_empty() {
        raw_title.to_string()
    } else {
        title
    };
    let summary = summarize(&item.description);
    let location_tags = location_tags(&format!("{title} {summary}"));

    JobPosting {
        title,
        company,
        summary,
        apply_url: item.link.trim().to_string(),
        source: source.to_string(),
        location: String::new(),
        date_posted: item.pub_date.trim().to_string(),
        location_tags,
    }
}
