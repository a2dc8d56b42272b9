//! Paper source: the arXiv Atom API behind a small trait.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::config::SourceConfig;
use crate::error::SourceError;
use crate::model::Paper;

/// Anything that can return the most recent papers for a topic.
#[async_trait]
pub trait PaperSource: Send + Sync {
    /// Up to `max_results` papers, most recently submitted first.
    async fn search(&self, topic: &str, max_results: usize) -> Result<Vec<Paper>, SourceError>;
}

// ── Atom feed ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    id: String,
    title: String,
    summary: String,
    published: String,
    #[serde(rename = "author", default)]
    authors: Vec<Author>,
}

#[derive(Debug, Deserialize)]
struct Author {
    name: String,
}

/// Collapse runs of whitespace (arXiv wraps titles and abstracts).
fn squash(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn entry_to_paper(entry: Entry) -> Result<Paper, SourceError> {
    let published_date = DateTime::parse_from_rfc3339(entry.published.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            SourceError::Parse(format!(
                "entry {}: bad published date '{}': {e}",
                entry.id.trim(),
                entry.published
            ))
        })?;

    Ok(Paper {
        title: squash(&entry.title),
        abstract_text: squash(&entry.summary),
        authors: entry.authors.into_iter().map(|a| squash(&a.name)).collect(),
        published_date,
        url: entry.id.trim().to_string(),
        keywords: Vec::new(),
    })
}

/// Decode an arXiv Atom response. Any malformed entry fails the whole feed.
pub fn parse_feed(xml: &str) -> Result<Vec<Paper>, SourceError> {
    let feed: Feed = quick_xml::de::from_str(xml)
        .map_err(|e| SourceError::Parse(format!("invalid Atom feed: {e}")))?;
    feed.entries.into_iter().map(entry_to_paper).collect()
}

// ── arXiv client ─────────────────────────────────────────────────────────────

/// Client for the arXiv query API.
pub struct ArxivSource {
    client: reqwest::Client,
    base_url: String,
}

impl ArxivSource {
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("arxtrend/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Query URL for `topic`, newest submissions first.
    ///
    /// The topic is sent as one quoted phrase so the `all:` field prefix
    /// covers every word, not only the first.
    pub fn query_url(&self, topic: &str, max_results: usize) -> Result<url::Url, SourceError> {
        url::Url::parse_with_params(
            &self.base_url,
            &[
                ("search_query", format!("all:\"{}\"", topic.replace('"', ""))),
                ("start", "0".to_string()),
                ("max_results", max_results.to_string()),
                ("sortBy", "submittedDate".to_string()),
                ("sortOrder", "descending".to_string()),
            ],
        )
        .map_err(|e| SourceError::Parse(format!("invalid base url '{}': {e}", self.base_url)))
    }
}

#[async_trait]
impl PaperSource for ArxivSource {
    async fn search(&self, topic: &str, max_results: usize) -> Result<Vec<Paper>, SourceError> {
        let url = self.query_url(topic, max_results)?;
        tracing::debug!(%url, "querying arXiv");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
            });
        }
        let body = response.text().await?;
        let mut papers = parse_feed(&body)?;
        papers.truncate(max_results);
        Ok(papers)
    }
}
