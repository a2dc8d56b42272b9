//! Records that flow through an analysis run and across its boundaries.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::KeywordStrategy;

/// Upper bound on `max_papers` accepted at the boundary.
pub const MAX_PAPERS_LIMIT: usize = 2000;

fn default_max_papers() -> usize {
    100
}

/// One paper's metadata plus the keywords assigned during extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub authors: Vec<String>,
    pub published_date: DateTime<Utc>,
    pub url: String,
    /// Cluster representatives; empty until keyword extraction runs.
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Paper {
    /// Text the keyword extractors read.
    pub fn extraction_text(&self) -> String {
        format!("{}\n{}", self.title, self.abstract_text)
    }
}

/// Monthly mention counts for one top keyword.
///
/// `frequency` and `timestamps` always have equal length; timestamps are
/// consecutive `YYYY-MM` labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordTrend {
    pub keyword: String,
    pub frequency: Vec<usize>,
    pub timestamps: Vec<String>,
}

impl KeywordTrend {
    /// `(first, last)` counts, if the series is non-empty.
    pub fn endpoints(&self) -> Option<(usize, usize)> {
        Some((*self.frequency.first()?, *self.frequency.last()?))
    }
}

/// Mutable state threaded through the pipeline stages.
///
/// Each stage fills only the fields it owns. Created per request and
/// dropped once the response is built.
#[derive(Debug, Clone, Default)]
pub struct AnalysisState {
    pub topic: String,
    pub max_papers: usize,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub papers: Vec<Paper>,
    pub top_keywords: Vec<String>,
    pub keyword_trends: Vec<KeywordTrend>,
    pub trend_summary: String,
    pub research_evolution: String,
    pub time_period: String,
}

impl AnalysisState {
    pub fn new(request: &AnalysisRequest) -> Self {
        Self {
            topic: request.topic.trim().to_string(),
            max_papers: request.max_papers,
            start_date: request.start_date,
            end_date: request.end_date,
            ..Default::default()
        }
    }

    pub fn into_response(self) -> AnalysisResponse {
        AnalysisResponse {
            topic: self.topic,
            total_papers: self.papers.len(),
            keyword_trends: self.keyword_trends,
            top_keywords: self.top_keywords,
            papers: self.papers,
            trend_summary: self.trend_summary,
            time_period: self.time_period,
            research_evolution: self.research_evolution,
        }
    }
}

/// Inbound analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub topic: String,
    #[serde(default, deserialize_with = "flexible_date")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "flexible_date")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default = "default_max_papers")]
    pub max_papers: usize,
    /// Overrides the configured keyword strategy for this request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<KeywordStrategy>,
}

impl AnalysisRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            start_date: None,
            end_date: None,
            max_papers: default_max_papers(),
            strategy: None,
        }
    }

    /// Reject requests that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<(), String> {
        if self.topic.trim().is_empty() {
            return Err("topic must not be blank".into());
        }
        if !(1..=MAX_PAPERS_LIMIT).contains(&self.max_papers) {
            return Err(format!(
                "max_papers must be between 1 and {MAX_PAPERS_LIMIT}, got {}",
                self.max_papers
            ));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(format!(
                    "start_date {} is after end_date {}",
                    start.to_rfc3339(),
                    end.to_rfc3339()
                ));
            }
        }
        Ok(())
    }
}

/// Outbound analysis result: the union of all stage artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub topic: String,
    pub total_papers: usize,
    pub keyword_trends: Vec<KeywordTrend>,
    pub top_keywords: Vec<String>,
    pub papers: Vec<Paper>,
    pub trend_summary: String,
    pub time_period: String,
    pub research_evolution: String,
}

/// Parse an RFC 3339 timestamp or a plain `YYYY-MM-DD` date (midnight UTC).
pub fn parse_date(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("invalid date '{s}': expected RFC 3339 or YYYY-MM-DD"))
}

fn flexible_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_date(s).map(Some).map_err(serde::de::Error::custom),
    }
}
