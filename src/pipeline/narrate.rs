use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Datelike;

use super::Stage;
use crate::algo::timeline;
use crate::error::AnalysisError;
use crate::llm::TextGenerator;
use crate::model::{AnalysisState, KeywordTrend, Paper};
use crate::prompts;

/// Abstracts quoted per year in the evolution prompt.
const ABSTRACTS_PER_YEAR: usize = 3;

/// Up to [`ABSTRACTS_PER_YEAR`] abstracts per publication year, years ascending,
/// abstracts in paper order.
pub fn abstracts_by_year(papers: &[Paper]) -> Vec<(i32, Vec<&str>)> {
    let mut years: BTreeMap<i32, Vec<&str>> = BTreeMap::new();
    for paper in papers {
        let abstracts = years.entry(paper.published_date.year()).or_default();
        if abstracts.len() < ABSTRACTS_PER_YEAR {
            abstracts.push(paper.abstract_text.as_str());
        }
    }
    years.into_iter().collect()
}

/// `"{first} to {last}"` of the first trend, else of the papers' month span.
pub fn time_period(trends: &[KeywordTrend], papers: &[Paper]) -> String {
    let from_trend = trends
        .first()
        .and_then(|t| Some((t.timestamps.first()?.clone(), t.timestamps.last()?.clone())));
    let bounds = from_trend.or_else(|| {
        let months = timeline::month_span(papers.iter().map(|p| &p.published_date));
        Some((months.first()?.to_string(), months.last()?.to_string()))
    });
    match bounds {
        Some((first, last)) => format!("{first} to {last}"),
        None => String::new(),
    }
}

/// Stage 5a: narrative of how the research direction shifted year over year.
pub struct AnalyzeEvolution {
    generator: Arc<dyn TextGenerator>,
}

impl AnalyzeEvolution {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Stage for AnalyzeEvolution {
    fn name(&self) -> &'static str {
        "analyze_evolution"
    }

    async fn run(&self, state: &mut AnalysisState) -> Result<(), AnalysisError> {
        let yearly = abstracts_by_year(&state.papers);
        let prompt = prompts::research_evolution(&state.topic, &yearly);
        state.research_evolution = self
            .generator
            .generate(&prompt)
            .await
            .map_err(|source| AnalysisError::NarrationFailed {
                section: "research_evolution",
                source,
            })?;
        Ok(())
    }
}

/// Stage 5b: summary of the keyword trends; also fixes `time_period`.
pub struct GenerateSummary {
    generator: Arc<dyn TextGenerator>,
}

impl GenerateSummary {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Stage for GenerateSummary {
    fn name(&self) -> &'static str {
        "generate_summary"
    }

    async fn run(&self, state: &mut AnalysisState) -> Result<(), AnalysisError> {
        let period = time_period(&state.keyword_trends, &state.papers);
        let prompt = prompts::trend_summary(&state.topic, &period, &state.keyword_trends);
        state.trend_summary = self
            .generator
            .generate(&prompt)
            .await
            .map_err(|source| AnalysisError::NarrationFailed {
                section: "trend_summary",
                source,
            })?;
        state.time_period = period;
        Ok(())
    }
}
