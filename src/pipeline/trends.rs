use async_trait::async_trait;

use super::Stage;
use crate::algo::timeline::{self, DatedKeywords};
use crate::error::AnalysisError;
use crate::model::{AnalysisState, KeywordTrend, Paper};

/// Stage 4: monthly mention counts for every top keyword.
pub struct AnalyzeTrends;

/// One [`KeywordTrend`] per keyword, in keyword order.
pub fn keyword_trends(papers: &[Paper], keywords: &[String]) -> Vec<KeywordTrend> {
    let docs: Vec<DatedKeywords<'_>> = papers
        .iter()
        .map(|p| DatedKeywords {
            published: p.published_date,
            keywords: &p.keywords,
        })
        .collect();
    let table = timeline::monthly_trends(&docs, keywords);
    let labels = table.labels();

    table
        .rows
        .into_iter()
        .map(|(keyword, frequency)| KeywordTrend {
            keyword,
            frequency,
            timestamps: labels.clone(),
        })
        .collect()
}

#[async_trait]
impl Stage for AnalyzeTrends {
    fn name(&self) -> &'static str {
        "analyze_trends"
    }

    async fn run(&self, state: &mut AnalysisState) -> Result<(), AnalysisError> {
        state.keyword_trends = keyword_trends(&state.papers, &state.top_keywords);
        Ok(())
    }
}
