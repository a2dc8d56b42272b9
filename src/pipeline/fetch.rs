use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::Stage;
use crate::error::AnalysisError;
use crate::model::{AnalysisState, Paper};
use crate::source::PaperSource;

/// Stage 1: the most recent papers for the topic, narrowed to the date window.
pub struct FetchPapers {
    source: Arc<dyn PaperSource>,
}

impl FetchPapers {
    pub fn new(source: Arc<dyn PaperSource>) -> Self {
        Self { source }
    }
}

/// Keep papers published inside `[start, end]`; open bounds are unbounded.
pub(crate) fn within_window(
    papers: Vec<Paper>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Vec<Paper> {
    papers
        .into_iter()
        .filter(|p| start.map_or(true, |s| p.published_date >= s))
        .filter(|p| end.map_or(true, |e| p.published_date <= e))
        .collect()
}

#[async_trait]
impl Stage for FetchPapers {
    fn name(&self) -> &'static str {
        "fetch_papers"
    }

    async fn run(&self, state: &mut AnalysisState) -> Result<(), AnalysisError> {
        let fetched = self.source.search(&state.topic, state.max_papers).await?;
        let total = fetched.len();
        let papers = within_window(fetched, state.start_date, state.end_date);
        if papers.len() != total {
            tracing::debug!(
                fetched = total,
                kept = papers.len(),
                "applied publication date window"
            );
        }

        if papers.is_empty() {
            return Err(AnalysisError::NoPapers {
                topic: state.topic.clone(),
            });
        }
        state.papers = papers;
        Ok(())
    }
}
