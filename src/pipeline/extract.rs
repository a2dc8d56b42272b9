use std::sync::Arc;

use async_trait::async_trait;

use super::Stage;
use crate::algo::clustering;
use crate::algo::keyphrase::{self, CandidateLimits};
use crate::config::{KeywordStrategy, MAX_TOP_KEYWORDS};
use crate::error::AnalysisError;
use crate::llm::TextGenerator;
use crate::model::AnalysisState;
use crate::prompts;

/// Keyphrases requested from the model, and kept by the statistical extractor.
const KEYWORDS_PER_PAPER: usize = 10;

/// Stage 2: per-paper keywords and the global top list.
pub struct ExtractKeywords {
    generator: Arc<dyn TextGenerator>,
    strategy: KeywordStrategy,
    limits: CandidateLimits,
    top_n: usize,
}

impl ExtractKeywords {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        strategy: KeywordStrategy,
        limits: CandidateLimits,
        top_n: usize,
    ) -> Self {
        Self {
            generator,
            strategy,
            limits,
            top_n: top_n.min(MAX_TOP_KEYWORDS),
        }
    }

    /// Raw candidates per paper, in paper order.
    async fn candidates(&self, state: &AnalysisState) -> Result<Vec<Vec<String>>, AnalysisError> {
        match self.strategy {
            KeywordStrategy::Llm => {
                let mut out = Vec::with_capacity(state.papers.len());
                // Sequential: at most one completion in flight per run.
                for paper in &state.papers {
                    let prompt = prompts::keyword_extraction(
                        paper,
                        self.limits.max_candidates.min(KEYWORDS_PER_PAPER),
                        self.limits.max_phrase_words,
                    );
                    let raw = self
                        .generator
                        .generate(&prompt)
                        .await
                        .map_err(AnalysisError::ExtractionFailed)?;
                    let parsed = keyphrase::parse_keyword_list(&raw, self.limits);
                    if parsed.is_empty() {
                        tracing::warn!(title = %paper.title, "model returned no usable keywords");
                    }
                    out.push(parsed);
                }
                Ok(out)
            }
            KeywordStrategy::Statistical => {
                let texts: Vec<String> = state.papers.iter().map(|p| p.extraction_text()).collect();
                let per_paper = self.limits.max_candidates.min(KEYWORDS_PER_PAPER);
                Ok(keyphrase::statistical_keyphrases(&texts, per_paper))
            }
        }
    }
}

#[async_trait]
impl Stage for ExtractKeywords {
    fn name(&self) -> &'static str {
        "extract_keywords"
    }

    async fn run(&self, state: &mut AnalysisState) -> Result<(), AnalysisError> {
        let candidates = self.candidates(state).await?;

        for (paper, raw) in state.papers.iter_mut().zip(candidates) {
            paper.keywords = clustering::representatives(&raw);
        }

        let per_paper: Vec<Vec<String>> = state.papers.iter().map(|p| p.keywords.clone()).collect();
        state.top_keywords = clustering::rank_keywords(&per_paper, self.top_n)
            .into_iter()
            .map(|(keyword, _)| keyword)
            .collect();

        tracing::debug!(top = ?state.top_keywords, "ranked top keywords");
        Ok(())
    }
}
