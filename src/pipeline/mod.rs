//! The five-stage analysis pipeline.
//!
//! Stages run strictly in order over one [`AnalysisState`]:
//!
//! ```text
//! fetch_papers -> extract_keywords -> analyze_trends -> analyze_evolution -> generate_summary
//! ```
//!
//! Any stage error aborts the run; there is no partial result.

mod extract;
mod fetch;
mod narrate;
mod trends;

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::config::{Config, KeywordStrategy};
use crate::error::{AnalysisError, ConfigError};
use crate::llm::{OllamaClient, TextGenerator};
use crate::model::{AnalysisRequest, AnalysisResponse, AnalysisState};
use crate::source::{ArxivSource, PaperSource};

pub use extract::ExtractKeywords;
pub use fetch::FetchPapers;
pub use narrate::{abstracts_by_year, time_period, AnalyzeEvolution, GenerateSummary};
pub use trends::{keyword_trends, AnalyzeTrends};

/// One step of the pipeline. A stage writes only the state fields it owns.
#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, state: &mut AnalysisState) -> Result<(), AnalysisError>;
}

/// Runs analyses against a paper source and a text generator.
///
/// Holds no per-request state; clones share the collaborators and may run
/// concurrently for independent topics.
#[derive(Clone)]
pub struct Analyzer {
    config: Arc<Config>,
    source: Arc<dyn PaperSource>,
    generator: Arc<dyn TextGenerator>,
}

impl Analyzer {
    pub fn new(
        config: Config,
        source: Arc<dyn PaperSource>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            source,
            generator,
        }
    }

    /// Analyzer backed by arXiv and an Ollama-compatible endpoint.
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let source = ArxivSource::new(&config.source).map_err(|e| ConfigError::Client {
            client: "arXiv",
            message: e.to_string(),
        })?;
        let generator = OllamaClient::new(&config.llm).map_err(|e| ConfigError::Client {
            client: "LLM",
            message: e.to_string(),
        })?;
        Ok(Self::new(config, Arc::new(source), Arc::new(generator)))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The ordered stage list for one run.
    pub fn stages(&self, strategy: KeywordStrategy) -> Vec<Box<dyn Stage>> {
        let extraction = &self.config.extraction;
        vec![
            Box::new(FetchPapers::new(self.source.clone())),
            Box::new(ExtractKeywords::new(
                self.generator.clone(),
                strategy,
                extraction.limits(),
                extraction.top_keywords,
            )),
            Box::new(AnalyzeTrends),
            Box::new(AnalyzeEvolution::new(self.generator.clone())),
            Box::new(GenerateSummary::new(self.generator.clone())),
        ]
    }

    /// Validate `request`, run every stage in order, and collect the result.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, AnalysisError> {
        request.validate().map_err(AnalysisError::InvalidRequest)?;

        let strategy = request.strategy.unwrap_or(self.config.extraction.strategy);
        let mut state = AnalysisState::new(request);
        let started = Instant::now();

        for stage in self.stages(strategy) {
            let stage_started = Instant::now();
            if let Err(err) = stage.run(&mut state).await {
                tracing::error!(stage = stage.name(), kind = %err.kind(), error = %err, "stage failed");
                return Err(err);
            }
            tracing::info!(
                stage = stage.name(),
                elapsed_secs = format_args!("{:.2}", stage_started.elapsed().as_secs_f64()),
                papers = state.papers.len(),
                "stage complete"
            );
        }

        tracing::info!(
            topic = %state.topic,
            strategy = strategy.as_str(),
            elapsed_secs = format_args!("{:.2}", started.elapsed().as_secs_f64()),
            papers = state.papers.len(),
            "analysis complete"
        );
        Ok(state.into_response())
    }
}
