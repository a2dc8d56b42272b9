//! End-to-end pipeline tests with in-memory collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use arxtrend::config::{Config, KeywordStrategy};
use arxtrend::error::{ErrorKind, LlmError, SourceError};
use arxtrend::llm::TextGenerator;
use arxtrend::source::PaperSource;
use arxtrend::{Analyzer, AnalysisRequest, Paper};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

fn paper(title: &str, abstract_text: &str, published: DateTime<Utc>) -> Paper {
    Paper {
        title: title.into(),
        abstract_text: abstract_text.into(),
        authors: vec!["Ada Lovelace".into(), "Alan Turing".into()],
        published_date: published,
        url: format!("http://arxiv.org/abs/{title}"),
        keywords: vec![],
    }
}

/// Most recent first, as the real source returns them.
fn scenario_papers() -> Vec<Paper> {
    vec![
        paper("Paper C", "Deep nets go deeper.", at(2024, 3, 10)),
        paper("Paper B", "Learning machines learn.", at(2024, 2, 10)),
        paper("Paper A", "Machine learning basics.", at(2024, 1, 10)),
    ]
}

struct FakeSource {
    papers: Vec<Paper>,
    fail: bool,
    calls: AtomicUsize,
}

impl FakeSource {
    fn new(papers: Vec<Paper>) -> Arc<Self> {
        Arc::new(Self {
            papers,
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            papers: vec![],
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl PaperSource for FakeSource {
    async fn search(&self, _topic: &str, max_results: usize) -> Result<Vec<Paper>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SourceError::Status { status: 503 });
        }
        Ok(self.papers.iter().take(max_results).cloned().collect())
    }
}

#[derive(Clone, Copy, PartialEq)]
enum FailOn {
    Nothing,
    Keywords,
    Summary,
}

struct FakeLlm {
    fail_on: FailOn,
    prompts: Mutex<Vec<String>>,
}

impl FakeLlm {
    fn new(fail_on: FailOn) -> Arc<Self> {
        Arc::new(Self {
            fail_on,
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for FakeLlm {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if prompt.starts_with("Analyze the given research paper") {
            if self.fail_on == FailOn::Keywords {
                return Err(LlmError::Timeout { timeout_secs: 30 });
            }
            let reply = if prompt.contains("Title: Paper A\n") {
                "machine learning"
            } else if prompt.contains("Title: Paper B\n") {
                "1. Machine Learnings"
            } else {
                "\"deep learning\""
            };
            return Ok(reply.into());
        }
        if prompt.starts_with("Analyze how the research direction") {
            return Ok("EVOLUTION".into());
        }
        if prompt.starts_with("Analyze these research trends") {
            if self.fail_on == FailOn::Summary {
                return Err(LlmError::Status {
                    status: 500,
                    body: "model not loaded".into(),
                });
            }
            return Ok("SUMMARY".into());
        }
        Err(LlmError::Request {
            message: "unexpected prompt".into(),
        })
    }
}

fn analyzer(source: Arc<FakeSource>, llm: Arc<FakeLlm>) -> Analyzer {
    Analyzer::new(Config::default(), source, llm)
}

#[tokio::test]
async fn full_run_produces_trends_and_narration() {
    let llm = FakeLlm::new(FailOn::Nothing);
    let analyzer = analyzer(FakeSource::new(scenario_papers()), llm.clone());

    let response = analyzer
        .analyze(&AnalysisRequest::new("machine learning"))
        .await
        .unwrap();

    assert_eq!(response.topic, "machine learning");
    assert_eq!(response.total_papers, 3);
    assert_eq!(response.top_keywords, vec!["machine learning", "deep learning"]);

    let ml = &response.keyword_trends[0];
    assert_eq!(ml.keyword, "machine learning");
    assert_eq!(ml.frequency, vec![1, 1, 0]);
    assert_eq!(ml.timestamps, vec!["2024-01", "2024-02", "2024-03"]);
    assert_eq!(response.keyword_trends[1].frequency, vec![0, 0, 1]);

    assert_eq!(response.time_period, "2024-01 to 2024-03");
    assert_eq!(response.trend_summary, "SUMMARY");
    assert_eq!(response.research_evolution, "EVOLUTION");

    // Source order is preserved and each paper carries its representatives.
    assert_eq!(response.papers[0].title, "Paper C");
    assert_eq!(response.papers[0].keywords, vec!["deep learning"]);
    assert_eq!(response.papers[1].keywords, vec!["Machine Learnings"]);
    assert_eq!(response.papers[0].authors, vec!["Ada Lovelace", "Alan Turing"]);

    // Three keyword prompts, then evolution, then summary.
    let prompts = llm.prompts();
    assert_eq!(prompts.len(), 5);
    assert!(prompts[3].contains("Year 2024:"));
    assert!(prompts[4].contains("Time period: 2024-01 to 2024-03"));
    assert!(prompts[4].contains("- machine learning: started at 1 mentions and ended at 0 mentions"));
}

#[tokio::test]
async fn response_serializes_with_boundary_field_names() {
    let analyzer = analyzer(FakeSource::new(scenario_papers()), FakeLlm::new(FailOn::Nothing));
    let response = analyzer
        .analyze(&AnalysisRequest::new("machine learning"))
        .await
        .unwrap();
    let json = serde_json::to_value(&response).unwrap();
    for field in [
        "topic",
        "total_papers",
        "keyword_trends",
        "top_keywords",
        "papers",
        "trend_summary",
        "time_period",
        "research_evolution",
    ] {
        assert!(json.get(field).is_some(), "missing {field}");
    }
    assert!(json["papers"][0].get("abstract").is_some());
}

#[tokio::test]
async fn empty_fetch_fails_before_extraction() {
    let llm = FakeLlm::new(FailOn::Nothing);
    let analyzer = analyzer(FakeSource::new(vec![]), llm.clone());

    let err = analyzer
        .analyze(&AnalysisRequest::new("nothing here"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoPapers);
    assert!(llm.prompts().is_empty());
}

#[tokio::test]
async fn date_window_filters_papers() {
    let analyzer = analyzer(FakeSource::new(scenario_papers()), FakeLlm::new(FailOn::Nothing));
    let mut request = AnalysisRequest::new("machine learning");
    request.start_date = Some(at(2024, 2, 1));
    request.end_date = Some(at(2024, 3, 31));

    let response = analyzer.analyze(&request).await.unwrap();
    assert_eq!(response.total_papers, 2);
    assert_eq!(response.time_period, "2024-02 to 2024-03");
    assert_eq!(response.keyword_trends[0].timestamps, vec!["2024-02", "2024-03"]);
}

#[tokio::test]
async fn date_window_that_excludes_everything_is_no_papers() {
    let llm = FakeLlm::new(FailOn::Nothing);
    let analyzer = analyzer(FakeSource::new(scenario_papers()), llm.clone());
    let mut request = AnalysisRequest::new("machine learning");
    request.start_date = Some(at(2025, 1, 1));

    let err = analyzer.analyze(&request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoPapers);
    assert!(llm.prompts().is_empty());
}

#[tokio::test]
async fn invalid_request_never_reaches_source() {
    let source = FakeSource::new(scenario_papers());
    let analyzer = analyzer(source.clone(), FakeLlm::new(FailOn::Nothing));

    let err = analyzer.analyze(&AnalysisRequest::new("   ")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRequest);

    let mut request = AnalysisRequest::new("robotics");
    request.max_papers = 0;
    let err = analyzer.analyze(&request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRequest);

    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn source_failure_is_source_unavailable() {
    let llm = FakeLlm::new(FailOn::Nothing);
    let analyzer = analyzer(FakeSource::failing(), llm.clone());

    let err = analyzer
        .analyze(&AnalysisRequest::new("robotics"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SourceUnavailable);
    assert!(err.to_string().contains("503"));
    assert!(llm.prompts().is_empty());
}

#[tokio::test]
async fn keyword_failure_aborts_run() {
    let llm = FakeLlm::new(FailOn::Keywords);
    let analyzer = analyzer(FakeSource::new(scenario_papers()), llm.clone());

    let err = analyzer
        .analyze(&AnalysisRequest::new("machine learning"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExtractionFailed);
    assert!(err.to_string().contains("timed out"));
    // No per-paper fallback: the first failure stops everything.
    assert_eq!(llm.prompts().len(), 1);
}

#[tokio::test]
async fn summary_failure_is_narration_failed() {
    let llm = FakeLlm::new(FailOn::Summary);
    let analyzer = analyzer(FakeSource::new(scenario_papers()), llm.clone());

    let err = analyzer
        .analyze(&AnalysisRequest::new("machine learning"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NarrationFailed);
    assert!(err.to_string().contains("model not loaded"));
}

#[tokio::test]
async fn statistical_strategy_skips_keyword_prompts() {
    let llm = FakeLlm::new(FailOn::Keywords);
    let analyzer = analyzer(FakeSource::new(scenario_papers()), llm.clone());
    let mut request = AnalysisRequest::new("machine learning");
    request.strategy = Some(KeywordStrategy::Statistical);

    let response = analyzer.analyze(&request).await.unwrap();
    assert!(!response.top_keywords.is_empty());
    assert!(response.top_keywords.len() <= 10);
    for trend in &response.keyword_trends {
        assert_eq!(trend.frequency.len(), trend.timestamps.len());
    }
    assert_eq!(llm.prompts().len(), 2);
}

#[tokio::test]
async fn max_papers_caps_fetch() {
    let analyzer = analyzer(FakeSource::new(scenario_papers()), FakeLlm::new(FailOn::Nothing));
    let mut request = AnalysisRequest::new("machine learning");
    request.max_papers = 1;

    let response = analyzer.analyze(&request).await.unwrap();
    assert_eq!(response.total_papers, 1);
    assert_eq!(response.top_keywords, vec!["deep learning"]);
    assert_eq!(response.time_period, "2024-03 to 2024-03");
}

#[tokio::test]
async fn concurrent_analyses_are_independent() {
    let analyzer = analyzer(FakeSource::new(scenario_papers()), FakeLlm::new(FailOn::Nothing));
    let a = AnalysisRequest::new("machine learning");
    let mut b = AnalysisRequest::new("deep learning");
    b.max_papers = 1;

    let (ra, rb) = tokio::join!(analyzer.analyze(&a), analyzer.analyze(&b));
    assert_eq!(ra.unwrap().total_papers, 3);
    assert_eq!(rb.unwrap().total_papers, 1);
}

/// Answers every keyword prompt with the same fifteen unrelated keywords.
struct ManyKeywords;

const GREEK: [&str; 15] = [
    "alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta", "iota", "kappa",
    "lambda", "mu", "nu", "xi", "omicron",
];

#[async_trait]
impl TextGenerator for ManyKeywords {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        if prompt.starts_with("Analyze the given research paper") {
            Ok(GREEK.join(", "))
        } else {
            Ok("narrative".into())
        }
    }
}

#[tokio::test]
async fn top_keywords_never_exceed_ten() {
    let mut config = Config::default();
    config.extraction.top_keywords = 15;
    let analyzer = Analyzer::new(config, FakeSource::new(scenario_papers()), Arc::new(ManyKeywords));

    let response = analyzer
        .analyze(&AnalysisRequest::new("greek letters"))
        .await
        .unwrap();
    assert_eq!(response.top_keywords.len(), 10);
    assert_eq!(response.top_keywords, GREEK[..10].to_vec());
    assert_eq!(response.keyword_trends.len(), 10);
}
