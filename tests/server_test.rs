//! HTTP boundary tests, driven through the router with `oneshot`.

#![cfg(feature = "serve")]

use std::sync::Arc;

use arxtrend::config::Config;
use arxtrend::error::{LlmError, SourceError};
use arxtrend::llm::TextGenerator;
use arxtrend::server::router;
use arxtrend::source::PaperSource;
use arxtrend::{Analyzer, Paper};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{TimeZone, Utc};
use tower::ServiceExt;

struct OnePaper;

#[async_trait]
impl PaperSource for OnePaper {
    async fn search(&self, topic: &str, _max_results: usize) -> Result<Vec<Paper>, SourceError> {
        if topic == "offline" {
            return Err(SourceError::Status { status: 503 });
        }
        if topic == "obscure" {
            return Ok(vec![]);
        }
        Ok(vec![Paper {
            title: "Graph Transformers".into(),
            abstract_text: "Attention over graphs.".into(),
            authors: vec!["Grace Hopper".into()],
            published_date: Utc.with_ymd_and_hms(2024, 4, 2, 0, 0, 0).unwrap(),
            url: "http://arxiv.org/abs/2404.00001v1".into(),
            keywords: vec![],
        }])
    }
}

struct Echo;

#[async_trait]
impl TextGenerator for Echo {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        if prompt.starts_with("Analyze the given research paper") {
            Ok("graph transformers, attention".into())
        } else {
            Ok("narrative".into())
        }
    }
}

fn app() -> axum::Router {
    router(Analyzer::new(Config::default(), Arc::new(OnePaper), Arc::new(Echo)))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let resp = ServiceExt::<Request<Body>>::oneshot(app(), request)
        .await
        .unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), 1_000_000)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}

#[tokio::test]
async fn root_welcomes() {
    let (status, json) = send(get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Welcome to arXtrend API");
}

#[tokio::test]
async fn analyze_returns_full_response() {
    let (status, json) = send(post_json("/analyze", r#"{"topic": "graphs", "max_papers": 5}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["topic"], "graphs");
    assert_eq!(json["total_papers"], 1);
    assert_eq!(json["top_keywords"], serde_json::json!(["graph transformers", "attention"]));
    assert_eq!(json["time_period"], "2024-04 to 2024-04");
    assert_eq!(json["trend_summary"], "narrative");
    assert_eq!(json["research_evolution"], "narrative");
    assert_eq!(json["papers"][0]["abstract"], "Attention over graphs.");
}

#[tokio::test]
async fn blank_topic_is_bad_request() {
    let (status, json) = send(post_json("/analyze", r#"{"topic": "  "}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["kind"], "invalid_request");
    assert!(json["error"]["detail"].as_str().unwrap().contains("topic"));
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let (status, json) = send(post_json("/analyze", r#"{"max_papers": 5}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["kind"], "invalid_request");
}

#[tokio::test]
async fn no_papers_is_not_found() {
    let (status, json) = send(post_json("/analyze", r#"{"topic": "obscure"}"#)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["kind"], "no_papers");
}

#[tokio::test]
async fn source_outage_is_bad_gateway() {
    let (status, json) = send(post_json("/analyze", r#"{"topic": "offline"}"#)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"]["kind"], "source_unavailable");
}
