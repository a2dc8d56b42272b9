//! Shared operation wrappers for all interfaces (CLI, HTTP, MCP).
//!
//! The offline `op_*` functions are pure, synchronous wrappers around the
//! `algo` modules. Input and output are `serde_json::Value`, with no
//! dependency on clap, axum, or rmcp. [`op_analyze`] is the one async
//! operation: it runs the full pipeline.

use rayon::prelude::*;
use serde_json::Value;

use crate::algo::{clustering, keyphrase, similarity};
use crate::error::AnalysisError;
use crate::model::{self, AnalysisRequest, AnalysisResponse};
use crate::pipeline::{self, Analyzer};

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Extract a text field from a JSON object, returning "" if missing.
pub fn get_text(row: &Value, field: &str) -> String {
    row.get(field)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

/// Join several text fields with newlines, skipping missing ones.
pub fn get_joined_text(row: &Value, fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| get_text(row, f))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Read a string array field; non-string elements are skipped.
fn get_string_list(row: &Value, field: &str) -> Vec<String> {
    row.get(field)
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

// ── Offline operations ───────────────────────────────────────────────────────

pub fn op_normalize(keyword: &str) -> Value {
    serde_json::json!({
        "keyword": keyword,
        "normalized": similarity::normalize(keyword),
    })
}

pub fn op_similarity(a: &str, b: &str) -> Value {
    serde_json::json!({
        "a": a,
        "b": b,
        "normalized_a": similarity::normalize(a),
        "normalized_b": similarity::normalize(b),
        "similar": similarity::are_similar(a, b),
    })
}

pub fn op_cluster(keywords: &[String]) -> Value {
    let clusters: Vec<Value> = clustering::cluster(keywords)
        .into_iter()
        .map(|c| {
            serde_json::json!({
                "representative": c.representative,
                "variants": c.variants,
            })
        })
        .collect();
    Value::Array(clusters)
}

/// Annotate each row with `_keyphrases`: its top TF-IDF terms across all rows.
pub fn op_keyphrases(rows: &[Value], fields: &[&str], count: usize) -> Value {
    if rows.is_empty() {
        return Value::Array(vec![]);
    }

    let texts: Vec<String> = rows.par_iter().map(|r| get_joined_text(r, fields)).collect();
    let phrases = keyphrase::statistical_keyphrases(&texts, count);

    let output: Vec<Value> = rows
        .iter()
        .cloned()
        .zip(phrases)
        .map(|(mut row, phrases)| {
            if let Some(obj) = row.as_object_mut() {
                obj.insert("_keyphrases".into(), serde_json::json!(phrases));
            }
            row
        })
        .collect();

    Value::Array(output)
}

/// Monthly trends over caller-supplied records.
///
/// Each row needs `published_date` (RFC 3339 or `YYYY-MM-DD`) and a
/// `keywords` string array. Row keywords are clustered to representatives
/// first, as the extraction stage does. When `keywords` is `None` the top
/// `top_n` keywords are ranked from the rows.
pub fn op_trends(
    rows: &[Value],
    keywords: Option<&[String]>,
    top_n: usize,
) -> Result<Value, String> {
    let mut papers = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let raw_date = row
            .get("published_date")
            .and_then(|v| v.as_str())
            .ok_or_else(|| format!("row {i}: missing string field 'published_date'"))?;
        let published_date = model::parse_date(raw_date).map_err(|e| format!("row {i}: {e}"))?;
        papers.push(model::Paper {
            title: get_text(row, "title"),
            abstract_text: get_text(row, "abstract"),
            authors: get_string_list(row, "authors"),
            published_date,
            url: get_text(row, "url"),
            keywords: clustering::representatives(&get_string_list(row, "keywords")),
        });
    }

    let top: Vec<String> = match keywords {
        Some(list) => list.to_vec(),
        None => {
            let per_paper: Vec<Vec<String>> = papers.iter().map(|p| p.keywords.clone()).collect();
            clustering::rank_keywords(&per_paper, top_n)
                .into_iter()
                .map(|(k, _)| k)
                .collect()
        }
    };

    let trends = pipeline::keyword_trends(&papers, &top);
    let period = pipeline::time_period(&trends, &papers);

    Ok(serde_json::json!({
        "total_papers": papers.len(),
        "time_period": period,
        "top_keywords": top,
        "keyword_trends": trends,
    }))
}

// ── Pipeline ─────────────────────────────────────────────────────────────────

/// Run a full analysis.
pub async fn op_analyze(
    analyzer: &Analyzer,
    request: &AnalysisRequest,
) -> Result<AnalysisResponse, AnalysisError> {
    analyzer.analyze(request).await
}
