//! HTTP boundary.
//!
//! `GET /` returns a welcome message; `POST /analyze` runs one analysis.
//! Failures render as `{"error": {"kind", "detail"}}` with a status code
//! chosen by the error kind.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::AnalysisError;
use crate::model::{AnalysisRequest, AnalysisResponse};
use crate::ops;
use crate::pipeline::Analyzer;

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status =
            StatusCode::from_u16(kind.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = json!({
            "error": {
                "kind": kind,
                "detail": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Welcome to arXtrend API" }))
}

async fn analyze(
    State(analyzer): State<Analyzer>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, AnalysisError> {
    let Json(request) = payload.map_err(|e| AnalysisError::InvalidRequest(e.body_text()))?;
    tracing::info!(topic = %request.topic, max_papers = request.max_papers, "analyze request");
    let response = ops::op_analyze(&analyzer, &request).await?;
    Ok(Json(response))
}

/// Build the router. Permissive CORS; every request is traced.
pub fn router(analyzer: Analyzer) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/analyze", post(analyze))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(analyzer)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn run(analyzer: Analyzer, addr: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "arxtrend API listening");
    axum::serve(listener, router(analyzer)).await
}
