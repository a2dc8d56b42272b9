//! MCP (Model Context Protocol) server for arxtrend.
//!
//! Exposes the full topic analysis and the offline keyword operations as MCP
//! tools so that AI assistants can invoke them over stdio JSON-RPC.
//!
//! Start with: `arxtrend --mcp`

use rmcp::{
    handler::server::tool::{ToolCallContext, ToolRouter},
    handler::server::wrapper::Parameters,
    model::*,
    service::RequestContext,
    tool, tool_router, ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::config::{Config, KeywordStrategy};
use crate::error::{AnalysisError, ErrorKind};
use crate::model::{self, AnalysisRequest};
use crate::ops;
use crate::pipeline::Analyzer;

// ── Parameter structs ───────────────────────────────────────────────────────
// Each struct maps 1:1 with a CLI subcommand. `JsonSchema` is required by
// rmcp so that the tool's input schema is auto-generated for the AI client.

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AnalyzeTopicParams {
    /// Research topic to search for, e.g. "graph neural networks".
    pub topic: String,
    /// Keep papers published on or after this date (RFC 3339 or YYYY-MM-DD).
    pub start_date: Option<String>,
    /// Keep papers published on or before this date (RFC 3339 or YYYY-MM-DD).
    pub end_date: Option<String>,
    /// Maximum papers to fetch, most recent first (default: 100).
    #[serde(default = "default_max_papers")]
    pub max_papers: usize,
    /// Keyword strategy: "llm" or "statistical". Defaults to the server config.
    pub strategy: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct NormalizeParams {
    /// Keyword or keyphrase to normalize.
    pub keyword: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SimilarityParams {
    /// First keyword.
    pub a: String,
    /// Second keyword.
    pub b: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ClusterParams {
    /// Keywords to group. Order matters: grouping is greedy over input pairs.
    pub keywords: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TrendsParams {
    /// Paper records with `published_date` and a `keywords` string array.
    pub records: Vec<serde_json::Value>,
    /// Keywords to track. If omitted, the most frequent ones are ranked from the records.
    pub keywords: Option<Vec<String>>,
    /// Number of keywords to rank when `keywords` is omitted (default: 10).
    #[serde(default = "default_top")]
    pub top: usize,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct KeyphrasesParams {
    /// JSON array of objects to extract keyphrases from.
    pub records: Vec<serde_json::Value>,
    /// Text fields joined per record (default: ["title", "abstract"]).
    #[serde(default = "default_fields")]
    pub fields: Vec<String>,
    /// Keyphrases per record (default: 10).
    #[serde(default = "default_top")]
    pub count: usize,
}

fn default_max_papers() -> usize {
    100
}
fn default_top() -> usize {
    10
}
fn default_fields() -> Vec<String> {
    vec!["title".into(), "abstract".into()]
}

// ── Shared helpers ──────────────────────────────────────────────────────────

fn json_text(v: &serde_json::Value) -> String {
    serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
}

fn join_error(e: tokio::task::JoinError) -> McpError {
    McpError::internal_error(format!("task join error: {e}"), None)
}

fn analysis_error(err: AnalysisError) -> McpError {
    let data = Some(serde_json::json!({ "kind": err.kind() }));
    match err.kind() {
        ErrorKind::InvalidRequest => McpError::invalid_params(err.to_string(), data),
        _ => McpError::internal_error(err.to_string(), data),
    }
}

fn build_request(p: AnalyzeTopicParams) -> Result<AnalysisRequest, String> {
    let parse = |d: Option<String>| d.as_deref().map(model::parse_date).transpose();
    let strategy = p
        .strategy
        .as_deref()
        .map(str::parse::<KeywordStrategy>)
        .transpose()?;
    Ok(AnalysisRequest {
        topic: p.topic,
        start_date: parse(p.start_date)?,
        end_date: parse(p.end_date)?,
        max_papers: p.max_papers,
        strategy,
    })
}

// ── MCP Server ──────────────────────────────────────────────────────────────

/// The MCP server struct: the tool router plus a shared analyzer.
#[derive(Clone)]
pub struct ArxtrendMcp {
    analyzer: Analyzer,
    #[allow(dead_code)] // accessed at runtime by the #[tool_router] macro
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ArxtrendMcp {
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer,
            tool_router: Self::tool_router(),
        }
    }

    // ── analyze_topic ───────────────────────────────────────────────────

    #[tool(
        name = "analyze_topic",
        description = "Fetch the most recent arXiv papers on a topic, extract and cluster keywords, compute monthly keyword trends, and narrate research evolution and a trend summary with the configured language model. Returns topic, total_papers, top_keywords, keyword_trends, papers, trend_summary, time_period and research_evolution."
    )]
    async fn analyze_topic(
        &self,
        params: Parameters<AnalyzeTopicParams>,
    ) -> Result<CallToolResult, McpError> {
        let request = build_request(params.0).map_err(|e| McpError::invalid_params(e, None))?;
        let response = ops::op_analyze(&self.analyzer, &request)
            .await
            .map_err(analysis_error)?;
        let value = serde_json::to_value(&response)
            .map_err(|e| McpError::internal_error(format!("serialize error: {e}"), None))?;
        Ok(CallToolResult::success(vec![Content::text(json_text(
            &value,
        ))]))
    }

    // ── normalize_keyword ───────────────────────────────────────────────

    #[tool(
        name = "normalize_keyword",
        description = "Normalize a keyword: lowercase, trim, and strip plural suffixes (ies -> y, es, s). Returns the original and normalized forms."
    )]
    async fn normalize_keyword(
        &self,
        params: Parameters<NormalizeParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = ops::op_normalize(&params.0.keyword);
        Ok(CallToolResult::success(vec![Content::text(json_text(
            &result,
        ))]))
    }

    // ── keyword_similarity ──────────────────────────────────────────────

    #[tool(
        name = "keyword_similarity",
        description = "Check whether two keywords are near-duplicates: equal after normalization, or made of the same set of words in any order."
    )]
    async fn keyword_similarity(
        &self,
        params: Parameters<SimilarityParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let result = ops::op_similarity(&p.a, &p.b);
        Ok(CallToolResult::success(vec![Content::text(json_text(
            &result,
        ))]))
    }

    // ── cluster_keywords ────────────────────────────────────────────────

    #[tool(
        name = "cluster_keywords",
        description = "Group near-duplicate keywords with a greedy pairwise scan. Returns clusters with a representative (shortest, then alphabetically first) and its variants. Every input keyword appears in exactly one cluster."
    )]
    async fn cluster_keywords(
        &self,
        params: Parameters<ClusterParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let result = tokio::task::spawn_blocking(move || ops::op_cluster(&p.keywords))
            .await
            .map_err(join_error)?;
        Ok(CallToolResult::success(vec![Content::text(json_text(
            &result,
        ))]))
    }

    // ── keyword_trends ──────────────────────────────────────────────────

    #[tool(
        name = "keyword_trends",
        description = "Compute monthly keyword trends over paper records without any network access. Each record needs `published_date` and `keywords`. Months span the earliest to latest date with zero-filled gaps."
    )]
    async fn keyword_trends(
        &self,
        params: Parameters<TrendsParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let result = tokio::task::spawn_blocking(move || {
            ops::op_trends(&p.records, p.keywords.as_deref(), p.top)
        })
        .await
        .map_err(join_error)?
        .map_err(|e| McpError::invalid_params(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(json_text(
            &result,
        ))]))
    }

    // ── extract_keyphrases ──────────────────────────────────────────────

    #[tool(
        name = "extract_keyphrases",
        description = "Extract statistical keyphrases (TF-IDF scored unigrams and bigrams, stopwords removed) per record. Returns the input records with an added `_keyphrases` column."
    )]
    async fn extract_keyphrases(
        &self,
        params: Parameters<KeyphrasesParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let result = tokio::task::spawn_blocking(move || {
            let fields: Vec<&str> = p.fields.iter().map(String::as_str).collect();
            ops::op_keyphrases(&p.records, &fields, p.count)
        })
        .await
        .map_err(join_error)?;
        Ok(CallToolResult::success(vec![Content::text(json_text(
            &result,
        ))]))
    }
}

impl ServerHandler for ArxtrendMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Research trend analysis over recent arXiv papers. Tools: analyze_topic, \
                 normalize_keyword, keyword_similarity, cluster_keywords, keyword_trends, \
                 extract_keyphrases. analyze_topic needs network access and a language model; \
                 the others are offline."
                    .into(),
            ),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: None }),
                ..Default::default()
            },
            server_info: Implementation {
                name: "arxtrend".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: Some("arXtrend".into()),
                description: Some(
                    "Research trend analysis: keyword clustering, monthly trends, and LLM narration"
                        .into(),
                ),
                icons: None,
                website_url: None,
            },
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult {
            tools: self.tool_router.list_all(),
            next_cursor: None,
            meta: Default::default(),
        }))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        let tool_context = ToolCallContext::new(self, request, context);
        async move { self.tool_router.call(tool_context).await }
    }

    fn get_tool(&self, name: &str) -> Option<Tool> {
        self.tool_router.get(name).cloned()
    }
}

// ── Entry point ─────────────────────────────────────────────────────────────

/// Start the MCP server on stdio. Called from `cli.rs` when `--mcp` is passed.
pub async fn serve_stdio(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let analyzer = Analyzer::from_config(config)?;
    let server = ArxtrendMcp::new(analyzer);
    let transport = rmcp::transport::io::stdio();
    let service = server.serve(transport).await.inspect_err(|e| {
        tracing::error!("MCP serve error: {e}");
    })?;
    service.waiting().await?;
    Ok(())
}
