use std::io::{self, Read};
use std::path::PathBuf;

use arxtrend::config::{Config, KeywordStrategy};
use arxtrend::model::{self, AnalysisRequest};
use arxtrend::{ops, Analyzer};
use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(
    name = "arxtrend",
    version,
    about = "Research trend analysis over recent arXiv papers"
)]
struct Cli {
    /// Start as an MCP (Model Context Protocol) server on stdio.
    /// AI assistants connect via JSON-RPC.
    #[cfg(feature = "mcp")]
    #[arg(long, exclusive = true)]
    mcp: bool,

    /// TOML configuration file. `ARXTREND_*` and `OLLAMA_HOST` override it.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch recent papers on a topic and analyze keyword trends
    Analyze {
        /// Research topic, e.g. "graph neural networks"
        topic: String,
        /// Keep papers published on or after this date (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<String>,
        /// Keep papers published on or before this date (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<String>,
        /// Maximum papers to fetch, most recent first
        #[arg(short = 'n', long, default_value_t = 100)]
        max_papers: usize,
        /// Keyword strategy: llm, statistical (default: from config)
        #[arg(short, long)]
        strategy: Option<String>,
    },
    /// Serve the HTTP API
    #[cfg(feature = "serve")]
    Serve {
        /// Address to bind (default: from config)
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Normalize a keyword (lowercase, trim, strip plurals)
    Normalize {
        /// Keyword to normalize
        keyword: String,
    },
    /// Check whether two keywords are near-duplicates
    Similarity {
        /// First keyword
        a: String,
        /// Second keyword
        b: String,
    },
    /// Group near-duplicate keywords (arguments, or a JSON string array on stdin)
    Cluster {
        /// Keywords to group, in order
        keywords: Vec<String>,
    },
    /// Extract TF-IDF keyphrases from JSON records on stdin
    Keyphrases {
        /// Comma-separated text fields joined per record
        #[arg(short, long, default_value = "title,abstract")]
        fields: String,
        /// Keyphrases per record
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,
    },
    /// Monthly keyword trends over JSON paper records on stdin
    Trends {
        /// Comma-separated keywords to track (default: rank from the records)
        #[arg(short, long)]
        keywords: Option<String>,
        /// Number of keywords to rank when --keywords is omitted
        #[arg(short, long, default_value_t = 10)]
        top: usize,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).unwrap_or_else(|e| fail(e));

    // ── MCP server mode ─────────────────────────────────────────────────
    #[cfg(feature = "mcp")]
    if cli.mcp {
        runtime().block_on(async {
            if let Err(e) = arxtrend::mcp::serve_stdio(config).await {
                fail(format!("MCP server error: {e}"));
            }
        });
        return;
    }

    // ── Normal subcommand dispatch ──────────────────────────────────────
    let command = cli.command.unwrap_or_else(|| {
        fail("No subcommand provided. Run `arxtrend --help` for usage.");
    });

    match command {
        Commands::Analyze {
            topic,
            start_date,
            end_date,
            max_papers,
            strategy,
        } => cmd_analyze(config, topic, start_date, end_date, max_papers, strategy),
        #[cfg(feature = "serve")]
        Commands::Serve { bind } => cmd_serve(config, bind),
        Commands::Normalize { keyword } => print_json(&ops::op_normalize(&keyword)),
        Commands::Similarity { a, b } => print_json(&ops::op_similarity(&a, &b)),
        Commands::Cluster { keywords } => cmd_cluster(keywords),
        Commands::Keyphrases { fields, count } => cmd_keyphrases(&fields, count),
        Commands::Trends { keywords, top } => cmd_trends(keywords.as_deref(), top),
    }
}

/// Logs go to stderr so stdout stays clean for JSON and the MCP transport.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Runtime::new()
        .unwrap_or_else(|e| fail(format!("failed to create tokio runtime: {e}")))
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => fail(format!("failed to serialize output: {e}")),
    }
}

fn read_stdin_json() -> Vec<Value> {
    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        fail(format!("failed to read stdin: {e}"));
    }
    let parsed: Value =
        serde_json::from_str(&buf).unwrap_or_else(|e| fail(format!("invalid JSON on stdin: {e}")));
    match parsed {
        Value::Array(arr) => arr,
        single => vec![single],
    }
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn cmd_analyze(
    config: Config,
    topic: String,
    start_date: Option<String>,
    end_date: Option<String>,
    max_papers: usize,
    strategy: Option<String>,
) {
    let parse = |d: Option<String>| {
        d.as_deref()
            .map(model::parse_date)
            .transpose()
            .unwrap_or_else(|e| fail(e))
    };
    let strategy = strategy.map(|s| s.parse::<KeywordStrategy>().unwrap_or_else(|e| fail(e)));
    let request = AnalysisRequest {
        topic,
        start_date: parse(start_date),
        end_date: parse(end_date),
        max_papers,
        strategy,
    };

    let analyzer = Analyzer::from_config(config).unwrap_or_else(|e| fail(e));
    let result = runtime().block_on(ops::op_analyze(&analyzer, &request));
    match result {
        Ok(response) => match serde_json::to_value(&response) {
            Ok(value) => print_json(&value),
            Err(e) => fail(format!("failed to serialize output: {e}")),
        },
        Err(e) => fail(format!("analysis failed [{}]: {e}", e.kind())),
    }
}

#[cfg(feature = "serve")]
fn cmd_serve(config: Config, bind: Option<String>) {
    let addr = bind.unwrap_or_else(|| config.server.bind.clone());
    let analyzer = Analyzer::from_config(config).unwrap_or_else(|e| fail(e));
    if let Err(e) = runtime().block_on(arxtrend::server::run(analyzer, &addr)) {
        fail(format!("server error: {e}"));
    }
}

fn cmd_cluster(keywords: Vec<String>) {
    let keywords = if keywords.is_empty() {
        read_stdin_json()
            .into_iter()
            .map(|v| match v {
                Value::String(s) => s,
                other => fail(format!("expected a JSON array of strings, got {other}")),
            })
            .collect()
    } else {
        keywords
    };
    print_json(&ops::op_cluster(&keywords));
}

fn cmd_keyphrases(fields: &str, count: usize) {
    let rows = read_stdin_json();
    let fields = split_list(fields);
    let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
    print_json(&ops::op_keyphrases(&rows, &fields, count));
}

fn cmd_trends(keywords: Option<&str>, top: usize) {
    let rows = read_stdin_json();
    let keywords = keywords.map(split_list);
    match ops::op_trends(&rows, keywords.as_deref(), top) {
        Ok(value) => print_json(&value),
        Err(e) => fail(e),
    }
}
