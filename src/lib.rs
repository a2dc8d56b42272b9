//! arxtrend: how has research on a topic evolved recently?
//!
//! Fetches recent arXiv papers, extracts and clusters keywords, counts
//! monthly keyword mentions, and asks a language model to narrate the
//! research evolution and the trends. See [`pipeline::Analyzer`].

pub mod algo;
pub mod config;
pub mod error;
pub mod llm;
pub mod model;
pub mod ops;
pub mod pipeline;
pub mod prompts;
pub mod source;

#[cfg(feature = "serve")]
pub mod server;

#[cfg(feature = "mcp")]
pub mod mcp;

pub use config::Config;
pub use error::{AnalysisError, ErrorKind};
pub use model::{AnalysisRequest, AnalysisResponse, KeywordTrend, Paper};
pub use pipeline::Analyzer;
