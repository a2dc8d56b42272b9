//! Layered configuration.
//!
//! Uses `figment`: built-in defaults -> optional TOML file -> `ARXTREND_`
//! environment variables -> the `OLLAMA_HOST` variable. The loaded [`Config`]
//! is handed to [`crate::pipeline::Analyzer::new`] and never re-read.

use std::path::Path;
use std::str::FromStr;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::algo::keyphrase::CandidateLimits;
use crate::error::ConfigError;

/// Upper bound on the global top-keyword list.
pub const MAX_TOP_KEYWORDS: usize = 10;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub source: SourceConfig,
    pub extraction: ExtractionConfig,
    pub server: ServerConfig,
}

/// Text-completion service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL; `/api/generate` is appended.
    pub host: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:11434".into(),
            model: "mistral:7b".into(),
            timeout_secs: 30,
        }
    }
}

/// Paper source settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://export.arxiv.org/api/query".into(),
            timeout_secs: 30,
        }
    }
}

/// How per-paper keyword candidates are produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordStrategy {
    /// Ask the language model for a keyword list.
    #[default]
    Llm,
    /// TF-IDF unigram/bigram keyphrases over the fetched set.
    Statistical,
}

impl FromStr for KeywordStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "llm" => Ok(Self::Llm),
            "statistical" | "tfidf" => Ok(Self::Statistical),
            _ => Err(format!("Unknown strategy '{s}'. Use: llm, statistical")),
        }
    }
}

impl KeywordStrategy {

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Llm => "llm",
            Self::Statistical => "statistical",
        }
    }
}

/// Keyword extraction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub strategy: KeywordStrategy,
    /// Raw candidates kept per paper.
    pub max_candidates: usize,
    /// Longer candidate phrases are discarded.
    pub max_phrase_words: usize,
    /// Size of the global top-keyword list, at most [`MAX_TOP_KEYWORDS`].
    pub top_keywords: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            strategy: KeywordStrategy::Llm,
            max_candidates: 15,
            max_phrase_words: 5,
            top_keywords: 10,
        }
    }
}

impl ExtractionConfig {
    pub fn limits(&self) -> CandidateLimits {
        CandidateLimits {
            max_candidates: self.max_candidates,
            max_phrase_words: self.max_phrase_words,
        }
    }
}

/// HTTP boundary settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".into(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// Priority (highest to lowest):
    /// 1. `OLLAMA_HOST`, mapped onto `llm.host`
    /// 2. Environment variables prefixed with `ARXTREND_` (`ARXTREND_LLM__MODEL`)
    /// 3. The TOML file at `path`, when given
    /// 4. Built-in defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment = figment
            .merge(Env::prefixed("ARXTREND_").split("__"))
            .merge(Env::raw().only(&["OLLAMA_HOST"]).map(|_| "llm.host".into()));

        let config: Config = figment
            .extract()
            .map_err(|e| ConfigError::Figment(Box::new(e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make every run fail or misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, message: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                message: message.into(),
            }
        }

        if self.llm.timeout_secs == 0 {
            return Err(invalid("llm.timeout_secs", "must be at least 1"));
        }
        if self.source.timeout_secs == 0 {
            return Err(invalid("source.timeout_secs", "must be at least 1"));
        }
        if self.extraction.max_candidates == 0 {
            return Err(invalid("extraction.max_candidates", "must be at least 1"));
        }
        if self.extraction.max_phrase_words == 0 {
            return Err(invalid("extraction.max_phrase_words", "must be at least 1"));
        }
        if !(1..=MAX_TOP_KEYWORDS).contains(&self.extraction.top_keywords) {
            return Err(invalid(
                "extraction.top_keywords",
                format!(
                    "must be between 1 and {MAX_TOP_KEYWORDS}, got {}",
                    self.extraction.top_keywords
                ),
            ));
        }
        Ok(())
    }
}
