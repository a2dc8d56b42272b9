//! Raw keyphrase candidates: statistical extraction and cleanup of
//! language-model keyword lists.

use std::collections::HashSet;
use std::sync::LazyLock;

use rayon::prelude::*;
use regex::Regex;

use super::{tfidf, tokenizer};

/// Leading list markers: "1.", "2)", "-", "*", "•".
static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:\d+\s*[.)]|[-*•])\s*").expect("valid list marker regex"));

/// A leading "Keywords:" label some models prepend.
static LABEL_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:key\s*words?|keyphrases?)\s*:\s*").expect("valid label regex")
});

/// Limits applied to raw candidates before clustering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateLimits {
    /// Maximum candidates kept per paper.
    pub max_candidates: usize,
    /// Maximum words per phrase; longer phrases are discarded.
    pub max_phrase_words: usize,
}

impl Default for CandidateLimits {
    fn default() -> Self {
        Self {
            max_candidates: 15,
            max_phrase_words: 5,
        }
    }
}

/// Split a model's keyword list into clean candidate phrases.
///
/// Accepts comma- or newline-separated output, strips list markers, labels,
/// quotes and trailing punctuation, and drops blanks, exact repeats and
/// phrases over the word limit. Order is preserved.
pub fn parse_keyword_list(raw: &str, limits: CandidateLimits) -> Vec<String> {
    let body = LABEL_PREFIX.replace(raw.trim(), "");
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for piece in body.split([',', '\n', ';']) {
        let cleaned = clean_phrase(piece);
        if cleaned.is_empty() {
            continue;
        }
        let words = cleaned.split_whitespace().count();
        if words > limits.max_phrase_words {
            tracing::debug!(phrase = %cleaned, words, "dropping over-long keyword candidate");
            continue;
        }
        if seen.insert(cleaned.clone()) {
            out.push(cleaned);
        }
        if out.len() >= limits.max_candidates {
            break;
        }
    }
    out
}

fn clean_phrase(piece: &str) -> String {
    let unlisted = LIST_MARKER.replace(piece, "");
    let trimmed = unlisted
        .trim()
        .trim_end_matches(|c: char| is_quote(c) || matches!(c, '.' | ':'))
        .trim_start_matches(is_quote)
        .trim();
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_quote(c: char) -> bool {
    matches!(c, '"' | '\'' | '`' | '“' | '”' | '*')
}

/// Top TF-IDF unigram/bigram terms per text, scored against the whole set.
///
/// Stopwords break phrases, so every term is a run of adjacent content words
/// from the source. Returns one list per input text, best first.
pub fn statistical_keyphrases(texts: &[String], per_text: usize) -> Vec<Vec<String>> {
    let documents: Vec<Vec<String>> = texts
        .par_iter()
        .map(|t| tokenizer::candidate_terms(t))
        .collect();
    let corpus = tfidf::Corpus::from_documents(&documents);

    (0..documents.len())
        .map(|i| {
            corpus
                .top_terms(i, per_text)
                .into_iter()
                .map(|(term, _)| term)
                .collect()
        })
        .collect()
}
