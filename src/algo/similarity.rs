//! Surface-level keyword equivalence.
//!
//! Two keyword phrases are treated as the same concept when they agree after
//! a lightweight singularization, or when they contain the same words in a
//! different order. No dictionary, no stemmer: the rules are cheap and
//! predictable, and they are intentionally not transitive.

use std::collections::BTreeSet;

/// Canonical form of a keyword: lowercase, trimmed, trailing plural stripped.
///
/// Exactly one suffix rule is applied, first match wins:
/// `ies` -> `y`, else `es` -> ``, else `s` -> ``. A single pass is not
/// idempotent for words like "glasses" ("glasses" -> "glass" -> "glas").
pub fn normalize(keyword: &str) -> String {
    let lowered = keyword.to_lowercase();
    let trimmed = lowered.trim();
    strip_plural(trimmed).unwrap_or_else(|| trimmed.to_string())
}

fn strip_plural(word: &str) -> Option<String> {
    if let Some(stem) = word.strip_suffix("ies") {
        Some(format!("{stem}y"))
    } else if let Some(stem) = word.strip_suffix("es") {
        Some(stem.to_string())
    } else {
        word.strip_suffix('s').map(str::to_string)
    }
}

fn word_set(keyword: &str) -> BTreeSet<String> {
    keyword
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// True when `a` and `b` name the same concept.
///
/// Matches on equal [`normalize`] forms, or on equal sets of lowercased
/// whitespace-separated words ("NLP techniques" ~ "techniques NLP").
pub fn are_similar(a: &str, b: &str) -> bool {
    if normalize(a) == normalize(b) {
        return true;
    }
    word_set(a) == word_set(b)
}
