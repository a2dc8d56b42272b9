use unicode_segmentation::UnicodeSegmentation;

/// Split text into runs of adjacent content words.
///
/// A stopword, a numeric or one-letter token, or punctuation ends the current
/// run, so phrases built from a run never bridge words that were not adjacent
/// in the source text ("learning for robots" yields two runs, not
/// "learning robots").
pub fn phrase_segments(text: &str) -> Vec<Vec<String>> {
    let mut segments = Vec::new();
    let mut current: Vec<String> = Vec::new();
    for piece in text.split_word_bounds() {
        if piece.chars().all(char::is_whitespace) {
            continue;
        }
        let lower = piece.to_lowercase();
        let is_word = piece.chars().any(char::is_alphanumeric);
        if is_word && is_content_word(&lower) {
            current.push(lower);
        } else if !current.is_empty() {
            segments.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Generate word n-grams from a token list.
pub fn word_ngrams(tokens: &[String], n: usize) -> Vec<String> {
    if n == 0 || tokens.len() < n {
        return Vec::new();
    }
    tokens.windows(n).map(|w| w.join(" ")).collect()
}

/// Unigram and bigram candidate terms for keyphrase scoring.
pub fn candidate_terms(text: &str) -> Vec<String> {
    let mut terms = Vec::new();
    for segment in phrase_segments(text) {
        terms.extend(segment.iter().cloned());
        terms.extend(word_ngrams(&segment, 2));
    }
    terms
}

fn is_content_word(word: &str) -> bool {
    word.chars().count() >= 2 && !word.chars().all(|c| c.is_numeric()) && !is_stopword(word)
}

fn is_stopword(word: &str) -> bool {
    matches!(
        word,
        "a" | "an" | "the" | "is" | "it" | "of" | "to" | "in" | "for" | "on" | "with"
        | "at" | "by" | "from" | "as" | "or" | "and" | "but" | "not" | "be" | "are"
        | "was" | "were" | "been" | "being" | "have" | "has" | "had" | "do" | "does"
        | "did" | "will" | "would" | "could" | "should" | "may" | "might" | "shall"
        | "can" | "this" | "that" | "these" | "those" | "there" | "here" | "where"
        | "when" | "what" | "which" | "who" | "whom" | "how" | "all" | "each" | "every"
        | "both" | "few" | "more" | "most" | "other" | "some" | "such" | "no" | "nor"
        | "only" | "own" | "same" | "so" | "than" | "too" | "very" | "just" | "because"
        | "about" | "into" | "through" | "during" | "before" | "after" | "above" | "below"
        | "between" | "under" | "again" | "further" | "then" | "once" | "any" | "its"
        | "your" | "our" | "their" | "his" | "her" | "my" | "if" | "up" | "out" | "also"
        | "we" | "us" | "they" | "them" | "while" | "however" | "thus" | "via" | "using"
        | "paper" | "propose" | "proposed" | "present" | "show" | "shows" | "based"
        | "well" | "new" | "novel" | "results" | "work" | "within" | "without" | "across"
    )
}
