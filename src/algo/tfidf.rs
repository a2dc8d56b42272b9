use std::cmp::Ordering;
use std::collections::HashMap;

/// Term statistics over a set of paper texts, used to score keyphrases.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    /// document index -> term -> count
    doc_terms: Vec<HashMap<String, u32>>,
    /// term -> number of documents containing it
    doc_freq: HashMap<String, u32>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a corpus from pre-extracted candidate terms, one list per document.
    pub fn from_documents(documents: &[Vec<String>]) -> Self {
        let mut corpus = Self::new();
        for terms in documents {
            corpus.add_document(terms);
        }
        corpus
    }

    /// Add a document (as candidate terms) to the corpus.
    pub fn add_document(&mut self, terms: &[String]) {
        let mut term_counts: HashMap<String, u32> = HashMap::new();
        for term in terms {
            *term_counts.entry(term.clone()).or_insert(0) += 1;
        }
        for term in term_counts.keys() {
            *self.doc_freq.entry(term.clone()).or_insert(0) += 1;
        }
        self.doc_terms.push(term_counts);
    }

    /// Smoothed IDF: ln((1 + N) / (1 + df)) + 1. Always positive.
    pub fn idf(&self, term: &str) -> f64 {
        let df = *self.doc_freq.get(term).unwrap_or(&0) as f64;
        let n = self.doc_terms.len() as f64;
        ((1.0 + n) / (1.0 + df)).ln() + 1.0
    }

    /// TF-IDF weight of every term in the document at `doc_idx`.
    pub fn tfidf_vector(&self, doc_idx: usize) -> HashMap<String, f64> {
        let Some(doc) = self.doc_terms.get(doc_idx) else {
            return HashMap::new();
        };
        let dl: u32 = doc.values().sum();
        doc.iter()
            .map(|(term, &count)| {
                let tf = count as f64 / dl as f64;
                (term.clone(), tf * self.idf(term))
            })
            .collect()
    }

    /// Top-N terms by TF-IDF weight, highest first.
    ///
    /// Equal weights are ordered alphabetically so the result does not depend
    /// on hash-map iteration order.
    pub fn top_terms(&self, doc_idx: usize, n: usize) -> Vec<(String, f64)> {
        let mut weighted: Vec<(String, f64)> = self.tfidf_vector(doc_idx).into_iter().collect();
        weighted.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        weighted.truncate(n);
        weighted
    }
}
