use std::collections::{BTreeSet, HashMap, HashSet};

use super::similarity;

/// A representative keyword and the raw variants it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordCluster {
    pub representative: String,
    /// Variants in the order they were grouped; always contains the representative.
    pub variants: Vec<String>,
}

/// Precomputed comparison keys so the O(n^2) pair scan does not re-normalize.
struct SimilarityKey {
    normalized: String,
    words: BTreeSet<String>,
}

impl SimilarityKey {
    fn new(keyword: &str) -> Self {
        Self {
            normalized: similarity::normalize(keyword),
            words: keyword
                .to_lowercase()
                .split_whitespace()
                .map(str::to_string)
                .collect(),
        }
    }

    /// Same predicate as [`similarity::are_similar`].
    fn matches(&self, other: &Self) -> bool {
        self.normalized == other.normalized || self.words == other.words
    }
}

/// Shorter wins, then lexicographically smaller.
fn representative<'a>(a: &'a str, b: &'a str) -> &'a str {
    let key_a = (a.chars().count(), a);
    let key_b = (b.chars().count(), b);
    if key_a <= key_b {
        a
    } else {
        b
    }
}

/// Group near-duplicate keywords with a greedy pairwise scan.
///
/// Pairs are visited in `combinations(keywords, 2)` order over the
/// de-duplicated input. The first similar pair whose members are both still
/// unassigned becomes a two-member cluster; a keyword consumed by an earlier
/// pair is never merged into a later one. Leftovers become singletons, in
/// input order. The result partitions the distinct inputs exactly.
///
/// This is deliberately not a transitive closure: with `a ~ b` and `b ~ c`
/// but `a !~ c`, the outcome depends on input order.
pub fn cluster(keywords: &[String]) -> Vec<KeywordCluster> {
    let mut seen = HashSet::new();
    let distinct: Vec<&str> = keywords
        .iter()
        .map(String::as_str)
        .filter(|k| seen.insert(*k))
        .collect();
    let keys: Vec<SimilarityKey> = distinct.iter().map(|k| SimilarityKey::new(k)).collect();

    let n = distinct.len();
    let mut processed = vec![false; n];
    let mut clusters = Vec::new();

    for i in 0..n {
        for j in (i + 1)..n {
            if processed[i] || processed[j] {
                continue;
            }
            if keys[i].matches(&keys[j]) {
                let rep = representative(distinct[i], distinct[j]);
                clusters.push(KeywordCluster {
                    representative: rep.to_string(),
                    variants: vec![distinct[i].to_string(), distinct[j].to_string()],
                });
                processed[i] = true;
                processed[j] = true;
            }
        }
    }

    for (i, keyword) in distinct.iter().enumerate() {
        if !processed[i] {
            clusters.push(KeywordCluster {
                representative: keyword.to_string(),
                variants: vec![keyword.to_string()],
            });
        }
    }

    clusters
}

/// Cluster representatives only, in cluster order.
pub fn representatives(keywords: &[String]) -> Vec<String> {
    cluster(keywords)
        .into_iter()
        .map(|c| c.representative)
        .collect()
}

/// Rank keywords across documents by how many documents mention them.
///
/// `per_document` holds each document's keyword representatives. Distinct
/// keywords are clustered once more across documents so that variants coming
/// from different documents count together. Clusters are ordered by
/// descending count; ties keep first-seen order. Returns at most `limit`
/// `(representative, count)` pairs.
pub fn rank_keywords(per_document: &[Vec<String>], limit: usize) -> Vec<(String, usize)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new(); // keyword -> (first_seen, count)

    for keywords in per_document {
        let mut in_doc = HashSet::new();
        for keyword in keywords {
            if !in_doc.insert(keyword.as_str()) {
                continue;
            }
            let entry = counts.entry(keyword.clone()).or_insert_with(|| {
                order.push(keyword.clone());
                (order.len() - 1, 0)
            });
            entry.1 += 1;
        }
    }

    let mut ranked: Vec<(String, usize, usize)> = cluster(&order)
        .into_iter()
        .map(|c| {
            let (first_seen, count) = c.variants.iter().fold((usize::MAX, 0), |acc, v| {
                let (seen_at, n) = counts[v];
                (acc.0.min(seen_at), acc.1 + n)
            });
            (c.representative, count, first_seen)
        })
        .collect();

    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked.truncate(limit);
    ranked.into_iter().map(|(k, count, _)| (k, count)).collect()
}
