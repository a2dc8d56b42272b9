use std::fmt;

use chrono::{DateTime, Datelike, Utc};

use super::similarity;

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    /// 1-based month.
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        debug_assert!((1..=12).contains(&month));
        Self { year, month }
    }

    pub fn of(date: &DateTime<Utc>) -> Self {
        Self::new(date.year(), date.month())
    }

    /// The following calendar month.
    pub fn succ(self) -> Self {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    /// Months elapsed since `earlier`; zero when `earlier` is not earlier.
    pub fn months_since(self, earlier: Self) -> usize {
        let a = self.year as i64 * 12 + self.month as i64;
        let b = earlier.year as i64 * 12 + earlier.month as i64;
        (a - b).max(0) as usize
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Every month from the earliest to the latest date, inclusive.
///
/// Months with no dates still get an entry. Empty input yields no months.
pub fn month_span<'a>(dates: impl IntoIterator<Item = &'a DateTime<Utc>>) -> Vec<YearMonth> {
    let mut bounds: Option<(YearMonth, YearMonth)> = None;
    for date in dates {
        let ym = YearMonth::of(date);
        bounds = Some(match bounds {
            None => (ym, ym),
            Some((lo, hi)) => (lo.min(ym), hi.max(ym)),
        });
    }
    let Some((first, last)) = bounds else {
        return Vec::new();
    };

    let mut months = Vec::with_capacity(last.months_since(first) + 1);
    let mut current = first;
    while current <= last {
        months.push(current);
        current = current.succ();
    }
    months
}

/// A document's publication date and its keyword representatives.
#[derive(Debug, Clone, Copy)]
pub struct DatedKeywords<'a> {
    pub published: DateTime<Utc>,
    pub keywords: &'a [String],
}

/// Monthly mention counts for a list of keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendTable {
    pub months: Vec<YearMonth>,
    /// One row per keyword, in input order; each row has one count per month.
    pub rows: Vec<(String, Vec<usize>)>,
}

impl TrendTable {
    pub fn labels(&self) -> Vec<String> {
        self.months.iter().map(ToString::to_string).collect()
    }
}

/// Count, per keyword and month, the documents with at least one similar keyword.
///
/// Buckets span the documents' full date range; a document contributes at
/// most one to a keyword's count in its month.
pub fn monthly_trends(docs: &[DatedKeywords<'_>], keywords: &[String]) -> TrendTable {
    let months = month_span(docs.iter().map(|d| &d.published));
    let Some(&first) = months.first() else {
        return TrendTable {
            months,
            rows: keywords.iter().map(|k| (k.clone(), Vec::new())).collect(),
        };
    };

    let rows = keywords
        .iter()
        .map(|keyword| {
            let mut counts = vec![0usize; months.len()];
            for doc in docs {
                if doc
                    .keywords
                    .iter()
                    .any(|k| similarity::are_similar(keyword, k))
                {
                    counts[YearMonth::of(&doc.published).months_since(first)] += 1;
                }
            }
            (keyword.clone(), counts)
        })
        .collect();

    TrendTable { months, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    fn kws(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn display_pads() {
        assert_eq!(YearMonth::new(2024, 3).to_string(), "2024-03");
        assert_eq!(YearMonth::new(987, 11).to_string(), "0987-11");
    }

    #[test]
    fn succ_rolls_over_year() {
        assert_eq!(YearMonth::new(2023, 12).succ(), YearMonth::new(2024, 1));
        assert_eq!(YearMonth::new(2024, 1).succ(), YearMonth::new(2024, 2));
    }

    #[test]
    fn span_fills_gaps_across_years() {
        let dates = [at(2024, 2, 1), at(2023, 11, 30)];
        let labels: Vec<String> = month_span(&dates).iter().map(|m| m.to_string()).collect();
        assert_eq!(labels, vec!["2023-11", "2023-12", "2024-01", "2024-02"]);
    }

    #[test]
    fn span_single_month() {
        let dates = [at(2024, 5, 1), at(2024, 5, 31)];
        assert_eq!(month_span(&dates), vec![YearMonth::new(2024, 5)]);
    }

    #[test]
    fn span_empty() {
        let dates: [DateTime<Utc>; 0] = [];
        assert!(month_span(&dates).is_empty());
    }

    #[test]
    fn trends_count_similar_keywords() {
        let a = kws(&["machine learning"]);
        let b = kws(&["Machine Learnings"]);
        let c = kws(&["deep learning"]);
        let docs = [
            DatedKeywords { published: at(2024, 1, 10), keywords: &a },
            DatedKeywords { published: at(2024, 2, 10), keywords: &b },
            DatedKeywords { published: at(2024, 3, 10), keywords: &c },
        ];
        let table = monthly_trends(&docs, &kws(&["machine learning", "deep learning"]));
        assert_eq!(table.labels(), vec!["2024-01", "2024-02", "2024-03"]);
        assert_eq!(table.rows[0], ("machine learning".to_string(), vec![1, 1, 0]));
        assert_eq!(table.rows[1], ("deep learning".to_string(), vec![0, 0, 1]));
    }

    #[test]
    fn empty_months_are_zero() {
        let a = kws(&["robotics"]);
        let docs = [
            DatedKeywords { published: at(2024, 1, 1), keywords: &a },
            DatedKeywords { published: at(2024, 4, 1), keywords: &a },
        ];
        let table = monthly_trends(&docs, &kws(&["robotics"]));
        assert_eq!(table.rows[0].1, vec![1, 0, 0, 1]);
        assert_eq!(table.rows[0].1.len(), table.months.len());
    }

    #[test]
    fn document_counted_once_per_keyword() {
        let a = kws(&["transformer", "transformers", "Transformer"]);
        let docs = [DatedKeywords { published: at(2024, 6, 1), keywords: &a }];
        let table = monthly_trends(&docs, &kws(&["transformer"]));
        assert_eq!(table.rows[0].1, vec![1]);
    }

    #[test]
    fn input_order_does_not_matter() {
        let a = kws(&["vision"]);
        let forward = [
            DatedKeywords { published: at(2024, 1, 1), keywords: &a },
            DatedKeywords { published: at(2024, 3, 1), keywords: &a },
        ];
        let backward = [forward[1], forward[0]];
        let top = kws(&["vision"]);
        assert_eq!(monthly_trends(&forward, &top), monthly_trends(&backward, &top));
    }

    #[test]
    fn no_documents_gives_empty_rows() {
        let table = monthly_trends(&[], &kws(&["vision"]));
        assert!(table.months.is_empty());
        assert_eq!(table.rows, vec![("vision".to_string(), Vec::new())]);
    }
}
