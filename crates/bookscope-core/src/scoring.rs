//! Additive relevance scoring of a [`Book`] against a query.

use serde::{Deserialize, Serialize};

use crate::models::{Book, SourceTag};
use crate::text::{initials, is_initials_only_query, normalize_text, parse_year, strip_whitespace};

/// Signal weights. Every matched signal contributes; none is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub isbn_contains: f64,
    pub title_exact: f64,
    pub author_exact: f64,
    pub title_prefix: f64,
    pub author_prefix: f64,
    pub title_contains: f64,
    pub author_contains: f64,
    pub combined_contains: f64,
    pub title_initials: f64,
    pub author_initials: f64,
    /// Subtracted per character of title/query length difference.
    pub length_penalty: f64,
    /// Publication year is divided by this.
    pub recency_divisor: f64,
    pub source_preference: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            isbn_contains: 1600.0,
            title_exact: 1400.0,
            author_exact: 1200.0,
            title_prefix: 900.0,
            author_prefix: 800.0,
            title_contains: 600.0,
            author_contains: 500.0,
            combined_contains: 300.0,
            title_initials: 700.0,
            author_initials: 650.0,
            length_penalty: 3.0,
            recency_divisor: 5.0,
            source_preference: 30.0,
        }
    }
}

/// Query forms computed once and reused for every candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedQuery {
    pub raw: String,
    pub normalized: String,
    /// Consonant skeleton to look for in candidate initials; may be empty.
    pub initials: String,
}

impl PreparedQuery {
    pub fn new(query: &str) -> Self {
        let normalized = normalize_text(query);
        let initials = if is_initials_only_query(query) {
            strip_whitespace(query)
        } else {
            initials(&normalized)
        };
        Self {
            raw: query.to_string(),
            normalized,
            initials,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.normalized.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scorer {
    weights: ScoreWeights,
    preferred_source: Option<SourceTag>,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(Some(SourceTag::Google))
    }
}

impl Scorer {
    pub fn new(preferred_source: Option<SourceTag>) -> Self {
        Self {
            weights: ScoreWeights::default(),
            preferred_source,
        }
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn score(&self, query: &PreparedQuery, book: &Book) -> f64 {
        let w = &self.weights;
        let q = query.normalized.as_str();
        let title = normalize_text(&book.title);
        let authors = normalize_text(&book.authors.join(" "));
        let combined = format!("{title} {authors}");
        let isbn = book.isbn.to_lowercase();

        let mut s = 0.0;

        if !isbn.is_empty() && isbn.contains(q) {
            s += w.isbn_contains;
        }

        if title == q {
            s += w.title_exact;
        }
        if authors == q {
            s += w.author_exact;
        }

        if title.starts_with(q) {
            s += w.title_prefix;
        }
        if authors.starts_with(q) {
            s += w.author_prefix;
        }

        if title.contains(q) {
            s += w.title_contains;
        }
        if authors.contains(q) {
            s += w.author_contains;
        }
        if combined.contains(q) {
            s += w.combined_contains;
        }

        if !query.initials.is_empty() {
            if initials(&title).contains(&query.initials) {
                s += w.title_initials;
            }
            if initials(&authors).contains(&query.initials) {
                s += w.author_initials;
            }
        }

        let len_diff = title.chars().count().abs_diff(q.chars().count());
        s -= w.length_penalty * len_diff as f64;

        if w.recency_divisor != 0.0 {
            s += f64::from(parse_year(&book.published_date)) / w.recency_divisor;
        }

        if self.preferred_source == Some(book.source) {
            s += w.source_preference;
        }

        s
    }
}

/// Scores with default weights and Google as the preferred source.
pub fn score(book: &Book, query: &str) -> f64 {
    Scorer::default().score(&PreparedQuery::new(query), book)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(source: SourceTag, title: &str, authors: &[&str], isbn: &str, date: &str) -> Book {
        let mut b = Book::new(source, "id", title);
        b.authors = authors.iter().map(|s| s.to_string()).collect();
        b.isbn = isbn.to_string();
        b.published_date = date.to_string();
        b
    }

    #[test]
    fn exact_title_accumulates_prefix_and_containment() {
        let b = book(SourceTag::Naver, "Dune", &[], "", "");
        // exact + prefix + title contains + combined contains, no penalty
        assert_eq!(score(&b, "dune"), 1400.0 + 900.0 + 600.0 + 300.0);
    }

    #[test]
    fn isbn_hit_scores_at_least_isbn_weight() {
        let b = book(SourceTag::Google, "Being Mortal", &["Atul Gawande"], "9780143127796", "2017-06-06");
        let s = score(&b, "9780143127796");
        // 1600 - 3*|12-13| + 2017/5 + 30
        assert!((s - (1600.0 - 3.0 + 403.4 + 30.0)).abs() < 1e-9);
        assert!(s >= 1600.0);
    }

    #[test]
    fn author_signals() {
        let b = book(SourceTag::Naver, "Sapiens", &["Yuval Noah Harari"], "", "");
        let s = score(&b, "Yuval Noah Harari");
        // author exact + prefix + contains + combined, title penalty |7-17|
        assert_eq!(s, 1200.0 + 800.0 + 500.0 + 300.0 - 30.0);
    }

    #[test]
    fn initials_query_matches_title_skeleton() {
        let b = book(SourceTag::Naver, "홍길동전", &[], "", "");
        let q = PreparedQuery::new("ㄱㄷ");
        assert_eq!(q.initials, "ㄱㄷ");
        let s = Scorer::new(None).score(&q, &b);
        // initials(title) = ㅎㄱㄷㅈ contains ㄱㄷ; length penalty |4-2|
        assert_eq!(s, 700.0 - 6.0);
    }

    #[test]
    fn hangul_query_also_matches_on_initials() {
        let b = book(SourceTag::Naver, "나의 라임오렌지나무", &["바스콘셀로스"], "", "");
        let q = PreparedQuery::new("라임");
        assert_eq!(q.initials, "ㄹㅇ");
        let s = Scorer::new(None).score(&q, &b);
        assert!(s > 700.0);
    }

    #[test]
    fn spaced_initials_query_is_compacted() {
        let q = PreparedQuery::new("ㅎ ㄱ");
        assert_eq!(q.initials, "ㅎㄱ");
    }

    #[test]
    fn unrelated_book_scores_non_positive() {
        let b = book(SourceTag::Naver, "A Completely Different Title", &["Someone"], "", "");
        assert!(score(&b, "rust") <= 0.0);
    }

    #[test]
    fn recency_and_source_preference() {
        let old = book(SourceTag::Naver, "rust", &[], "", "1990");
        let new = book(SourceTag::Naver, "rust", &[], "", "2020");
        assert!(score(&new, "rust") > score(&old, "rust"));
        assert_eq!(score(&new, "rust") - score(&old, "rust"), 6.0);

        let google = book(SourceTag::Google, "rust", &[], "", "2020");
        assert_eq!(score(&google, "rust") - score(&new, "rust"), 30.0);
    }

    #[test]
    fn custom_weights_apply() {
        let b = book(SourceTag::Naver, "Dune", &[], "", "");
        let weights = ScoreWeights {
            title_exact: 0.0,
            ..ScoreWeights::default()
        };
        let s = Scorer::new(None)
            .with_weights(weights)
            .score(&PreparedQuery::new("dune"), &b);
        assert_eq!(s, 900.0 + 600.0 + 300.0);
    }
}
