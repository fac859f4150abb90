//! Merging of per-source result lists into one ranked, deduplicated list.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Book, IdentityKey, RankedBook, SearchResults, SourceTag};
use crate::scoring::{PreparedQuery, Scorer};

pub const DEFAULT_THRESHOLD_RATIO: f64 = 0.4;

/// How records sharing an identity key are collapsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupPolicy {
    /// Keep the first, i.e. highest-scoring, occurrence.
    #[default]
    HighestScore,
    /// Keep the highest-scoring slot but overlay the fields of the record
    /// from this source when both exist.
    PreferSource(SourceTag),
}

#[derive(Debug, Clone)]
pub struct Aggregator {
    scorer: Scorer,
    threshold_ratio: f64,
    dedup: DedupPolicy,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self {
            scorer: Scorer::default(),
            threshold_ratio: DEFAULT_THRESHOLD_RATIO,
            dedup: DedupPolicy::default(),
        }
    }
}

impl Aggregator {
    pub fn new(scorer: Scorer) -> Self {
        Self {
            scorer,
            ..Self::default()
        }
    }

    pub fn with_threshold_ratio(mut self, ratio: f64) -> Self {
        self.threshold_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    pub fn with_dedup(mut self, dedup: DedupPolicy) -> Self {
        self.dedup = dedup;
        self
    }

    /// Flatten, score, filter, stable-sort and deduplicate.
    pub fn aggregate(&self, source_sets: Vec<Vec<Book>>, query: &str) -> SearchResults {
        let prepared = PreparedQuery::new(query);
        if prepared.is_blank() {
            return SearchResults::empty(query);
        }

        let scored: Vec<(Book, f64)> = source_sets
            .into_iter()
            .flatten()
            .map(|book| {
                let score = self.scorer.score(&prepared, &book);
                (book, score)
            })
            .collect();
        let total = scored.len();

        let mut kept = self.filter(scored);
        let after_filter = kept.len();

        // sort_by is stable: equal scores keep concatenation order
        kept.sort_by(|a, b| b.1.total_cmp(&a.1));

        let ranked: Vec<RankedBook> = self
            .dedup(kept)
            .into_iter()
            .enumerate()
            .map(|(idx, (book, score))| RankedBook {
                book,
                score,
                rank: idx + 1,
            })
            .collect();

        debug!(
            query,
            total,
            after_filter,
            returned = ranked.len(),
            "aggregated search results"
        );
        SearchResults::new(query, ranked)
    }

    /// Drops non-positive scores and anything below `threshold_ratio` of the
    /// best score in this set.
    fn filter(&self, scored: Vec<(Book, f64)>) -> Vec<(Book, f64)> {
        let max_score = scored.iter().map(|(_, s)| *s).fold(0.0_f64, f64::max);
        let cutoff = max_score * self.threshold_ratio;
        scored
            .into_iter()
            .filter(|(_, s)| *s > 0.0 && (max_score <= 0.0 || *s >= cutoff))
            .collect()
    }

    fn dedup(&self, sorted: Vec<(Book, f64)>) -> Vec<(Book, f64)> {
        let mut slots: HashMap<IdentityKey, usize> = HashMap::new();
        let mut out: Vec<(Book, f64)> = Vec::with_capacity(sorted.len());

        for (book, score) in sorted {
            let key = book.identity_key();
            match slots.get(&key) {
                None => {
                    slots.insert(key, out.len());
                    out.push((book, score));
                }
                Some(&slot) => {
                    if let DedupPolicy::PreferSource(preferred) = self.dedup {
                        let existing = &mut out[slot].0;
                        if book.source == preferred && existing.source != preferred {
                            *existing = book.merge_over(existing);
                        } else if existing.source == preferred && book.source != preferred {
                            *existing = existing.clone().merge_over(&book);
                        }
                    }
                }
            }
        }
        out
    }
}

/// Aggregates with default scorer, threshold and dedup policy.
pub fn aggregate(source_sets: Vec<Vec<Book>>, query: &str) -> Vec<Book> {
    Aggregator::default()
        .aggregate(source_sets, query)
        .into_books()
}
