use serde::{Deserialize, Serialize};

use super::book::Book;

/// A book paired with its relevance score and 1-based position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedBook {
    pub book: Book,
    pub score: f64,
    pub rank: usize,
}

/// Ordered outcome of one search.
///
/// Callers keep this value to resolve a later selection instead of consulting
/// any shared cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: String,
    pub ranked: Vec<RankedBook>,
}

impl SearchResults {
    pub fn new(query: impl Into<String>, ranked: Vec<RankedBook>) -> Self {
        Self {
            query: query.into(),
            ranked,
        }
    }

    pub fn empty(query: impl Into<String>) -> Self {
        Self::new(query, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    pub fn books(&self) -> impl Iterator<Item = &Book> {
        self.ranked.iter().map(|r| &r.book)
    }

    /// Looks a book up by [`Book::selection_key`].
    pub fn select(&self, key: &str) -> Option<&Book> {
        self.books().find(|b| b.selection_key() == key)
    }

    /// Keeps only the first `max` entries.
    pub fn truncate(&mut self, max: usize) {
        self.ranked.truncate(max);
    }

    pub fn into_books(self) -> Vec<Book> {
        self.ranked.into_iter().map(|r| r.book).collect()
    }
}
