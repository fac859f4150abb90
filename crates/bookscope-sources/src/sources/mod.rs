use async_trait::async_trait;
use bookscope_core::{Book, SourceTag, normalize_all};
use serde_json::Value;

use crate::error::Result;

pub mod google;
pub mod naver;

pub use google::GoogleBooksSource;
pub use naver::NaverBooksSource;

/// A bibliographic provider queried by free text.
///
/// Implementations return the provider's raw records; normalization into
/// [`Book`]s happens in the provided [`BookSource::search`].
#[async_trait]
pub trait BookSource: Send + Sync {
    fn tag(&self) -> SourceTag;

    /// Page size used for full searches.
    fn default_limit(&self) -> usize;

    /// At most `limit` raw records; fewer or none is not an error.
    async fn search_raw(&self, query: &str, limit: usize) -> Result<Vec<Value>>;

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Book>> {
        let raws = self.search_raw(query, limit).await?;
        let mut books = normalize_all(self.tag(), &raws)?;
        books.truncate(limit);
        Ok(books)
    }
}

/// `items` array of a search response; absent means no results.
pub(crate) fn items(mut body: Value) -> Vec<Value> {
    match body.get_mut("items").map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn items_tolerates_missing_array() {
        assert!(items(json!({"totalItems": 0})).is_empty());
        assert!(items(json!({"items": null})).is_empty());
        assert_eq!(items(json!({"items": [{"id": "a"}]})).len(), 1);
    }
}
