use std::sync::Arc;

use bookscope_core::config::AppConfig;
use bookscope_core::{Aggregator, Book, SearchResults, SourceTag};
use futures::future::join_all;
use tracing::{debug, error, warn};

use crate::error::Result;
use crate::sources::{BookSource, GoogleBooksSource, NaverBooksSource};

/// Fans a query out to every configured source and ranks the union.
pub struct SearchEngine {
    sources: Vec<Arc<dyn BookSource>>,
    aggregator: Aggregator,
}

impl SearchEngine {
    pub fn new(sources: Vec<Arc<dyn BookSource>>, aggregator: Aggregator) -> Self {
        Self {
            sources,
            aggregator,
        }
    }

    /// Builds the enabled sources with the configured limits and credentials.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let mut sources: Vec<Arc<dyn BookSource>> = Vec::new();
        let google = &config.sources.google;
        if google.enabled {
            sources.push(Arc::new(GoogleBooksSource::from_config(
                google,
                config.search.limit_for(SourceTag::Google),
            )?));
        }
        let naver = &config.sources.naver;
        if naver.enabled {
            sources.push(Arc::new(NaverBooksSource::from_config(
                naver,
                config.search.limit_for(SourceTag::Naver),
            )?));
        }
        Ok(Self::new(sources, config.search.aggregator()))
    }

    /// Full search: each source uses its own page size.
    pub async fn search(&self, query: &str) -> SearchResults {
        let sets = self.fetch(query, None).await;
        self.aggregator.aggregate(sets, query)
    }

    /// Search with one cap applied to every source.
    pub async fn search_with_limit(&self, query: &str, limit: usize) -> SearchResults {
        let sets = self.fetch(query, Some(limit)).await;
        self.aggregator.aggregate(sets, query)
    }

    /// Raw per-source result lists, in source order. A failing source
    /// contributes an empty list.
    pub async fn fetch(&self, query: &str, limit: Option<usize>) -> Vec<Vec<Book>> {
        if query.trim().is_empty() {
            return vec![Vec::new(); self.sources.len()];
        }

        let requests = self.sources.iter().map(|source| {
            let limit = limit.unwrap_or_else(|| source.default_limit());
            async move { (source.tag(), source.search(query, limit).await) }
        });

        join_all(requests)
            .await
            .into_iter()
            .map(|(tag, outcome)| match outcome {
                Ok(books) => {
                    debug!(source = %tag, count = books.len(), "source answered");
                    books
                }
                Err(e) if e.is_defect() => {
                    error!(source = %tag, error = %e, "source returned malformed data");
                    Vec::new()
                }
                Err(e) => {
                    warn!(source = %tag, error = %e, "source search failed");
                    Vec::new()
                }
            })
            .collect()
    }
}
