//! Debounced suggestion lookups for a search box.
//!
//! Every keystroke goes through [`AutocompleteController::input`]. Only the
//! most recent query may publish results: older lookups are aborted, and a
//! lookup that finishes anyway is dropped when its generation or query no
//! longer matches.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use bookscope_core::config::{AppConfig, AutocompleteConfig};
use bookscope_core::{Aggregator, Book};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::engine::SearchEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Pending,
    Resolved,
}

/// Snapshot published to subscribers on every state change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestions {
    pub phase: Phase,
    pub query: String,
    pub generation: u64,
    pub items: Vec<Book>,
}

impl Suggestions {
    fn idle(generation: u64) -> Self {
        Self {
            phase: Phase::Idle,
            query: String::new(),
            generation,
            items: Vec::new(),
        }
    }
}

#[derive(Default)]
struct Latest {
    generation: u64,
    query: String,
    task: Option<JoinHandle<()>>,
}

struct Shared {
    latest: Mutex<Latest>,
    tx: watch::Sender<Suggestions>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Latest> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Invalidates any in-flight lookup and publishes an empty idle state.
    fn reset(&self) {
        let mut latest = self.lock();
        latest.generation += 1;
        latest.query.clear();
        if let Some(task) = latest.task.take() {
            task.abort();
        }
        self.tx.send_replace(Suggestions::idle(latest.generation));
    }

    fn mark_pending(&self, generation: u64, query: &str) -> bool {
        let latest = self.lock();
        if latest.generation != generation || latest.query != query {
            return false;
        }
        self.tx.send_modify(|s| {
            s.phase = Phase::Pending;
            s.query = query.to_string();
            s.generation = generation;
        });
        true
    }

    /// Publishes `items` only if they answer the latest query.
    fn apply_resolution(&self, generation: u64, query: &str, items: Vec<Book>) -> bool {
        let mut latest = self.lock();
        if latest.generation != generation || latest.query != query {
            debug!(
                generation,
                latest = latest.generation,
                query,
                "discarding stale suggestions"
            );
            return false;
        }
        latest.task = None;
        self.tx.send_replace(Suggestions {
            phase: Phase::Resolved,
            query: query.to_string(),
            generation,
            items,
        });
        true
    }
}

pub struct AutocompleteController {
    engine: Arc<SearchEngine>,
    aggregator: Aggregator,
    settings: AutocompleteConfig,
    shared: Arc<Shared>,
}

impl AutocompleteController {
    pub fn new(engine: Arc<SearchEngine>, aggregator: Aggregator, settings: AutocompleteConfig) -> Self {
        let (tx, _rx) = watch::channel(Suggestions::idle(0));
        Self {
            engine,
            aggregator,
            settings,
            shared: Arc::new(Shared {
                latest: Mutex::new(Latest::default()),
                tx,
            }),
        }
    }

    /// Search scoring with the autocomplete dedup policy.
    pub fn from_config(engine: Arc<SearchEngine>, config: &AppConfig) -> Self {
        let aggregator = config
            .search
            .aggregator()
            .with_dedup(config.autocomplete.dedup);
        Self::new(engine, aggregator, config.autocomplete.clone())
    }

    pub fn subscribe(&self) -> watch::Receiver<Suggestions> {
        self.shared.tx.subscribe()
    }

    pub fn current(&self) -> Suggestions {
        self.shared.tx.borrow().clone()
    }

    /// Must be called from within a tokio runtime.
    pub fn input(&self, text: &str) {
        let query = text.trim();
        if query.chars().count() < self.settings.min_query_chars {
            self.shared.reset();
            return;
        }

        let mut latest = self.shared.lock();
        latest.generation += 1;
        latest.query = query.to_string();
        if let Some(task) = latest.task.take() {
            task.abort();
        }

        let generation = latest.generation;
        let query = query.to_string();
        let shared = Arc::clone(&self.shared);
        let engine = Arc::clone(&self.engine);
        let aggregator = self.aggregator.clone();
        let debounce = Duration::from_millis(self.settings.debounce_ms);
        let per_source_limit = self.settings.per_source_limit;
        let max_suggestions = self.settings.max_suggestions;

        latest.task = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if !shared.mark_pending(generation, &query) {
                return;
            }
            let sets = engine.fetch(&query, Some(per_source_limit)).await;
            let mut results = aggregator.aggregate(sets, &query);
            results.truncate(max_suggestions);
            shared.apply_resolution(generation, &query, results.into_books());
        }));
    }

    /// Takes the suggestion with `key` (`source:id`) and closes the list.
    pub fn select(&self, key: &str) -> Option<Book> {
        let chosen = self
            .shared
            .tx
            .borrow()
            .items
            .iter()
            .find(|book| book.selection_key() == key)
            .cloned();
        self.shared.reset();
        chosen
    }

    /// Focus left the search box.
    pub fn dismiss(&self) {
        self.shared.reset();
    }
}

impl Drop for AutocompleteController {
    fn drop(&mut self) {
        if let Some(task) = self.shared.lock().task.take() {
            task.abort();
        }
    }
}
