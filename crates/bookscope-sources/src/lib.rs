//! Bookscope sources: HTTP clients for the book providers, the concurrent
//! search engine and the autocomplete controller built on top of it.

pub mod autocomplete;
pub mod engine;
pub mod error;
pub mod http;
pub mod sources;

pub use autocomplete::{AutocompleteController, Phase, Suggestions};
pub use engine::SearchEngine;
pub use error::{Result, SourceError};
pub use sources::{BookSource, GoogleBooksSource, NaverBooksSource};
