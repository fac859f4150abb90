//! Bookscope core: canonical book model, normalization of source records,
//! relevance scoring and result aggregation.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod isbn;
pub mod models;
pub mod normalize;
pub mod scoring;
pub mod summary;
pub mod text;

pub use aggregate::{Aggregator, DedupPolicy, aggregate};
pub use config::{AppConfig, AutocompleteConfig, SearchConfig};
pub use error::{CoreError, Result};
pub use models::*;
pub use normalize::{normalize, normalize_all};
pub use scoring::{PreparedQuery, ScoreWeights, Scorer, score};
pub use summary::{SummaryRequest, SummaryResponse};
