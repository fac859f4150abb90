use thiserror::Error;

use crate::models::SourceTag;

/// All errors that can occur in bookscope-core.
///
/// Business outcomes such as "no matches" are never errors; these variants
/// signal defects in input data or in the local environment.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("malformed {tag} record: field `{field}` is not {expected}")]
    MalformedField {
        tag: SourceTag,
        field: &'static str,
        expected: &'static str,
    },

    #[error("malformed {0} record: expected a JSON object")]
    MalformedRecord(SourceTag),

    #[error("invalid ISBN: {0}")]
    InvalidIsbn(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
