use std::fmt;

use serde::{Deserialize, Serialize};

use crate::isbn::{Isbn, strip_isbn};
use crate::text::normalize_text;

/// Provenance of a [`Book`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTag {
    Google,
    Naver,
}

impl SourceTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::Google => "google",
            SourceTag::Naver => "naver",
        }
    }

    /// Human-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            SourceTag::Google => "Google",
            SourceTag::Naver => "Naver",
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SourceTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" | "a" => Ok(SourceTag::Google),
            "naver" | "b" => Ok(SourceTag::Naver),
            other => Err(format!("unknown source: {other}")),
        }
    }
}

/// Canonical book record produced by the normalizer.
///
/// Optional metadata is always an empty string or empty list, never absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub source: SourceTag,
    pub id: String,
    pub title: String,

    #[serde(default)]
    pub authors: Vec<String>,

    #[serde(default)]
    pub publisher: String,

    #[serde(default)]
    pub published_date: String,

    #[serde(default)]
    pub thumbnail_url: String,

    #[serde(default)]
    pub isbn: String,

    #[serde(default)]
    pub categories: Vec<String>,

    #[serde(default)]
    pub description: String,
}

/// Key deciding whether two records denote the same logical work.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityKey {
    Isbn(String),
    TitleAuthors(String, String),
}

impl Book {
    pub fn new(source: SourceTag, id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            source,
            id: id.into(),
            title: title.into(),
            authors: Vec::new(),
            publisher: String::new(),
            published_date: String::new(),
            thumbnail_url: String::new(),
            isbn: String::new(),
            categories: Vec::new(),
            description: String::new(),
        }
    }

    /// ISBN when present (ISBN-10 folded into ISBN-13), otherwise the
    /// normalized title and author list.
    pub fn identity_key(&self) -> IdentityKey {
        let stripped = strip_isbn(&self.isbn);
        if !stripped.is_empty() {
            let canonical = Isbn::parse(&stripped)
                .map(|isbn| isbn.isbn13)
                .unwrap_or(stripped);
            return IdentityKey::Isbn(canonical);
        }
        IdentityKey::TitleAuthors(
            normalize_text(&self.title),
            normalize_text(&self.authors.join(",")),
        )
    }

    /// `"<source>:<id>"`, stable for the lifetime of one result set.
    pub fn selection_key(&self) -> String {
        format!("{}:{}", self.source, self.id)
    }

    pub fn authors_joined(&self, separator: &str) -> String {
        self.authors.join(separator)
    }

    /// Overlays `self` on `fallback`: every field of `self` wins unless it is
    /// empty, in which case the fallback's value is kept.
    pub fn merge_over(self, fallback: &Book) -> Book {
        fn pick(preferred: String, other: &str) -> String {
            if preferred.is_empty() {
                other.to_string()
            } else {
                preferred
            }
        }
        fn pick_list(preferred: Vec<String>, other: &[String]) -> Vec<String> {
            if preferred.is_empty() {
                other.to_vec()
            } else {
                preferred
            }
        }

        Book {
            source: self.source,
            id: pick(self.id, &fallback.id),
            title: pick(self.title, &fallback.title),
            authors: pick_list(self.authors, &fallback.authors),
            publisher: pick(self.publisher, &fallback.publisher),
            published_date: pick(self.published_date, &fallback.published_date),
            thumbnail_url: pick(self.thumbnail_url, &fallback.thumbnail_url),
            isbn: pick(self.isbn, &fallback.isbn),
            categories: pick_list(self.categories, &fallback.categories),
            description: pick(self.description, &fallback.description),
        }
    }
}
