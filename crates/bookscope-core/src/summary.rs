//! Payload types exchanged with the external summary/recommendation service.

use serde::{Deserialize, Serialize};

use crate::models::Book;

/// Fields of a selected book handed to the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRequest {
    pub title: String,
    pub authors: String,
    pub categories: String,
    pub description: String,
}

impl SummaryRequest {
    /// `None` when the book has no description to summarize.
    pub fn for_book(book: &Book) -> Option<Self> {
        if book.description.trim().is_empty() {
            return None;
        }
        Some(Self {
            title: book.title.clone(),
            authors: book.authors.join(", "),
            categories: book.categories.join(", "),
            description: book.description.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendations {
    #[serde(default)]
    pub intro: String,
    #[serde(default)]
    pub books: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub author_recommendations: Recommendations,
    #[serde(default)]
    pub similar_book_recommendations: Recommendations,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceTag;

    #[test]
    fn request_requires_description() {
        let mut book = Book::new(SourceTag::Google, "g", "Dune");
        assert!(SummaryRequest::for_book(&book).is_none());

        book.authors = vec!["Frank Herbert".into(), "Brian Herbert".into()];
        book.categories = vec!["Fiction".into(), "Science Fiction".into()];
        book.description = "Desert planet.".into();
        let req = SummaryRequest::for_book(&book).unwrap();
        assert_eq!(req.authors, "Frank Herbert, Brian Herbert");
        assert_eq!(req.categories, "Fiction, Science Fiction");
    }

    #[test]
    fn response_uses_camel_case_keys() {
        let json = r#"{
            "summary": "요약",
            "authorRecommendations": {"intro": "같은 저자", "books": ["A", "B"]},
            "similarBookRecommendations": {"intro": "비슷한 책", "books": []}
        }"#;
        let resp: SummaryResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.summary, "요약");
        assert_eq!(resp.author_recommendations.books, vec!["A", "B"]);
        assert!(resp.similar_book_recommendations.books.is_empty());
    }
}
