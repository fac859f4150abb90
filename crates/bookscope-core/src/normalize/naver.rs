use serde_json::Value;

use super::Fields;
use crate::error::Result;
use crate::isbn::strip_isbn;
use crate::models::{Book, SourceTag};
use crate::text::to_https;

const AUTHOR_DELIMITER: char = '^';

/// Naver book search item. Text fields carry `<b>` highlighting, authors are
/// caret-separated and `pubdate` is `YYYYMMDD`.
pub(super) fn normalize(raw: &Value) -> Result<Book> {
    let item = Fields::root(SourceTag::Naver, raw)?;
    let isbn = preferred_isbn(&item.string_or_number("isbn")?);

    Ok(Book {
        source: SourceTag::Naver,
        id: isbn.clone(),
        title: item.text("title")?,
        authors: item.text_list("author", AUTHOR_DELIMITER)?,
        publisher: item.text("publisher")?,
        published_date: item.string("pubdate")?.trim().to_string(),
        thumbnail_url: to_https(&item.string("image")?),
        isbn,
        categories: Vec::new(),
        description: item.text("description")?,
    })
}

/// The `isbn` field may hold `"<isbn10> <isbn13>"`; the 13-character form wins.
fn preferred_isbn(raw: &str) -> String {
    let tokens: Vec<String> = raw
        .split_whitespace()
        .map(strip_isbn)
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.len() <= 1 {
        return strip_isbn(raw);
    }
    tokens
        .iter()
        .find(|t| t.len() == 13)
        .or_else(|| tokens.iter().find(|t| t.len() == 10))
        .unwrap_or(&tokens[0])
        .clone()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_item_with_markup_and_caret_authors() {
        let raw = json!({
            "title": "<b>채식주의자</b> (리마스터판)",
            "link": "https://search.shopping.naver.com/book/catalog/1",
            "image": "http://shopping-phinf.pstatic.net/a.jpg",
            "author": "한강^<b>홍길동</b>^",
            "publisher": "창비",
            "pubdate": "20220328",
            "isbn": "8936434268 9788936434267",
            "description": "한 여자가 &quot;채식&quot;을 선언한다."
        });

        let book = normalize(&raw).unwrap();
        assert_eq!(book.source, SourceTag::Naver);
        assert_eq!(book.title, "채식주의자 (리마스터판)");
        assert_eq!(book.authors, vec!["한강", "홍길동"]);
        assert_eq!(book.publisher, "창비");
        assert_eq!(book.published_date, "20220328");
        assert_eq!(book.isbn, "9788936434267");
        assert_eq!(book.id, "9788936434267");
        assert_eq!(book.thumbnail_url, "https://shopping-phinf.pstatic.net/a.jpg");
        assert_eq!(book.description, "한 여자가 \"채식\"을 선언한다.");
        assert!(book.categories.is_empty());
    }

    #[test]
    fn secure_url_upgrade() {
        let book = normalize(&json!({"title": "a", "image": "http://example.com/a.jpg"})).unwrap();
        assert_eq!(book.thumbnail_url, "https://example.com/a.jpg");
    }

    #[test]
    fn single_identifier_is_used_as_is() {
        let book = normalize(&json!({"title": "a", "isbn": "979-11-6224-000-1"})).unwrap();
        assert_eq!(book.isbn, "9791162240001");

        let book = normalize(&json!({"title": "a", "isbn": 9788936434267u64})).unwrap();
        assert_eq!(book.isbn, "9788936434267");
    }

    #[test]
    fn empty_record_degrades_to_defaults() {
        let book = normalize(&json!({})).unwrap();
        assert_eq!(book.title, "");
        assert_eq!(book.id, "");
        assert!(book.authors.is_empty());
        assert_eq!(book.thumbnail_url, "");
    }
}
