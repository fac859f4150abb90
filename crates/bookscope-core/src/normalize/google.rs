use serde_json::Value;

use super::Fields;
use crate::error::Result;
use crate::isbn::strip_isbn;
use crate::models::{Book, SourceTag};
use crate::text::to_https;

/// Google Books `volumes` item: `{ id, volumeInfo: { ... } }`.
pub(super) fn normalize(raw: &Value) -> Result<Book> {
    let root = Fields::root(SourceTag::Google, raw)?;
    let info = root.object("volumeInfo")?;
    let images = info.object("imageLinks")?;

    let mut thumbnail = images.string("thumbnail")?;
    if thumbnail.is_empty() {
        thumbnail = images.string("smallThumbnail")?;
    }

    Ok(Book {
        source: SourceTag::Google,
        id: root.string("id")?,
        title: info.text("title")?,
        authors: info.text_list("authors", ',')?,
        publisher: info.text("publisher")?,
        published_date: info.string("publishedDate")?.trim().to_string(),
        thumbnail_url: to_https(&thumbnail),
        isbn: preferred_isbn(&info)?,
        categories: info.text_list("categories", ',')?,
        description: info.text("description")?,
    })
}

/// ISBN-13 when present, else ISBN-10; other identifier types are ignored.
fn preferred_isbn(info: &Fields<'_>) -> Result<String> {
    let mut isbn13 = None;
    let mut isbn10 = None;
    for entry in info.array("industryIdentifiers")? {
        let id = Fields::root(SourceTag::Google, entry)?;
        let value = strip_isbn(&id.string("identifier")?);
        if value.is_empty() {
            continue;
        }
        match id.string("type")?.as_str() {
            "ISBN_13" if isbn13.is_none() => isbn13 = Some(value),
            "ISBN_10" if isbn10.is_none() => isbn10 = Some(value),
            _ => {}
        }
    }
    Ok(isbn13.or(isbn10).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::CoreError;

    #[test]
    fn parses_full_volume() {
        let raw = json!({
            "id": "zyTCAlFPjgYC",
            "volumeInfo": {
                "title": "The Google Story",
                "authors": ["David A. Vise", "Mark Malseed"],
                "publisher": "Random House Digital, Inc.",
                "publishedDate": "2005-11-15",
                "description": "<p>Here is the <b>story</b> behind one of the most remarkable Internet successes.</p>",
                "industryIdentifiers": [
                    {"type": "ISBN_10", "identifier": "055380457X"},
                    {"type": "ISBN_13", "identifier": "9780553804577"}
                ],
                "categories": ["Browsers (Computer programs)"],
                "imageLinks": {
                    "smallThumbnail": "http://books.google.com/books?id=zyTCAlFPjgYC&zoom=5",
                    "thumbnail": "http://books.google.com/books?id=zyTCAlFPjgYC&zoom=1"
                }
            }
        });

        let book = normalize(&raw).unwrap();
        assert_eq!(book.source, SourceTag::Google);
        assert_eq!(book.id, "zyTCAlFPjgYC");
        assert_eq!(book.title, "The Google Story");
        assert_eq!(book.authors, vec!["David A. Vise", "Mark Malseed"]);
        assert_eq!(book.published_date, "2005-11-15");
        assert_eq!(book.isbn, "9780553804577");
        assert_eq!(
            book.thumbnail_url,
            "https://books.google.com/books?id=zyTCAlFPjgYC&zoom=1"
        );
        assert_eq!(
            book.description,
            "Here is the story behind one of the most remarkable Internet successes."
        );
    }

    #[test]
    fn falls_back_to_isbn10_and_small_thumbnail() {
        let raw = json!({
            "id": "x",
            "volumeInfo": {
                "title": "Old Book",
                "industryIdentifiers": [
                    {"type": "OTHER", "identifier": "UOM:39015012345678"},
                    {"type": "ISBN_10", "identifier": "0-306-40615-2"}
                ],
                "imageLinks": {"smallThumbnail": "http://example.com/s.jpg"}
            }
        });

        let book = normalize(&raw).unwrap();
        assert_eq!(book.isbn, "0306406152");
        assert_eq!(book.thumbnail_url, "https://example.com/s.jpg");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let book = normalize(&json!({"id": "bare"})).unwrap();
        assert_eq!(book.title, "");
        assert!(book.authors.is_empty());
        assert!(book.categories.is_empty());
        assert_eq!(book.publisher, "");
        assert_eq!(book.thumbnail_url, "");
        assert_eq!(book.isbn, "");

        let book = normalize(&json!({"id": "nulls", "volumeInfo": {"title": null, "authors": null}}))
            .unwrap();
        assert_eq!(book.title, "");
        assert!(book.authors.is_empty());
    }

    #[test]
    fn only_other_identifiers_leave_isbn_empty() {
        let raw = json!({
            "id": "y",
            "volumeInfo": {
                "industryIdentifiers": [{"type": "OTHER", "identifier": "OCLC:123"}]
            }
        });
        assert_eq!(normalize(&raw).unwrap().isbn, "");
    }

    #[test]
    fn wrong_type_is_a_defect() {
        let raw = json!({"id": "z", "volumeInfo": {"title": ["not", "a", "string"]}});
        assert!(matches!(
            normalize(&raw),
            Err(CoreError::MalformedField { field: "title", .. })
        ));
    }
}
