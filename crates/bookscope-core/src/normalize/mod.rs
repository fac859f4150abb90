//! Conversion of raw source records into canonical [`Book`]s.
//!
//! Missing or `null` fields degrade to empty values; a field present with the
//! wrong JSON type is reported as [`CoreError::MalformedField`].

mod google;
mod naver;

use serde_json::{Map, Value};

use crate::error::{CoreError, Result};
use crate::models::{Book, SourceTag};
use crate::text::plain_text;

/// Normalizes one raw record from `source`.
pub fn normalize(source: SourceTag, raw: &Value) -> Result<Book> {
    match source {
        SourceTag::Google => google::normalize(raw),
        SourceTag::Naver => naver::normalize(raw),
    }
}

/// Normalizes a whole response page, giving id-less records a positional id.
pub fn normalize_all(source: SourceTag, raws: &[Value]) -> Result<Vec<Book>> {
    raws.iter()
        .enumerate()
        .map(|(idx, raw)| {
            let mut book = normalize(source, raw)?;
            if book.id.is_empty() {
                book.id = format!("{source}-{idx}");
            }
            Ok(book)
        })
        .collect()
}

/// Typed, lenient view over a JSON object.
#[derive(Clone, Copy)]
pub(crate) struct Fields<'a> {
    tag: SourceTag,
    obj: Option<&'a Map<String, Value>>,
}

impl<'a> Fields<'a> {
    pub(crate) fn root(tag: SourceTag, v: &'a Value) -> Result<Self> {
        match v {
            Value::Object(obj) => Ok(Self { tag, obj: Some(obj) }),
            _ => Err(CoreError::MalformedRecord(tag)),
        }
    }

    fn malformed(&self, field: &'static str, expected: &'static str) -> CoreError {
        CoreError::MalformedField {
            tag: self.tag,
            field,
            expected,
        }
    }

    fn get(&self, field: &str) -> Option<&'a Value> {
        self.obj?.get(field).filter(|v| !v.is_null())
    }

    /// Nested object; absent yields a view where every field is missing.
    pub(crate) fn object(&self, field: &'static str) -> Result<Fields<'a>> {
        match self.get(field) {
            None => Ok(Self { tag: self.tag, obj: None }),
            Some(Value::Object(obj)) => Ok(Self { tag: self.tag, obj: Some(obj) }),
            Some(_) => Err(self.malformed(field, "an object")),
        }
    }

    pub(crate) fn string(&self, field: &'static str) -> Result<String> {
        match self.get(field) {
            None => Ok(String::new()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(self.malformed(field, "a string")),
        }
    }

    /// Like [`Fields::string`], but numbers are accepted and rendered.
    pub(crate) fn string_or_number(&self, field: &'static str) -> Result<String> {
        match self.get(field) {
            Some(Value::Number(n)) => Ok(n.to_string()),
            _ => self.string(field),
        }
    }

    /// Markup-free text.
    pub(crate) fn text(&self, field: &'static str) -> Result<String> {
        self.string(field).map(|s| plain_text(&s))
    }

    pub(crate) fn array(&self, field: &'static str) -> Result<&'a [Value]> {
        match self.get(field) {
            None => Ok(&[]),
            Some(Value::Array(items)) => Ok(items.as_slice()),
            Some(_) => Err(self.malformed(field, "an array")),
        }
    }

    /// Array of strings, or a single string split on `delimiter`. Entries are
    /// markup-free, trimmed and non-empty.
    pub(crate) fn text_list(&self, field: &'static str, delimiter: char) -> Result<Vec<String>> {
        let raw: Vec<String> = match self.get(field) {
            None => Vec::new(),
            Some(Value::String(s)) => s.split(delimiter).map(ToOwned::to_owned).collect(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    _ => Err(self.malformed(field, "a list of strings")),
                })
                .collect::<Result<_>>()?,
            Some(_) => return Err(self.malformed(field, "a list of strings")),
        };
        Ok(raw
            .iter()
            .map(|s| plain_text(s))
            .filter(|s| !s.is_empty())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn non_object_record_is_malformed() {
        let err = normalize(SourceTag::Google, &json!("nope")).unwrap_err();
        assert!(matches!(err, CoreError::MalformedRecord(SourceTag::Google)));
    }

    #[test]
    fn positional_ids_for_records_without_identifier() {
        let raws = vec![
            json!({"title": "첫 번째 책", "isbn": ""}),
            json!({"title": "두 번째 책"}),
        ];
        let books = normalize_all(SourceTag::Naver, &raws).unwrap();
        assert_eq!(books[0].id, "naver-0");
        assert_eq!(books[1].id, "naver-1");
    }

    #[test]
    fn one_malformed_record_fails_the_page() {
        let raws = vec![json!({"title": "ok"}), json!({"title": 42})];
        let err = normalize_all(SourceTag::Naver, &raws).unwrap_err();
        assert!(matches!(
            err,
            CoreError::MalformedField { tag: SourceTag::Naver, field: "title", .. }
        ));
    }
}
