use std::time::Duration;

use async_trait::async_trait;
use bookscope_core::SourceTag;
use bookscope_core::config::NaverConfig;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::warn;

use crate::error::{Result, SourceError};
use crate::http::{RateLimitedClient, USER_AGENT};
use crate::sources::{BookSource, items};

const MAX_DISPLAY: usize = 100;
const DEFAULT_LIMIT: usize = 20;

const CLIENT_ID_HEADER: &str = "x-naver-client-id";
const CLIENT_SECRET_HEADER: &str = "x-naver-client-secret";

#[derive(Debug, Clone)]
pub struct NaverCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl NaverCredentials {
    /// Both variables must be set and non-empty.
    pub fn from_env(id_var: &str, secret_var: &str) -> Option<Self> {
        let client_id = std::env::var(id_var).ok().filter(|v| !v.is_empty())?;
        let client_secret = std::env::var(secret_var).ok().filter(|v| !v.is_empty())?;
        Some(Self {
            client_id,
            client_secret,
        })
    }
}

/// Naver book search (`/v1/search/book.json`).
///
/// Without credentials every search returns an empty list so the other
/// sources can still answer.
pub struct NaverBooksSource {
    client: RateLimitedClient,
    base_url: String,
    credentials: Option<NaverCredentials>,
    default_limit: usize,
}

impl NaverBooksSource {
    pub fn with_params(
        base_url: &str,
        min_interval: Duration,
        credentials: Option<NaverCredentials>,
    ) -> Result<Self> {
        Ok(Self {
            client: RateLimitedClient::new(min_interval, 2, USER_AGENT)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            default_limit: DEFAULT_LIMIT,
        })
    }

    pub fn from_config(config: &NaverConfig, default_limit: usize) -> Result<Self> {
        let credentials =
            NaverCredentials::from_env(&config.client_id_env, &config.client_secret_env);
        let mut source = Self::with_params(
            &config.base_url,
            Duration::from_millis(config.min_interval_ms),
            credentials,
        )?;
        source.default_limit = default_limit.clamp(1, MAX_DISPLAY);
        Ok(source)
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    fn search_url(&self, query: &str, limit: usize) -> String {
        format!(
            "{}/v1/search/book.json?query={}&display={}",
            self.base_url,
            urlencoding::encode(query),
            limit.clamp(1, MAX_DISPLAY)
        )
    }
}

fn auth_headers(credentials: &NaverCredentials) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in [
        (CLIENT_ID_HEADER, &credentials.client_id),
        (CLIENT_SECRET_HEADER, &credentials.client_secret),
    ] {
        let value = HeaderValue::from_str(value)
            .map_err(|e| SourceError::Client(format!("invalid {name} header: {e}")))?;
        headers.insert(HeaderName::from_static(name), value);
    }
    Ok(headers)
}

#[async_trait]
impl BookSource for NaverBooksSource {
    fn tag(&self) -> SourceTag {
        SourceTag::Naver
    }

    fn default_limit(&self) -> usize {
        self.default_limit
    }

    async fn search_raw(&self, query: &str, limit: usize) -> Result<Vec<Value>> {
        let Some(credentials) = &self.credentials else {
            warn!("naver credentials are not configured; skipping naver search");
            return Ok(Vec::new());
        };
        if limit == 0 || query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let body: Value = self
            .client
            .get_json(&self.search_url(query, limit), auth_headers(credentials)?)
            .await?;
        Ok(items(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn credentials() -> NaverCredentials {
        NaverCredentials {
            client_id: "id-123".to_string(),
            client_secret: "secret-456".to_string(),
        }
    }

    fn source(base_url: &str, credentials: Option<NaverCredentials>) -> NaverBooksSource {
        NaverBooksSource::with_params(base_url, Duration::from_secs(0), credentials).unwrap()
    }

    #[tokio::test]
    async fn test_naver_search_sends_credentials() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/v1/search/book.json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".to_string(), "채식주의자".to_string()),
                Matcher::UrlEncoded("display".to_string(), "20".to_string()),
            ]))
            .match_header("x-naver-client-id", "id-123")
            .match_header("x-naver-client-secret", "secret-456")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                "total": 1,
                "start": 1,
                "display": 1,
                "items": [{
                    "title": "채식주의자",
                    "link": "https://search.shopping.naver.com/book/catalog/32482041666",
                    "image": "http://shopping-phinf.pstatic.net/main_3248204/32482041666.jpg",
                    "author": "한강",
                    "discount": "13500",
                    "publisher": "창비",
                    "pubdate": "20220328",
                    "isbn": "9788936434595",
                    "description": "&lt;채식주의자&gt; 개정판"
                }]
            }"#,
            )
            .create_async()
            .await;

        let books = source(&server.url(), Some(credentials()))
            .search("채식주의자", 20)
            .await
            .unwrap();
        m.assert_async().await;

        assert_eq!(books.len(), 1);
        assert_eq!(books[0].source, SourceTag::Naver);
        assert_eq!(books[0].id, "9788936434595");
        assert_eq!(books[0].authors, vec!["한강"]);
        assert_eq!(books[0].published_date, "20220328");
        assert!(books[0].thumbnail_url.starts_with("https://"));
    }

    #[tokio::test]
    async fn test_naver_without_credentials_is_empty() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let s = source(&server.url(), None);
        assert!(!s.has_credentials());
        assert!(s.search("한강", 10).await.unwrap().is_empty());
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_naver_unauthorized_is_api_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/v1/search/book.json")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"errorMessage": "Authentication failed", "errorCode": "024"}"#)
            .create_async()
            .await;

        let err = source(&server.url(), Some(credentials()))
            .search("한강", 10)
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Api(_, _)));
        assert!(!err.is_defect());
    }

    #[test]
    fn test_display_is_clamped() {
        let s = source("https://openapi.example.com/", None);
        assert_eq!(
            s.search_url("rust", 500),
            "https://openapi.example.com/v1/search/book.json?query=rust&display=100"
        );
    }
}
