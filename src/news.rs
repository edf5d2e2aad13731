//! News API access and headline routing.
//!
//! [`route`] turns the user's (country, language, category) selection into a
//! [`NewsQuery`]; a [`NewsSource`] executes it. [`NewsApiClient`] is the HTTP
//! implementation against a NewsAPI-compatible service.
//!
//! # Routing
//!
//! | Category  | Country | Request                                  |
//! |-----------|---------|------------------------------------------|
//! | `general` | any     | top headlines, no category filter        |
//! | other     | `us`    | top headlines filtered by category       |
//! | other     | not us  | keyword search with the category as term |
//!
//! The last row couples the country and category axes in a way that looks
//! accidental. It is kept as-is pending a product decision.

use crate::error::{Error, Result};
use crate::models::{Article, Category};
use crate::utils::truncate_for_log;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2";
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// A request to the news source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewsQuery {
    /// Curated top articles for a country.
    TopHeadlines {
        country: String,
        language: String,
        category: Option<Category>,
    },
    /// Free-text search sorted by recency.
    Everything { query: String, language: String },
}

/// Pick the request for a headline fetch.
pub fn route(country: &str, language: &str, category: Category) -> NewsQuery {
    let is_us = country.eq_ignore_ascii_case("us");
    if category == Category::General || is_us {
        NewsQuery::TopHeadlines {
            country: country.to_string(),
            language: language.to_string(),
            category: (is_us && category != Category::General).then_some(category),
        }
    } else {
        NewsQuery::Everything {
            query: category.as_str().to_string(),
            language: language.to_string(),
        }
    }
}

/// Anything that can answer a [`NewsQuery`].
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch(&self, query: &NewsQuery) -> Result<Vec<Article>>;
}

/// Response envelope shared by both NewsAPI endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArticleResponse {
    status: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    total_results: Option<u64>,
    #[serde(default)]
    articles: Option<Vec<Article>>,
}

/// HTTP client for a NewsAPI-compatible service.
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    page_size: u32,
}

impl NewsApiClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Client against a NewsAPI-compatible service rooted at `base_url`.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Sent as `X-Api-Key` on every request
    /// * `base_url` - Service root, e.g. `https://newsapi.org/v2`
    ///
    /// # Errors
    ///
    /// `Error::Url` for an unparseable base url, `Error::Http` if the HTTP
    /// client cannot be built.
    pub fn with_base_url(api_key: impl Into<String>, base_url: &str) -> Result<Self> {
        // Validate early so a bad config fails at startup, not on first fetch.
        Url::parse(base_url)?;
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Number of articles requested by keyword searches.
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    fn request_for(&self, query: &NewsQuery) -> Result<Url> {
        let url = match query {
            NewsQuery::TopHeadlines {
                country,
                language,
                category,
            } => {
                let mut url = Url::parse(&format!("{}/top-headlines", self.base_url))?;
                {
                    let mut pairs = url.query_pairs_mut();
                    pairs.append_pair("country", &country.to_lowercase());
                    pairs.append_pair("language", &language.to_lowercase());
                    if let Some(category) = category {
                        pairs.append_pair("category", category.as_str());
                    }
                }
                url
            }
            NewsQuery::Everything { query, language } => {
                let mut url = Url::parse(&format!("{}/everything", self.base_url))?;
                url.query_pairs_mut()
                    .append_pair("q", query)
                    .append_pair("language", &language.to_lowercase())
                    .append_pair("sortBy", "publishedAt")
                    .append_pair("pageSize", &self.page_size.to_string());
                url
            }
        };
        Ok(url)
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    #[instrument(level = "info", skip_all, fields(?query))]
    async fn fetch(&self, query: &NewsQuery) -> Result<Vec<Article>> {
        let t0 = Instant::now();
        let url = self.request_for(query)?;
        debug!(%url, "Requesting articles");

        let response = self
            .http
            .get(url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;
        let http_status = response.status();
        let body = response.text().await?;

        let parsed = match serde_json::from_str::<ArticleResponse>(&body) {
            Ok(parsed) => parsed,
            Err(e) if !http_status.is_success() => {
                warn!(%http_status, error = %e, "Unreadable error response");
                return Err(Error::NewsApi {
                    code: http_status.as_u16().to_string(),
                    message: truncate_for_log(&body, 200),
                });
            }
            Err(e) => return Err(e.into()),
        };

        if parsed.status != "ok" || !http_status.is_success() {
            let code = parsed
                .code
                .unwrap_or_else(|| http_status.as_u16().to_string());
            let message = parsed.message.unwrap_or_else(|| "unknown error".to_string());
            warn!(%code, %message, "News API returned an error");
            return Err(Error::NewsApi { code, message });
        }

        let articles = parsed.articles.unwrap_or_default();
        info!(
            count = articles.len(),
            total_results = parsed.total_results,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched articles"
        );
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_route_general_us() {
        assert_eq!(
            route("us", "en", Category::General),
            NewsQuery::TopHeadlines {
                country: "us".to_string(),
                language: "en".to_string(),
                category: None,
            }
        );
    }

    #[test]
    fn test_route_business_us() {
        assert_eq!(
            route("us", "en", Category::Business),
            NewsQuery::TopHeadlines {
                country: "us".to_string(),
                language: "en".to_string(),
                category: Some(Category::Business),
            }
        );
    }

    #[test]
    fn test_route_business_gb_becomes_keyword_search() {
        assert_eq!(
            route("gb", "en", Category::Business),
            NewsQuery::Everything {
                query: "business".to_string(),
                language: "en".to_string(),
            }
        );
    }

    #[test]
    fn test_route_general_other_country() {
        assert_eq!(
            route("de", "de", Category::General),
            NewsQuery::TopHeadlines {
                country: "de".to_string(),
                language: "de".to_string(),
                category: None,
            }
        );
    }

    #[test]
    fn test_route_country_is_case_insensitive() {
        assert!(matches!(
            route("US", "en", Category::Sports),
            NewsQuery::TopHeadlines {
                category: Some(Category::Sports),
                ..
            }
        ));
    }

    fn ok_body() -> serde_json::Value {
        serde_json::json!({
            "status": "ok",
            "totalResults": 2,
            "articles": [
                {"source": {"id": null, "name": "Wire"}, "title": "One", "url": "https://x/1",
                 "urlToImage": null, "publishedAt": "2025-05-06T12:00:00Z"},
                {"source": {"id": null, "name": "Wire"}, "title": "Two", "url": "https://x/2"}
            ]
        })
    }

    #[tokio::test]
    async fn test_top_headlines_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/top-headlines"))
            .and(header("X-Api-Key", "secret"))
            .and(query_param("country", "us"))
            .and(query_param("language", "en"))
            .and(query_param("category", "business"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = NewsApiClient::with_base_url("secret", &format!("{}/v2/", server.uri())).unwrap();
        let articles = client
            .fetch(&route("us", "en", Category::Business))
            .await
            .unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title.as_deref(), Some("One"));
    }

    #[tokio::test]
    async fn test_top_headlines_without_category() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/top-headlines"))
            .and(query_param("country", "fr"))
            .and(query_param_is_missing("category"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = NewsApiClient::with_base_url("k", &server.uri()).unwrap();
        let articles = client
            .fetch(&route("fr", "fr", Category::General))
            .await
            .unwrap();
        assert_eq!(articles.len(), 2);
    }

    #[tokio::test]
    async fn test_everything_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/everything"))
            .and(query_param("q", "rust language"))
            .and(query_param("language", "en"))
            .and(query_param("sortBy", "publishedAt"))
            .and(query_param("pageSize", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = NewsApiClient::with_base_url("k", &server.uri()).unwrap();
        let query = NewsQuery::Everything {
            query: "rust language".to_string(),
            language: "EN".to_string(),
        };
        assert_eq!(client.fetch(&query).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_error_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "status": "error",
                "code": "apiKeyInvalid",
                "message": "Your API key is invalid or incorrect."
            })))
            .mount(&server)
            .await;

        let client = NewsApiClient::with_base_url("bad", &server.uri()).unwrap();
        let err = client
            .fetch(&route("us", "en", Category::General))
            .await
            .unwrap_err();
        match err {
            Error::NewsApi { code, .. } => assert_eq!(code, "apiKeyInvalid"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = NewsApiClient::with_base_url("k", &server.uri()).unwrap();
        let err = client
            .fetch(&route("us", "en", Category::General))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NewsApi { ref code, .. } if code == "502"));
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(matches!(
            NewsApiClient::with_base_url("k", "not a url"),
            Err(Error::Url(_))
        ));
    }
}
