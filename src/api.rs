//! News search client.
//!
//! This module queries a NewsAPI-compatible `/v2/everything` endpoint for
//! articles mentioning a symbol over a date window.
//!
//! # Architecture
//!
//! - [`NewsSearch`]: Core trait defining a single-page article search
//! - [`NewsApiClient`]: HTTP implementation over `reqwest`
//!
//! # Failure Handling
//!
//! The endpoint reports rejected queries (bad key, rate limit, bad
//! parameters) in the JSON body with `status: "error"`, often alongside a
//! non-2xx HTTP status. Those are logged and yield an empty article list.
//! Transport failures and undecodable bodies are returned as [`FetchError`]
//! so the caller can fail just that symbol.
//!
//! Only one page is requested. There are no retries and no timeout.

use crate::error::FetchError;
use crate::models::{Article, NewsApiResponse};
use crate::utils::truncate_for_log;
use chrono::NaiveDate;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://newsapi.org/v2/everything";
pub const MAX_PAGE_SIZE: u32 = 100;

const LANGUAGE: &str = "en";
const SORT_BY: &str = "relevancy";

/// One search: a symbol over an inclusive date window.
#[derive(Debug, Clone)]
pub struct NewsQuery {
    pub symbol: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// Maximum number of articles to request, 1 to 100.
    pub page_size: u32,
}

/// Trait for a single-page news search.
///
/// Implementors return the articles of the first result page. A search the
/// backend rejects is an empty result, not an error.
#[allow(async_fn_in_trait)]
pub trait NewsSearch {
    async fn search(&self, query: &NewsQuery) -> Result<Vec<Article>, FetchError>;
}

/// HTTP client for a NewsAPI-compatible search endpoint.
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl NewsApiClient {
    /// Build a client for `endpoint`. An empty `api_key` is treated as absent.
    pub fn new(endpoint: Url, api_key: Option<String>) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoint,
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    /// Full request URL for `query`, including the API key when set.
    pub fn request_url(&self, query: &NewsQuery) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("q", &query.symbol)
                .append_pair("from", &query.from.format("%Y-%m-%d").to_string())
                .append_pair("to", &query.to.format("%Y-%m-%d").to_string())
                .append_pair("language", LANGUAGE)
                .append_pair("sortBy", SORT_BY)
                .append_pair("pageSize", &query.page_size.min(MAX_PAGE_SIZE).to_string());
            if let Some(key) = &self.api_key {
                pairs.append_pair("apiKey", key);
            }
        }
        url
    }
}

impl NewsSearch for NewsApiClient {
    #[instrument(level = "info", skip_all, fields(symbol = %query.symbol, from = %query.from, to = %query.to))]
    async fn search(&self, query: &NewsQuery) -> Result<Vec<Article>, FetchError> {
        let t0 = Instant::now();
        let response = self.http.get(self.request_url(query)).send().await?;
        let http_status = response.status();
        let body = response.text().await?;
        let elapsed_ms = t0.elapsed().as_millis();
        debug!(%http_status, bytes = body.len(), elapsed_ms, "Search response received");

        let parsed: NewsApiResponse = serde_json::from_str(&body).inspect_err(|e| {
            warn!(
                %http_status,
                error = %e,
                body_preview = %truncate_for_log(&body, 300),
                "Undecodable search response"
            )
        })?;

        Ok(articles_from_response(&query.symbol, parsed))
    }
}

/// Articles of a successful response; an empty list (and a warning) otherwise.
pub fn articles_from_response(symbol: &str, response: NewsApiResponse) -> Vec<Article> {
    if response.is_ok() {
        info!(
            %symbol,
            returned = response.articles.len(),
            total_results = ?response.totalResults,
            "Search succeeded"
        );
        return response.articles;
    }

    let message = response.message.as_deref().unwrap_or("Unknown error");
    warn!(
        %symbol,
        code = ?response.code,
        "Error fetching news for {symbol}: {message}"
    );
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn query() -> NewsQuery {
        NewsQuery {
            symbol: "SPY".to_string(),
            from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            page_size: 100,
        }
    }

    fn params(url: &Url) -> HashMap<String, String> {
        url.query_pairs().into_owned().collect()
    }

    #[test]
    fn test_request_url_parameters() {
        let client = NewsApiClient::new(
            Url::parse(DEFAULT_ENDPOINT).unwrap(),
            Some("secret".to_string()),
        )
        .unwrap();

        let url = client.request_url(&query());
        assert_eq!(url.path(), "/v2/everything");

        let p = params(&url);
        assert_eq!(p["q"], "SPY");
        assert_eq!(p["from"], "2024-01-01");
        assert_eq!(p["to"], "2024-01-02");
        assert_eq!(p["language"], "en");
        assert_eq!(p["sortBy"], "relevancy");
        assert_eq!(p["pageSize"], "100");
        assert_eq!(p["apiKey"], "secret");
    }

    #[test]
    fn test_request_url_without_key() {
        let client = NewsApiClient::new(
            Url::parse(DEFAULT_ENDPOINT).unwrap(),
            Some(String::new()),
        )
        .unwrap();

        let p = params(&client.request_url(&query()));
        assert!(!p.contains_key("apiKey"));
    }

    #[test]
    fn test_request_url_caps_page_size() {
        let client = NewsApiClient::new(Url::parse(DEFAULT_ENDPOINT).unwrap(), None).unwrap();
        let mut q = query();
        q.page_size = 500;
        assert_eq!(params(&client.request_url(&q))["pageSize"], "100");
    }

    #[test]
    fn test_request_url_encodes_symbol() {
        let client = NewsApiClient::new(Url::parse(DEFAULT_ENDPOINT).unwrap(), None).unwrap();
        let mut q = query();
        q.symbol = "BRK.B & co".to_string();
        let url = client.request_url(&q);
        assert!(!url.as_str().contains(' '));
        assert_eq!(params(&url)["q"], "BRK.B & co");
    }

    #[test]
    fn test_articles_from_ok_response() {
        let json = r#"{
            "status": "ok",
            "totalResults": 2,
            "articles": [
                {"publishedAt": "2024-01-01T10:00:00Z", "content": "great news"},
                {"publishedAt": "2024-01-01T12:00:00Z", "content": null, "description": null}
            ]
        }"#;
        let response: NewsApiResponse = serde_json::from_str(json).unwrap();
        let articles = articles_from_response("SPY", response);
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].content.as_deref(), Some("great news"));
    }

    #[test]
    fn test_articles_from_error_response_is_empty() {
        let json = r#"{"status": "error", "code": "rateLimited", "message": "Too many requests"}"#;
        let response: NewsApiResponse = serde_json::from_str(json).unwrap();
        assert!(articles_from_response("SPY", response).is_empty());
    }

    #[test]
    fn test_articles_from_error_response_without_message() {
        let json = r#"{"status": "error"}"#;
        let response: NewsApiResponse = serde_json::from_str(json).unwrap();
        assert!(articles_from_response("QQQ", response).is_empty());
    }
}
