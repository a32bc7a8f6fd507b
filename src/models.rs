//! Data models for search results and stored sentiment rows.
//!
//! This module defines the data structures shared by the pipeline stages:
//! - [`Article`]: A single article as returned by the news search endpoint
//! - [`NewsApiResponse`]: The envelope around a page of articles
//! - [`DailySentiment`]: Per-day mean sentiment for one symbol
//! - [`StoredRecord`]: One row of the CSV store
//!
//! The wire models keep the endpoint's camelCase field names, hence the
//! `#[allow(non_snake_case)]` attributes.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Mean sentiment per publication date, ordered by date.
pub type DailySentiment = BTreeMap<NaiveDate, f64>;

/// Column names of the CSV store, in order.
pub const STORE_COLUMNS: [&str; 3] = ["symbol", "date", "sentiment"];

/// The outlet an article came from.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ArticleSource {
    pub name: Option<String>,
}

/// A news article as returned by the search endpoint.
///
/// Every field is optional: the endpoint omits or nulls fields freely and
/// the aggregator decides what to do with gaps.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Article {
    /// Publication timestamp, e.g. `2024-01-01T10:00:00Z`. Only the first ten
    /// characters are used.
    #[serde(default)]
    pub publishedAt: Option<String>,
    /// Truncated article body.
    #[serde(default)]
    pub content: Option<String>,
    /// Short summary, used when `content` is empty.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub source: Option<ArticleSource>,
}

impl Article {
    /// The text to score: `content` if non-empty, otherwise `description` if
    /// non-empty, otherwise `None`.
    pub fn text(&self) -> Option<&str> {
        self.content
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.description.as_deref().filter(|s| !s.is_empty()))
    }

    /// Publication date parsed from the `YYYY-MM-DD` prefix of `publishedAt`.
    pub fn published_date(&self) -> Option<NaiveDate> {
        self.publishedAt.as_deref().and_then(parse_date_prefix)
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source.as_ref().and_then(|s| s.name.as_deref())
    }
}

/// Response envelope of the search endpoint.
///
/// On success `status` is `"ok"` and `articles` is populated. On failure
/// `status` is `"error"` and `code`/`message` describe why.
#[allow(non_snake_case)]
#[derive(Debug, Deserialize, Serialize)]
pub struct NewsApiResponse {
    pub status: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub totalResults: Option<u64>,
    #[serde(default)]
    pub articles: Vec<Article>,
}

impl NewsApiResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// One row of the sentiment store.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StoredRecord {
    pub symbol: String,
    #[serde(serialize_with = "serialize_date", deserialize_with = "deserialize_date")]
    pub date: NaiveDate,
    #[serde(serialize_with = "serialize_sentiment")]
    pub sentiment: f64,
}

/// Parse the first ten characters of `raw` as a `YYYY-MM-DD` date.
pub fn parse_date_prefix(raw: &str) -> Option<NaiveDate> {
    let prefix = raw.get(..10).unwrap_or(raw);
    if prefix.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

fn serialize_date<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&date.format("%Y-%m-%d"))
}

// Accepts plain dates as well as timestamps such as `2024-01-01 00:00:00`.
fn deserialize_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_date_prefix(raw.trim())
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date {raw:?}")))
}

// `-0.0` is written as `0.00`, never `-0.00`.
fn serialize_sentiment<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    let value = if *value == 0.0 { 0.0 } else { *value };
    serializer.collect_str(&format!("{value:.2}"))
}
