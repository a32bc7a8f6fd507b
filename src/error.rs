//! Error types for each stage of the pipeline.
//!
//! Every stage gets its own enum so the orchestration layer can report
//! *where* a symbol failed. [`PipelineError`] wraps the per-symbol stages and
//! is what ends up in a [`crate::pipeline::SymbolReport`].

use std::path::PathBuf;
use thiserror::Error;

/// Problems resolving the run configuration. These abort the run before any
/// symbol is processed.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("no symbols configured")]
    NoSymbols,

    #[error("page size must be between 1 and 100, got {0}")]
    PageSize(u32),

    #[error("window must be between 1 and 3650 days, got {0}")]
    WindowDays(i64),

    #[error("invalid endpoint URL {url}: {source}")]
    Endpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Transport-level failures talking to the news search endpoint.
///
/// A search that the endpoint itself rejects (`status != "ok"`) is not an
/// error; it is logged and treated as zero articles.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed search response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failures reading or rewriting the CSV store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("unexpected header in {path}: expected symbol,date,sentiment, found {found}")]
    Schema { path: PathBuf, found: String },

    #[error("failed to replace {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
}

/// Anything that can sink a single symbol's run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("store update failed: {0}")]
    Store(#[from] StoreError),
}
