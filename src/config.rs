//! Run configuration.
//!
//! Settings are layered, highest precedence first:
//! 1. Command-line flags and their environment variables ([`Cli`])
//! 2. The YAML file given with `--config`
//! 3. Built-in defaults
//!
//! # Config File
//!
//! ```yaml
//! symbols: [SPY, QQQ, IWM]
//! api_key: "..."
//! store_path: news_sentiment.csv
//! window_days: 1
//! page_size: 100
//! endpoint: https://newsapi.org/v2/everything
//! ```
//!
//! All keys are optional.

use crate::api::{DEFAULT_ENDPOINT, MAX_PAGE_SIZE};
use crate::cli::Cli;
use crate::error::ConfigError;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};
use url::Url;

pub const DEFAULT_SYMBOLS: [&str; 3] = ["SPY", "QQQ", "IWM"];
pub const DEFAULT_STORE_PATH: &str = "news_sentiment.csv";
pub const DEFAULT_WINDOW_DAYS: i64 = 1;
/// Ten years; the search backend keeps far less history than this.
pub const MAX_WINDOW_DAYS: i64 = 3650;

/// Contents of the optional YAML config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub symbols: Option<Vec<String>>,
    pub api_key: Option<String>,
    pub store_path: Option<PathBuf>,
    pub window_days: Option<i64>,
    pub page_size: Option<u32>,
    pub endpoint: Option<String>,
}

impl FileConfig {
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed = Self::parse(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded config file");
        Ok(parsed)
    }

    pub fn parse(raw: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not a map.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }
}

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Symbols to process, in order, without duplicates.
    pub symbols: Vec<String>,
    /// `None` when no key (or an empty one) was configured.
    pub api_key: Option<String>,
    pub store_path: PathBuf,
    pub window_days: i64,
    pub page_size: u32,
    pub endpoint: Url,
}

impl Config {
    /// Resolve the CLI, reading the config file it names, if any.
    pub fn resolve(cli: Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::merge(cli, file)
    }

    /// Layer `cli` over `file` over the defaults and validate the result.
    pub fn merge(cli: Cli, file: FileConfig) -> Result<Self, ConfigError> {
        let raw_symbols = cli
            .symbols
            .or(file.symbols)
            .unwrap_or_else(|| DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect());
        let symbols = normalize_symbols(raw_symbols);
        if symbols.is_empty() {
            return Err(ConfigError::NoSymbols);
        }

        let page_size = cli.page_size.or(file.page_size).unwrap_or(MAX_PAGE_SIZE);
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ConfigError::PageSize(page_size));
        }

        let window_days = cli
            .window_days
            .or(file.window_days)
            .unwrap_or(DEFAULT_WINDOW_DAYS);
        if !(1..=MAX_WINDOW_DAYS).contains(&window_days) {
            return Err(ConfigError::WindowDays(window_days));
        }

        let endpoint_raw = cli
            .endpoint
            .or(file.endpoint)
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let endpoint = Url::parse(&endpoint_raw).map_err(|source| ConfigError::Endpoint {
            url: endpoint_raw.clone(),
            source,
        })?;

        let api_key = cli
            .api_key
            .or(file.api_key)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        if api_key.is_none() {
            warn!("No API key configured (set NEWSAPI_KEY); searches will likely be rejected");
        }

        let store_path = cli
            .store_path
            .or(file.store_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH));

        Ok(Self {
            symbols,
            api_key,
            store_path,
            window_days,
            page_size,
            endpoint,
        })
    }

    /// Search window ending at `today`.
    pub fn window(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        crate::utils::date_window(today, self.window_days.unsigned_abs())
    }
}

/// Trim, drop blanks, and drop repeats (keeping the first occurrence).
fn normalize_symbols(raw: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}
