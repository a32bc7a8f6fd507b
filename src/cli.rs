//! Command-line interface definitions for News Sentiment.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Most options can also be provided via environment variables or a YAML
//! config file; see [`crate::config`] for how the layers combine.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the News Sentiment application.
///
/// Every option is optional. Unset options fall back to the config file, then
/// to built-in defaults.
///
/// # Examples
///
/// ```sh
/// # Default symbols (SPY, QQQ, IWM) into ./news_sentiment.csv
/// NEWSAPI_KEY=... news_sentiment
///
/// # Custom symbols and store
/// news_sentiment -s AAPL,MSFT -o data/sentiment.csv
///
/// # Everything from a config file
/// news_sentiment -c sentiment.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Comma-separated ticker symbols to process, in order
    #[arg(short, long, env = "NEWS_SYMBOLS", value_delimiter = ',')]
    pub symbols: Option<Vec<String>>,

    /// NewsAPI key
    #[arg(long, env = "NEWSAPI_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Path of the CSV sentiment store
    #[arg(short = 'o', long, env = "NEWS_SENTIMENT_CSV")]
    pub store_path: Option<PathBuf>,

    /// Number of days before today to search from
    #[arg(short, long)]
    pub window_days: Option<i64>,

    /// Maximum articles requested per symbol (1-100)
    #[arg(short, long)]
    pub page_size: Option<u32>,

    /// Search endpoint URL
    #[arg(long, env = "NEWSAPI_ENDPOINT")]
    pub endpoint: Option<String>,
}
