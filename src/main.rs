//! # News Sentiment
//!
//! Fetches recent news articles for a set of ticker symbols, scores each
//! article's text for sentiment, averages the scores per publication day, and
//! appends the daily averages to a CSV store without duplicating days that
//! are already recorded.
//!
//! ## Usage
//!
//! ```sh
//! NEWSAPI_KEY=... news_sentiment -s SPY,QQQ,IWM -o news_sentiment.csv
//! ```
//!
//! ## Architecture
//!
//! For each symbol, in order:
//! 1. **Fetching**: One page of articles from the news search endpoint for
//!    yesterday through today
//! 2. **Scoring**: Each article's text scored with a lexicon analyzer
//! 3. **Aggregating**: Scores averaged per publication date, rounded to 2 places
//! 4. **Merging**: Dates not yet stored for the symbol appended to the CSV
//!
//! A symbol that fails is logged and skipped; the process exits non-zero if
//! any symbol failed.

use clap::Parser;
use std::error::Error;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregate;
mod api;
mod cli;
mod config;
mod error;
mod models;
mod pipeline;
mod sentiment;
mod store;
mod utils;

use api::NewsApiClient;
use cli::Cli;
use config::Config;
use sentiment::LexiconAnalyzer;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_sentiment starting up");

    let args = Cli::parse();
    debug!(?args.config, ?args.symbols, ?args.store_path, "Parsed CLI arguments");

    let config = match Config::resolve(args) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    info!(
        symbols = ?config.symbols,
        store_path = %config.store_path.display(),
        window_days = config.window_days,
        page_size = config.page_size,
        endpoint = %config.endpoint,
        "Configuration resolved"
    );

    let client = NewsApiClient::new(config.endpoint.clone(), config.api_key.clone())?;
    let analyzer = LexiconAnalyzer::new();
    let summary = pipeline::run(&config, &client, &analyzer, utils::utc_today()).await;

    for report in &summary.reports {
        match &report.result {
            Ok(outcome) => info!(
                symbol = %report.symbol,
                articles = outcome.articles,
                days = outcome.daily.len(),
                outcome = %outcome.merge,
                "Symbol summary"
            ),
            Err(e) => error!(symbol = %report.symbol, error = %e, "Symbol summary"),
        }
    }

    let elapsed = start_time.elapsed();
    let failed: Vec<&str> = summary.failures().map(|r| r.symbol.as_str()).collect();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        appended = summary.total_appended(),
        failed = failed.len(),
        "Execution complete"
    );

    if summary.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        error!(symbols = ?failed, "Some symbols failed");
        Ok(ExitCode::FAILURE)
    }
}
