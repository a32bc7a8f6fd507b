//! Per-symbol orchestration: fetch, score, aggregate, merge.
//!
//! Symbols are processed one after another in configured order. A failure
//! on one symbol (transport error, unreadable store) is logged and recorded
//! in its [`SymbolReport`]; the remaining symbols still run.

use crate::aggregate::aggregate_daily_sentiment;
use crate::api::{NewsQuery, NewsSearch};
use crate::config::Config;
use crate::error::PipelineError;
use crate::models::DailySentiment;
use crate::sentiment::SentimentScorer;
use crate::store::{MergeOutcome, merge_into_store};
use crate::utils::format_daily;
use chrono::NaiveDate;
use tracing::{error, info, instrument};

/// What a successful symbol run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolOutcome {
    pub articles: usize,
    pub daily: DailySentiment,
    pub merge: MergeOutcome,
}

#[derive(Debug)]
pub struct SymbolReport {
    pub symbol: String,
    pub result: Result<SymbolOutcome, PipelineError>,
}

/// Reports for every configured symbol, in processing order.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<SymbolReport>,
}

impl RunSummary {
    pub fn failures(&self) -> impl Iterator<Item = &SymbolReport> {
        self.reports.iter().filter(|r| r.result.is_err())
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn total_appended(&self) -> usize {
        self.reports
            .iter()
            .filter_map(|r| r.result.as_ref().ok())
            .map(|o| o.merge.appended())
            .sum()
    }
}

/// Run every configured symbol through the pipeline, using `today` (UTC) to
/// place the search window.
#[instrument(level = "info", skip_all, fields(symbols = config.symbols.len(), %today))]
pub async fn run<N, S>(config: &Config, source: &N, scorer: &S, today: NaiveDate) -> RunSummary
where
    N: NewsSearch,
    S: SentimentScorer + ?Sized,
{
    let (from, to) = config.window(today);
    let mut summary = RunSummary::default();

    for symbol in &config.symbols {
        info!(%symbol, "Processing symbol");
        let query = NewsQuery {
            symbol: symbol.clone(),
            from,
            to,
            page_size: config.page_size,
        };

        let result = process_symbol(config, source, scorer, &query).await;
        if let Err(e) = &result {
            error!(%symbol, error = %e, "Symbol failed; continuing with the next one");
        }
        summary.reports.push(SymbolReport {
            symbol: symbol.clone(),
            result,
        });
    }

    info!(
        processed = summary.reports.len(),
        failed = summary.failures().count(),
        appended = summary.total_appended(),
        "Run complete"
    );
    summary
}

#[instrument(level = "info", skip_all, fields(symbol = %query.symbol))]
async fn process_symbol<N, S>(
    config: &Config,
    source: &N,
    scorer: &S,
    query: &NewsQuery,
) -> Result<SymbolOutcome, PipelineError>
where
    N: NewsSearch,
    S: SentimentScorer + ?Sized,
{
    let symbol = &query.symbol;

    let articles = source.search(query).await?;
    info!(%symbol, count = articles.len(), "Fetched {} articles for {symbol}", articles.len());

    let daily = aggregate_daily_sentiment(&articles, scorer);
    info!(%symbol, days = daily.len(), "Aggregated sentiment for {symbol}: {}", format_daily(&daily));

    let merge = merge_into_store(symbol, &daily, &config.store_path)?;
    match merge {
        MergeOutcome::Appended(n) => {
            info!(%symbol, appended = n, "Updated store with {n} new records for {symbol}")
        }
        MergeOutcome::NoNewRecords => info!(%symbol, "No new records to add for {symbol}"),
    }

    Ok(SymbolOutcome {
        articles: articles.len(),
        daily,
        merge,
    })
}
