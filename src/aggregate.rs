//! Daily aggregation of article sentiment.

use crate::models::{Article, DailySentiment};
use crate::sentiment::{SentimentScorer, score};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, instrument, trace};

/// Group articles by publication date and average their sentiment.
///
/// Articles whose `publishedAt` is missing or does not start with a valid
/// `YYYY-MM-DD` date are skipped. Articles without usable text still count,
/// scored as neutral `0.0`. Each day's mean is rounded to two decimals.
#[instrument(level = "debug", skip_all, fields(articles = articles.len()))]
pub fn aggregate_daily_sentiment<S>(articles: &[Article], scorer: &S) -> DailySentiment
where
    S: SentimentScorer + ?Sized,
{
    let mut per_date: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    let mut skipped = 0usize;

    for article in articles {
        let Some(date) = article.published_date() else {
            skipped += 1;
            continue;
        };
        let sentiment = score(scorer, article.text());
        trace!(
            %date,
            sentiment,
            title = ?article.title,
            source = ?article.source_name(),
            url = ?article.url,
            "Scored article"
        );
        per_date.entry(date).or_default().push(sentiment);
    }

    if skipped > 0 {
        debug!(skipped, "Skipped articles without a valid publication date");
    }

    per_date
        .into_iter()
        .filter(|(_, scores)| !scores.is_empty())
        .map(|(date, scores)| {
            let mean = scores.iter().sum::<f64>() / scores.len() as f64;
            (date, round2(mean))
        })
        .collect()
}

/// Round to two decimal places.
///
/// Works on the exact binary value with ties to even, so `0.125` becomes
/// `0.12` and `0.015` (really `0.01499…`) becomes `0.01`. Negative zero is
/// normalised to `0.0`.
pub fn round2(value: f64) -> f64 {
    let rounded = format!("{value:.2}").parse::<f64>().unwrap_or(value);
    if rounded == 0.0 { 0.0 } else { rounded }
}
