//! Lexicon-based sentiment scoring.
//!
//! Text is scored into a single compound polarity value in `[-1, 1]`:
//! `-1` is extremely negative, `+1` extremely positive and `0.0` neutral.
//!
//! # Architecture
//!
//! - [`SentimentScorer`]: Trait for anything mapping text to a compound score
//! - [`LexiconAnalyzer`]: Built-in scorer backed by a valence lexicon
//! - [`score`]: Entry point used by the aggregator; short-circuits missing text
//!
//! # Scoring
//!
//! Each token found in the lexicon contributes its valence (on a `-4..=4`
//! scale). A valence is adjusted by preceding booster or dampener words,
//! flipped and damped when one of the three preceding tokens is a negator,
//! and emphasised when the token is shouted in otherwise mixed-case text.
//! Exclamation marks push the total further from zero. The sum is then
//! normalised with `sum / sqrt(sum² + 15)`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use tracing::trace;

const NORMALIZATION_ALPHA: f64 = 15.0;
const NEGATION_SCALAR: f64 = -0.74;
const BOOSTER_INCREMENT: f64 = 0.293;
const CAPS_INCREMENT: f64 = 0.733;
const EXCLAMATION_INCREMENT: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;
const NEGATION_LOOKBACK: usize = 3;

/// Maps arbitrary text to a compound polarity score in `[-1, 1]`.
pub trait SentimentScorer {
    fn polarity(&self, text: &str) -> f64;
}

/// Score optional article text.
///
/// Missing or empty text is neutral (`0.0`) and never reaches the scorer.
/// Otherwise the scorer's compound value is returned unrounded.
pub fn score<S: SentimentScorer + ?Sized>(scorer: &S, text: Option<&str>) -> f64 {
    match text {
        None | Some("") => 0.0,
        Some(text) => scorer.polarity(text),
    }
}

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z][A-Za-z']*").expect("token regex is valid"));

static LEXICON: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    [
        // general positive
        ("good", 1.9),
        ("great", 3.1),
        ("excellent", 2.7),
        ("amazing", 2.8),
        ("best", 3.2),
        ("better", 1.9),
        ("positive", 2.6),
        ("success", 2.7),
        ("successful", 2.8),
        ("win", 2.8),
        ("wins", 2.7),
        ("strong", 2.3),
        ("stronger", 2.1),
        ("happy", 2.7),
        ("optimistic", 1.3),
        ("optimism", 2.5),
        ("confidence", 2.3),
        ("confident", 2.2),
        ("improve", 1.9),
        ("improved", 2.1),
        ("improvement", 2.0),
        ("benefit", 2.0),
        ("opportunity", 1.8),
        ("love", 3.2),
        ("like", 1.5),
        ("hope", 1.9),
        ("support", 1.7),
        ("welcome", 2.0),
        ("boost", 1.7),
        ("boosted", 1.5),
        ("robust", 1.4),
        ("solid", 1.4),
        ("healthy", 1.7),
        ("beat", 1.2),
        ("beats", 1.2),
        ("upbeat", 1.7),
        ("resilient", 1.4),
        ("record", 1.1),
        // market positive
        ("gain", 2.4),
        ("gains", 1.8),
        ("profit", 1.9),
        ("profits", 1.9),
        ("profitable", 1.9),
        ("growth", 1.6),
        ("rally", 1.6),
        ("rallies", 1.6),
        ("surge", 1.4),
        ("surges", 1.4),
        ("soar", 1.8),
        ("soars", 1.8),
        ("rebound", 1.3),
        ("recovery", 1.4),
        ("bullish", 1.9),
        ("upgrade", 1.6),
        ("upgraded", 1.6),
        ("outperform", 1.7),
        ("outperformed", 1.7),
        // general negative
        ("bad", -2.5),
        ("worse", -2.1),
        ("worst", -3.1),
        ("terrible", -2.1),
        ("awful", -2.0),
        ("poor", -2.1),
        ("negative", -2.7),
        ("fail", -2.5),
        ("fails", -2.1),
        ("failed", -2.3),
        ("failure", -2.3),
        ("weak", -1.9),
        ("weaker", -1.9),
        ("fear", -2.2),
        ("fears", -1.8),
        ("worry", -1.9),
        ("worries", -1.8),
        ("concern", -1.4),
        ("concerns", -1.2),
        ("uncertain", -1.2),
        ("uncertainty", -1.4),
        ("risk", -1.1),
        ("risks", -1.1),
        ("threat", -2.4),
        ("crisis", -3.1),
        ("panic", -2.3),
        ("problem", -1.7),
        ("trouble", -1.7),
        ("warning", -1.4),
        ("warns", -0.4),
        ("hurt", -2.4),
        ("angry", -2.3),
        ("sad", -2.1),
        ("hate", -2.7),
        ("lawsuit", -1.4),
        ("fraud", -2.8),
        ("scandal", -1.9),
        ("miss", -0.6),
        ("misses", -0.9),
        // market negative
        ("loss", -1.3),
        ("losses", -1.7),
        ("lose", -1.7),
        ("losing", -1.6),
        ("decline", -1.6),
        ("declines", -1.4),
        ("drop", -1.1),
        ("drops", -1.1),
        ("fall", -1.1),
        ("falls", -1.1),
        ("slump", -2.0),
        ("plunge", -2.2),
        ("plunges", -2.2),
        ("crash", -1.7),
        ("tumble", -1.8),
        ("selloff", -1.6),
        ("bearish", -1.8),
        ("recession", -2.1),
        ("inflation", -0.6),
        ("downgrade", -1.6),
        ("downgraded", -1.6),
        ("volatile", -0.9),
        ("volatility", -0.7),
        ("bankruptcy", -2.6),
        ("default", -1.6),
        ("layoffs", -1.9),
        ("underperform", -1.6),
    ]
    .into_iter()
    .collect()
});

static NEGATORS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "not", "no", "never", "none", "nobody", "nothing", "neither", "nor", "without", "cannot",
        "isn't", "aren't", "wasn't", "weren't", "don't", "doesn't", "didn't", "won't", "wouldn't",
        "can't", "couldn't", "shouldn't", "hasn't", "haven't", "hadn't",
    ]
    .into_iter()
    .collect()
});

static BOOSTERS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    let up = [
        "very", "extremely", "really", "highly", "incredibly", "hugely", "remarkably", "sharply",
        "significantly", "strongly", "most", "totally", "completely", "absolutely",
    ];
    let down = ["slightly", "somewhat", "barely", "marginally", "hardly", "modestly", "little"];
    up.into_iter()
        .map(|w| (w, BOOSTER_INCREMENT))
        .chain(down.into_iter().map(|w| (w, -BOOSTER_INCREMENT)))
        .collect()
});

/// Scorer backed by a static valence lexicon of general and market vocabulary.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexiconAnalyzer;

impl LexiconAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn valence(&self, tokens: &[&str], idx: usize, mixed_case: bool) -> Option<f64> {
        let raw = tokens[idx];
        let word = raw.to_lowercase();
        let mut valence = *LEXICON.get(word.as_str())?;

        if mixed_case && raw.len() > 1 && raw.chars().all(|c| !c.is_lowercase()) {
            valence += CAPS_INCREMENT.copysign(valence);
        }

        if let Some(prev) = idx.checked_sub(1).map(|i| tokens[i].to_lowercase()) {
            if let Some(&delta) = BOOSTERS.get(prev.as_str()) {
                valence += if valence < 0.0 { -delta } else { delta };
            }
        }

        let start = idx.saturating_sub(NEGATION_LOOKBACK);
        let negated = tokens[start..idx]
            .iter()
            .any(|t| NEGATORS.contains(t.to_lowercase().as_str()));
        if negated {
            valence *= NEGATION_SCALAR;
        }

        Some(valence)
    }
}

impl SentimentScorer for LexiconAnalyzer {
    fn polarity(&self, text: &str) -> f64 {
        let tokens: Vec<&str> = TOKEN_RE.find_iter(text).map(|m| m.as_str()).collect();
        let has_lower = text.chars().any(|c| c.is_lowercase());
        let has_upper = text.chars().any(|c| c.is_uppercase());
        let mixed_case = has_lower && has_upper;

        let mut sum: f64 = (0..tokens.len())
            .filter_map(|i| self.valence(&tokens, i, mixed_case))
            .sum();

        if sum != 0.0 {
            let bangs = text.matches('!').count().min(MAX_EXCLAMATIONS);
            sum += (bangs as f64 * EXCLAMATION_INCREMENT).copysign(sum);
        }

        let compound = normalize(sum);
        trace!(tokens = tokens.len(), sum, compound, "Scored text");
        compound
    }
}

fn normalize(sum: f64) -> f64 {
    if sum == 0.0 {
        return 0.0;
    }
    (sum / (sum * sum + NORMALIZATION_ALPHA).sqrt()).clamp(-1.0, 1.0)
}
