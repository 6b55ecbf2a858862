//! Line shopping and pipeline summary helpers.

use crate::models::{GameOddsSet, PredictionSet, SourceKind, SportsbookQuote};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single best price and the book offering it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestLine<T> {
    pub book_name: String,
    pub value: T,
}

/// Best available price for each side of each market in one odds set.
///
/// Spreads are reported from each side's perspective, so the best home
/// spread is the largest home line and the best away spread the largest
/// away line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestLines {
    pub home_spread: BestLine<f64>,
    pub away_spread: BestLine<f64>,
    pub over: BestLine<f64>,
    pub under: BestLine<f64>,
    pub home_moneyline: BestLine<i32>,
    pub away_moneyline: BestLine<i32>,
}

fn pick_max<T, F>(quotes: &[&SportsbookQuote], value: F) -> Option<BestLine<T>>
where
    T: PartialOrd + Copy,
    F: Fn(&SportsbookQuote) -> T,
{
    let mut best: Option<BestLine<T>> = None;
    for &quote in quotes {
        let v = value(quote);
        // Ties keep the first book in name order
        let better = match &best {
            Some(current) => v > current.value,
            None => true,
        };
        if better {
            best = Some(BestLine {
                book_name: quote.book_name.clone(),
                value: v,
            });
        }
    }
    best
}

/// `None` for an odds set with no quotes
pub fn best_lines(set: &GameOddsSet) -> Option<BestLines> {
    let quotes: Vec<&SportsbookQuote> = set.sportsbooks.values().collect();

    let over = pick_max(&quotes, |q| -q.total)?;
    let over = BestLine {
        book_name: over.book_name,
        value: -over.value + 0.0,
    };

    Some(BestLines {
        home_spread: pick_max(&quotes, |q| q.spread)?,
        away_spread: pick_max(&quotes, |q| q.away_spread())?,
        over,
        under: pick_max(&quotes, |q| q.total)?,
        home_moneyline: pick_max(&quotes, |q| q.moneyline_home)?,
        away_moneyline: pick_max(&quotes, |q| q.moneyline_away)?,
    })
}

/// Headline numbers for one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub games_tracked: usize,
    pub sportsbooks: usize,
    /// Mean confidence across every named model result
    pub average_confidence: f64,
    /// Mean consensus overall confidence
    pub consensus_confidence: f64,
    pub source: Option<SourceKind>,
    pub timestamp: DateTime<Utc>,
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        0.0
    } else {
        ((sum / count as f64) * 10.0).round() / 10.0
    }
}

impl PipelineSummary {
    pub fn compute(
        odds: &[GameOddsSet],
        predictions: &PredictionSet,
        source: Option<SourceKind>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let books: BTreeSet<&str> = odds
            .iter()
            .flat_map(|set| set.sportsbooks.keys().map(String::as_str))
            .collect();

        let average_confidence = mean(
            predictions
                .values()
                .flat_map(|p| p.models.values().map(|m| m.confidence)),
        );
        let consensus_confidence =
            mean(predictions.values().map(|p| p.consensus.overall_confidence));

        Self {
            games_tracked: odds.len(),
            sportsbooks: books.len(),
            average_confidence,
            consensus_confidence,
            source,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Game;
    use crate::prediction::PredictionEngine;
    use chrono::TimeZone;

    fn quote(book: &str, spread: f64, total: f64, ml_home: i32, ml_away: i32) -> SportsbookQuote {
        SportsbookQuote {
            book_name: book.to_string(),
            spread,
            total,
            moneyline_home: ml_home,
            moneyline_away: ml_away,
            vig: -110,
            total_vig: -110,
            last_update: Utc.with_ymd_and_hms(2025, 9, 7, 12, 0, 0).unwrap(),
        }
    }

    fn sample() -> GameOddsSet {
        let at = Utc.with_ymd_and_hms(2025, 9, 7, 12, 0, 0).unwrap();
        GameOddsSet::new(
            Game::new("Dallas Cowboys", "Philadelphia Eagles", at),
            SourceKind::OddsApi,
            at,
        )
        .with_quotes([
            quote("DraftKings", -7.0, 47.5, -320, 260),
            quote("FanDuel", -6.5, 48.0, -300, 250),
            quote("BetMGM", -7.5, 46.5, -340, 275),
        ])
    }

    #[test]
    fn test_best_lines() {
        let best = best_lines(&sample()).unwrap();

        assert_eq!(best.home_spread.book_name, "FanDuel");
        assert_eq!(best.home_spread.value, -6.5);
        assert_eq!(best.away_spread.book_name, "BetMGM");
        assert_eq!(best.away_spread.value, 7.5);
        assert_eq!(best.over.book_name, "BetMGM");
        assert_eq!(best.over.value, 46.5);
        assert_eq!(best.under.book_name, "FanDuel");
        assert_eq!(best.under.value, 48.0);
        assert_eq!(best.home_moneyline.value, -300);
        assert_eq!(best.away_moneyline.book_name, "BetMGM");
    }

    #[test]
    fn test_best_lines_empty_set() {
        let at = Utc::now();
        let set = GameOddsSet::new(Game::new("A", "B", at), SourceKind::OddsApi, at);
        assert!(best_lines(&set).is_none());
    }

    #[test]
    fn test_summary() {
        let odds = vec![sample()];
        let engine = PredictionEngine::new();
        let predictions = engine.predict_all(odds.iter().map(|s| &s.game));
        let at = Utc::now();

        let summary = PipelineSummary::compute(&odds, &predictions, Some(SourceKind::OddsApi), at);
        assert_eq!(summary.games_tracked, 1);
        assert_eq!(summary.sportsbooks, 3);
        assert!(summary.average_confidence >= 50.0 && summary.average_confidence <= 70.0);
        assert!(summary.consensus_confidence > 0.0);
        assert_eq!(summary.source, Some(SourceKind::OddsApi));
    }

    #[test]
    fn test_summary_of_nothing() {
        let summary = PipelineSummary::compute(&[], &PredictionSet::new(), None, Utc::now());
        assert_eq!(summary.games_tracked, 0);
        assert_eq!(summary.average_confidence, 0.0);
    }
}
