use super::reasoning::{reasoning_bullets, ReasoningInput};
use super::seed::matchup_rng;
use crate::models::{
    ConsensusPrediction, Game, GamePredictions, PickConfidence, PredictionResult, PredictionSet,
    TeamSide, TotalPick,
};
use crate::synth::quantize_half;
use crate::teams;
use rand::Rng;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use tracing::debug;

pub const CONSENSUS_MODEL_NAME: &str = "AI Consensus Analysis";
const CONSENSUS_KEY: &str = "consensus";

/// A named model and the confidence band it draws from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelSpec {
    pub key: &'static str,
    pub name: &'static str,
    pub confidence: (f64, f64),
}

pub const MODELS: [ModelSpec; 5] = [
    ModelSpec { key: "neural_network", name: "Deep Learning Model", confidence: (54.0, 68.0) },
    ModelSpec { key: "ensemble", name: "Ensemble Predictor", confidence: (55.0, 70.0) },
    ModelSpec { key: "bayesian", name: "Bayesian Inference", confidence: (52.0, 66.0) },
    ModelSpec { key: "xgboost", name: "Gradient Boosting", confidence: (53.0, 68.0) },
    ModelSpec { key: "lstm", name: "Time Series LSTM", confidence: (50.0, 65.0) },
];

const EXPECTED_VALUE: RangeInclusive<f64> = -5.0..=15.0;
const KELLY_FRACTION: RangeInclusive<f64> = 1.0..=8.0;
const SPREAD_LINE: RangeInclusive<f64> = -7.0..=7.0;
const PREDICTED_TOTAL: RangeInclusive<f64> = 40.0..=56.0;
const WIN_PROBABILITY: RangeInclusive<f64> = 48.0..=62.0;
const IMPLIED_ODDS: RangeInclusive<i32> = -250..=250;

const CONSENSUS_SPREAD: RangeInclusive<f64> = 58.0..=72.0;
const CONSENSUS_TOTAL: RangeInclusive<f64> = 55.0..=69.0;
const CONSENSUS_MONEYLINE: RangeInclusive<f64> = 52.0..=66.0;
const CONSENSUS_OVERALL: RangeInclusive<f64> = 60.0..=75.0;

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0 + 0.0
}

fn side<R: Rng + ?Sized>(rng: &mut R) -> TeamSide {
    if rng.gen_bool(0.5) {
        TeamSide::Home
    } else {
        TeamSide::Away
    }
}

fn total_pick<R: Rng + ?Sized>(rng: &mut R) -> TotalPick {
    if rng.gen_bool(0.5) {
        TotalPick::Over
    } else {
        TotalPick::Under
    }
}

/// Seeded per-model predictions plus an independently seeded consensus.
///
/// Holds no generator state: every call builds fresh generators from the
/// matchup, so `predict` is safe to call concurrently and repeatably.
#[derive(Debug, Clone)]
pub struct PredictionEngine {
    models: Vec<ModelSpec>,
}

impl Default for PredictionEngine {
    fn default() -> Self {
        Self {
            models: MODELS.to_vec(),
        }
    }
}

impl PredictionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_models(models: Vec<ModelSpec>) -> Self {
        Self { models }
    }

    pub fn models(&self) -> &[ModelSpec] {
        &self.models
    }

    pub fn predict_model(&self, game: &Game, spec: &ModelSpec) -> PredictionResult {
        let mut rng = matchup_rng(&game.away_team, &game.home_team, spec.key);

        let spread_pick = side(&mut rng);
        let spread_line = quantize_half(rng.gen_range(SPREAD_LINE));
        let total_pick = total_pick(&mut rng);
        let predicted_total = round1(rng.gen_range(PREDICTED_TOTAL));
        let moneyline_pick = side(&mut rng);
        let win_probability = round1(rng.gen_range(WIN_PROBABILITY));
        let implied_odds = rng.gen_range(IMPLIED_ODDS);

        let (lo, hi) = spec.confidence;
        let confidence = round1(rng.gen_range(lo..=hi));
        let expected_value = round1(rng.gen_range(EXPECTED_VALUE));
        let kelly_fraction = round1(rng.gen_range(KELLY_FRACTION));

        PredictionResult {
            model_name: spec.name.to_string(),
            spread_pick: game.team(spread_pick).to_string(),
            total_pick,
            moneyline_pick: game.team(moneyline_pick).to_string(),
            confidence,
            expected_value,
            kelly_fraction,
            spread_line,
            predicted_total,
            win_probability,
            implied_odds,
        }
    }

    /// Consensus for a game. Seeded separately from every model, so it is
    /// stable per matchup but never an average of the model outputs.
    pub fn consensus(&self, game: &Game) -> ConsensusPrediction {
        let mut rng = matchup_rng(&game.away_team, &game.home_team, CONSENSUS_KEY);

        let spread_pick = side(&mut rng);
        let total = total_pick(&mut rng);
        let moneyline_pick = side(&mut rng);

        let spread_confidence = round1(rng.gen_range(CONSENSUS_SPREAD));
        let total_confidence = round1(rng.gen_range(CONSENSUS_TOTAL));
        let moneyline_confidence = round1(rng.gen_range(CONSENSUS_MONEYLINE));
        let overall_confidence = round1(rng.gen_range(CONSENSUS_OVERALL));

        let reasoning_bullets = reasoning_bullets(&ReasoningInput {
            away: &game.away_team,
            home: &game.home_team,
            spread_pick,
            total_pick: total,
            moneyline_pick,
            divisional: teams::is_divisional(&game.away_team, &game.home_team),
        });

        ConsensusPrediction {
            model_name: CONSENSUS_MODEL_NAME.to_string(),
            spread: PickConfidence {
                pick: game.team(spread_pick).to_string(),
                confidence: spread_confidence,
            },
            total: PickConfidence {
                pick: total,
                confidence: total_confidence,
            },
            moneyline: PickConfidence {
                pick: game.team(moneyline_pick).to_string(),
                confidence: moneyline_confidence,
            },
            reasoning_bullets,
            overall_confidence,
        }
    }

    pub fn predict(&self, game: &Game) -> GamePredictions {
        let models: BTreeMap<String, PredictionResult> = self
            .models
            .iter()
            .map(|spec| (spec.key.to_string(), self.predict_model(game, spec)))
            .collect();

        GamePredictions {
            consensus: self.consensus(game),
            models,
        }
    }

    /// Predictions keyed by game key ("Away @ Home").
    pub fn predict_all<'a>(&self, games: impl IntoIterator<Item = &'a Game>) -> PredictionSet {
        let set: PredictionSet = games
            .into_iter()
            .map(|game| (game.key(), self.predict(game)))
            .collect();
        debug!("Generated predictions for {} games", set.len());
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn game(away: &str, home: &str) -> Game {
        Game::new(away, home, Utc.with_ymd_and_hms(2025, 9, 7, 17, 0, 0).unwrap())
    }

    #[test]
    fn test_predict_is_deterministic() {
        let engine = PredictionEngine::new();
        let g = game("Dallas Cowboys", "Philadelphia Eagles");
        assert_eq!(engine.predict(&g), engine.predict(&g));

        // Kickoff plays no part in the seed
        let mut later = g.clone();
        later.kickoff = later.kickoff + chrono::Duration::days(1);
        assert_eq!(engine.consensus(&g), engine.consensus(&later));
    }

    #[test]
    fn test_separate_engines_agree() {
        let g = game("Baltimore Ravens", "Buffalo Bills");
        assert_eq!(
            PredictionEngine::new().predict(&g),
            PredictionEngine::new().predict(&g)
        );
    }

    #[test]
    fn test_model_fields_in_range() {
        let engine = PredictionEngine::new();
        for (away, home) in [
            ("Dallas Cowboys", "Philadelphia Eagles"),
            ("Kansas City Chiefs", "Los Angeles Chargers"),
            ("Springfield Atoms", "Shelbyville Sharks"),
        ] {
            let g = game(away, home);
            let predictions = engine.predict(&g);
            assert_eq!(predictions.models.len(), 5);

            for spec in engine.models() {
                let result = &predictions.models[spec.key];
                assert_eq!(result.model_name, spec.name);
                assert!(result.confidence >= spec.confidence.0 && result.confidence <= spec.confidence.1);
                assert!(result.spread_pick == away || result.spread_pick == home);
                assert!(result.moneyline_pick == away || result.moneyline_pick == home);
                assert!((-5.0..=15.0).contains(&result.expected_value));
                assert!((1.0..=8.0).contains(&result.kelly_fraction));
                assert!((-7.0..=7.0).contains(&result.spread_line));
                assert_eq!((result.spread_line * 2.0).fract(), 0.0);
                assert!((40.0..=56.0).contains(&result.predicted_total));
                assert!((48.0..=62.0).contains(&result.win_probability));
                assert!((-250..=250).contains(&result.implied_odds));
            }
        }
    }

    #[test]
    fn test_consensus_shape() {
        let engine = PredictionEngine::new();
        let g = game("Detroit Lions", "Green Bay Packers");
        let consensus = engine.consensus(&g);

        assert_eq!(consensus.model_name, CONSENSUS_MODEL_NAME);
        assert!(consensus.reasoning_bullets.len() >= 4);
        assert!((58.0..=72.0).contains(&consensus.spread.confidence));
        assert!((55.0..=69.0).contains(&consensus.total.confidence));
        assert!((52.0..=66.0).contains(&consensus.moneyline.confidence));
        assert!((60.0..=75.0).contains(&consensus.overall_confidence));

        let expected = if consensus.spread.pick == g.home_team {
            "Home Field Advantage"
        } else {
            "Road Warrior Value"
        };
        assert!(consensus.reasoning_bullets[0].starts_with(expected));
    }

    #[test]
    fn test_matchups_differ() {
        let engine = PredictionEngine::new();
        let a = engine.predict(&game("Dallas Cowboys", "Philadelphia Eagles"));
        let b = engine.predict(&game("Philadelphia Eagles", "Dallas Cowboys"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_predict_all_keys() {
        let engine = PredictionEngine::new();
        let games = vec![
            game("Dallas Cowboys", "Philadelphia Eagles"),
            game("Minnesota Vikings", "Chicago Bears"),
        ];
        let set = engine.predict_all(&games);
        assert_eq!(set.len(), 2);
        assert!(set.contains_key("Minnesota Vikings @ Chicago Bears"));
    }

    #[test]
    fn test_divisional_games_get_rivalry_framing() {
        let engine = PredictionEngine::new();
        let rivals = engine.consensus(&game("Dallas Cowboys", "Philadelphia Eagles"));
        let matchup = &rivals.reasoning_bullets[2];
        assert!(
            ["Division familiarity", "rematch-style", "Rivalry games"]
                .iter()
                .any(|marker| matchup.contains(marker)),
            "{matchup}"
        );

        let cross = engine.consensus(&game("Miami Dolphins", "Indianapolis Colts"));
        assert!(!cross.reasoning_bullets[2].contains("Rivalry games"));
        assert!(!cross.reasoning_bullets[2].contains("Division familiarity"));
    }
}
