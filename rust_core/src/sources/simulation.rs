//! Rating-based market simulation: the source that never fails.

use super::{OddsSource, SourceError};
use crate::models::{
    BettingVolume, Game, GameOddsSet, MarketContext, SharpMoney, SourceKind,
};
use crate::ratings::RatingTable;
use crate::slate::Slate;
use crate::synth::synthesizer::day_fraction;
use crate::synth::{MarketVariationGenerator, OddsSynthesizer};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const VOLUMES: [BettingVolume; 3] = [BettingVolume::High, BettingVolume::Medium, BettingVolume::Low];
const SHARP_SIDES: [SharpMoney; 3] = [SharpMoney::Home, SharpMoney::Away, SharpMoney::Balanced];

/// Ratings -> synthesized line -> per-book quotes for a single game.
///
/// Shared by the simulation source and by adapters that find games but
/// no odds (ESPN events without odds, scraped matchups).
#[derive(Debug, Clone)]
pub struct MarketSimulator {
    ratings: Arc<RatingTable>,
    synthesizer: OddsSynthesizer,
    variation: MarketVariationGenerator,
}

impl MarketSimulator {
    pub fn new(ratings: Arc<RatingTable>) -> Self {
        Self {
            ratings,
            synthesizer: OddsSynthesizer::new(),
            variation: MarketVariationGenerator::new(),
        }
    }

    pub fn with_synthesizer(mut self, synthesizer: OddsSynthesizer) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    pub fn ratings(&self) -> &RatingTable {
        &self.ratings
    }

    pub fn simulate_game<R: Rng + ?Sized>(
        &self,
        game: &Game,
        source: SourceKind,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> GameOddsSet {
        let away = self.ratings.get(&game.away_team);
        let home = self.ratings.get(&game.home_team);

        let line = self.synthesizer.synthesize(&away, &home, rng);
        let movement = self.synthesizer.market_movement(rng, day_fraction(now));
        let spread = self.synthesizer.apply_movement(line.spread, movement);

        let quotes = self.variation.vary(spread, line.total, now, rng);

        let market = MarketContext {
            market_movement: spread - line.spread + 0.0,
            betting_volume: VOLUMES.choose(rng).copied().unwrap_or(BettingVolume::Medium),
            sharp_money: SHARP_SIDES.choose(rng).copied().unwrap_or(SharpMoney::Balanced),
        };

        let mut set = GameOddsSet::new(game.clone(), source, now).with_quotes(quotes);
        debug!(
            "Simulated {}: spread {:+.1}, total {:.1}",
            game.short_label(),
            spread,
            line.total
        );
        set.market = Some(market);
        set
    }
}

/// Terminal source: simulates every game on the slate.
#[derive(Debug, Clone)]
pub struct SimulationSource {
    simulator: Arc<MarketSimulator>,
    seed: Option<u64>,
}

impl SimulationSource {
    pub fn new(simulator: Arc<MarketSimulator>) -> Self {
        Self {
            simulator,
            seed: None,
        }
    }

    /// Fixed seed: the same slate at the same instant simulates identically
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    pub fn simulate_at(&self, slate: &Slate, now: DateTime<Utc>) -> Vec<GameOddsSet> {
        let mut rng = self.rng();
        let games: Vec<GameOddsSet> = slate
            .games()
            .iter()
            .map(|game| {
                self.simulator
                    .simulate_game(game, SourceKind::Simulation, now, &mut rng)
            })
            .collect();
        debug!("Simulated odds for {} games", games.len());
        games
    }

    /// Infallible; one odds set per slate game
    pub fn simulate(&self, slate: &Slate) -> Vec<GameOddsSet> {
        self.simulate_at(slate, Utc::now())
    }
}

#[async_trait]
impl OddsSource for SimulationSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Simulation
    }

    fn source_name(&self) -> &str {
        "Market Simulation"
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(1)
    }

    async fn fetch(&self, slate: &Slate) -> Result<Vec<GameOddsSet>, SourceError> {
        let games = self.simulate(slate);
        if games.is_empty() {
            return Err(SourceError::EmptyResult);
        }
        Ok(games)
    }
}
