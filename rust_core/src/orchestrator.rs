//! Source Orchestrator
//!
//! Tries odds sources in priority order and returns the first usable
//! result. Default chain: Live Session → The Odds API → ESPN → Scrape,
//! with the market simulation as the terminal fallback.
//!
//! Results are never merged across sources. Because the simulation
//! cannot fail, `acquire` on a non-empty slate always returns games.

use crate::models::{GameOddsSet, SourceKind};
use crate::ratings::RatingTable;
use crate::slate::Slate;
use crate::sources::{
    EspnConfig, EspnSource, LiveSessionConfig, LiveSessionSource, MarketSimulator, OddsApiConfig,
    OddsApiSource, OddsSource, ScrapeConfig, ScrapeSource, SimulationSource, SourceError,
};
use chrono::{DateTime, Utc};
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceLevel {
    Info,
    Success,
    Warning,
}

/// One human-readable status line from an acquisition cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceEntry {
    pub source: String,
    pub level: TraceLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Per-caller acquisition state, passed into every `acquire` call.
///
/// Carries the slate plus the outcome of the last successful cycle; the
/// trace is reset at the start of each cycle.
#[derive(Debug, Clone)]
pub struct AcquisitionContext {
    pub cycle_id: Uuid,
    pub slate: Slate,
    pub last_source: Option<SourceKind>,
    pub last_success_at: Option<DateTime<Utc>>,
    pub trace: Vec<TraceEntry>,
}

impl AcquisitionContext {
    pub fn new(slate: Slate) -> Self {
        Self {
            cycle_id: Uuid::new_v4(),
            slate,
            last_source: None,
            last_success_at: None,
            trace: Vec::new(),
        }
    }

    fn begin_cycle(&mut self) {
        self.cycle_id = Uuid::new_v4();
        self.trace.clear();
    }

    fn record(&mut self, source: &str, level: TraceLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            TraceLevel::Info => debug!("[{}] {}: {}", self.cycle_id, source, message),
            TraceLevel::Success => info!("[{}] {}: {}", self.cycle_id, source, message),
            TraceLevel::Warning => warn!("[{}] {}: {}", self.cycle_id, source, message),
        }
        self.trace.push(TraceEntry {
            source: source.to_string(),
            level,
            message,
            at: Utc::now(),
        });
    }
}

/// Everything needed to build the standard chain
#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    pub live: LiveSessionConfig,
    pub odds_api: OddsApiConfig,
    pub espn: EspnConfig,
    pub scrape: ScrapeConfig,
    /// Fixed seed for the terminal simulation
    pub simulation_seed: Option<u64>,
}

/// Drop unusable sets and repeated matchups (first wins); under a strict
/// slate also drop games not on the slate.
pub fn normalize(games: Vec<GameOddsSet>, slate: &Slate) -> Vec<GameOddsSet> {
    let mut seen: FxHashSet<(String, String)> = FxHashSet::default();
    games
        .into_iter()
        .filter(|set| set.is_usable() && set.game.is_valid())
        .filter(|set| !slate.strict || slate.contains(&set.game.away_team, &set.game.home_team))
        .filter(|set| seen.insert((set.game.away_team.clone(), set.game.home_team.clone())))
        .collect()
}

pub struct SourceOrchestrator {
    /// Ordered list of sources to try before the fallback
    sources: Vec<Arc<dyn OddsSource>>,
    fallback: SimulationSource,
}

impl SourceOrchestrator {
    pub fn new(sources: Vec<Arc<dyn OddsSource>>, fallback: SimulationSource) -> Self {
        Self { sources, fallback }
    }

    /// Standard chain: Live Session → The Odds API → ESPN → Scrape → Simulation
    pub fn standard(config: OrchestratorConfig, ratings: Arc<RatingTable>) -> Self {
        let simulator = Arc::new(MarketSimulator::new(ratings));

        let sources: Vec<Arc<dyn OddsSource>> = vec![
            Arc::new(LiveSessionSource::new(config.live)),
            Arc::new(OddsApiSource::new(config.odds_api)),
            Arc::new(EspnSource::new(config.espn, simulator.clone())),
            Arc::new(ScrapeSource::new(config.scrape, simulator.clone())),
        ];
        let fallback = SimulationSource::new(simulator).with_seed(config.simulation_seed);

        Self::new(sources, fallback)
    }

    /// Chain description for logs, e.g. "Live Session → ... → Market Simulation"
    pub fn describe(&self) -> String {
        self.sources
            .iter()
            .map(|s| s.source_name())
            .chain(std::iter::once(self.fallback.source_name()))
            .collect::<Vec<_>>()
            .join(" → ")
    }

    pub fn source_count(&self) -> usize {
        self.sources.len() + 1
    }

    async fn attempt(
        &self,
        source: &dyn OddsSource,
        slate: &Slate,
    ) -> Result<Vec<GameOddsSet>, SourceError> {
        let budget: Duration = source.timeout();
        match tokio::time::timeout(budget, source.fetch(slate)).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout(budget.as_secs())),
        }
    }

    /// Run one acquisition cycle against `ctx.slate`.
    ///
    /// Never fails: source errors are logged, traced and skipped.
    pub async fn acquire(&self, ctx: &mut AcquisitionContext) -> Vec<GameOddsSet> {
        ctx.begin_cycle();
        let slate = ctx.slate.clone();

        for source in &self.sources {
            let name = source.source_name();

            if !source.is_available() {
                ctx.record(name, TraceLevel::Info, "unavailable, skipping");
                continue;
            }

            ctx.record(name, TraceLevel::Info, "fetching odds");
            match self.attempt(source.as_ref(), &slate).await {
                Ok(games) => {
                    let fetched = games.len();
                    let games = normalize(games, &slate);
                    if games.is_empty() {
                        ctx.record(
                            name,
                            TraceLevel::Warning,
                            format!("{} games returned, none usable", fetched),
                        );
                        continue;
                    }

                    ctx.record(name, TraceLevel::Success, format!("{} games", games.len()));
                    ctx.last_source = Some(source.kind());
                    ctx.last_success_at = Some(Utc::now());
                    return games;
                }
                Err(SourceError::AuthFailure(msg)) => {
                    error!("{} rejected credentials: {}", name, msg);
                    ctx.record(name, TraceLevel::Warning, format!("authentication failed: {}", msg));
                }
                Err(e) if e.is_skip() => {
                    ctx.record(name, TraceLevel::Info, e.to_string());
                }
                Err(e) => {
                    ctx.record(name, TraceLevel::Warning, e.to_string());
                }
            }
        }

        let games = self.fallback.simulate(&slate);
        let name = self.fallback.source_name();
        if games.is_empty() {
            ctx.record(name, TraceLevel::Warning, "slate is empty, nothing to simulate");
        } else {
            ctx.record(name, TraceLevel::Success, format!("{} games", games.len()));
            ctx.last_source = Some(SourceKind::Simulation);
            ctx.last_success_at = Some(Utc::now());
        }
        games
    }
}

impl std::fmt::Debug for SourceOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceOrchestrator")
            .field("chain", &self.describe())
            .finish()
    }
}
