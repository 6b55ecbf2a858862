//! Fallback ordering of the source orchestrator, driven by stub sources.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use qwerk_core::models::{Game, GameOddsSet, SourceKind, SportsbookQuote};
use qwerk_core::orchestrator::{AcquisitionContext, SourceOrchestrator, TraceLevel};
use qwerk_core::ratings::RatingTable;
use qwerk_core::slate::Slate;
use qwerk_core::sources::{MarketSimulator, OddsSource, SimulationSource, SourceError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

enum Behavior {
    Fail(SourceError),
    Games(Vec<(&'static str, &'static str)>),
    Hang,
    Unavailable,
}

struct StubSource {
    name: &'static str,
    kind: SourceKind,
    behavior: Behavior,
    calls: AtomicUsize,
    log: Arc<Mutex<Vec<&'static str>>>,
}

impl StubSource {
    fn new(
        name: &'static str,
        kind: SourceKind,
        behavior: Behavior,
        log: &Arc<Mutex<Vec<&'static str>>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name,
            kind,
            behavior,
            calls: AtomicUsize::new(0),
            log: log.clone(),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn odds_set(away: &str, home: &str, kind: SourceKind) -> GameOddsSet {
    let now = Utc::now();
    GameOddsSet::new(Game::new(away, home, now), kind, now).with_quotes([SportsbookQuote {
        book_name: "StubBook".to_string(),
        spread: -2.5,
        total: 44.5,
        moneyline_home: -135,
        moneyline_away: 115,
        vig: -110,
        total_vig: -110,
        last_update: now,
    }])
}

#[async_trait]
impl OddsSource for StubSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn source_name(&self) -> &str {
        self.name
    }

    fn is_available(&self) -> bool {
        !matches!(self.behavior, Behavior::Unavailable)
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(2)
    }

    async fn fetch(&self, _slate: &Slate) -> Result<Vec<GameOddsSet>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().push(self.name);
        match &self.behavior {
            Behavior::Fail(e) => Err(e.clone()),
            Behavior::Games(pairs) => Ok(pairs
                .iter()
                .map(|(away, home)| odds_set(away, home, self.kind))
                .collect()),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(SourceError::EmptyResult)
            }
            Behavior::Unavailable => Err(SourceError::NotConfigured("stub".to_string())),
        }
    }
}

fn fallback() -> SimulationSource {
    SimulationSource::new(Arc::new(MarketSimulator::new(Arc::new(RatingTable::nfl()))))
        .with_seed(Some(11))
}

fn orchestrator(sources: Vec<Arc<StubSource>>) -> SourceOrchestrator {
    let sources: Vec<Arc<dyn OddsSource>> = sources
        .into_iter()
        .map(|s| s as Arc<dyn OddsSource>)
        .collect();
    SourceOrchestrator::new(sources, fallback())
}

#[tokio::test]
async fn test_first_success_wins_and_later_sources_untouched() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let live = StubSource::new(
        "live",
        SourceKind::LiveSession,
        Behavior::Fail(SourceError::Transient("render failed".to_string())),
        &log,
    );
    let api = StubSource::new(
        "api",
        SourceKind::OddsApi,
        Behavior::Games(vec![("Dallas Cowboys", "Philadelphia Eagles")]),
        &log,
    );
    let espn = StubSource::new(
        "espn",
        SourceKind::EspnApi,
        Behavior::Games(vec![("Kansas City Chiefs", "Los Angeles Chargers")]),
        &log,
    );

    let orch = orchestrator(vec![live.clone(), api.clone(), espn.clone()]);
    let mut ctx = AcquisitionContext::new(Slate::week_one());
    let games = orch.acquire(&mut ctx).await;

    // Results come from one source only
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].source, SourceKind::OddsApi);
    assert_eq!(ctx.last_source, Some(SourceKind::OddsApi));
    assert_eq!(*log.lock(), vec!["live", "api"]);
    assert_eq!(espn.calls(), 0);

    assert!(ctx
        .trace
        .iter()
        .any(|t| t.source == "live" && t.level == TraceLevel::Warning));
}

#[tokio::test]
async fn test_all_failures_fall_back_to_simulation() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sources = vec![
        StubSource::new("live", SourceKind::LiveSession, Behavior::Unavailable, &log),
        StubSource::new(
            "api",
            SourceKind::OddsApi,
            Behavior::Fail(SourceError::AuthFailure("bad key".to_string())),
            &log,
        ),
        StubSource::new(
            "espn",
            SourceKind::EspnApi,
            Behavior::Fail(SourceError::RateLimited {
                retry_after_secs: 30,
            }),
            &log,
        ),
        StubSource::new("scrape", SourceKind::Scrape, Behavior::Games(vec![]), &log),
    ];
    let orch = orchestrator(sources);

    let slate = Slate::week_one();
    let mut ctx = AcquisitionContext::new(slate.clone());
    let games = orch.acquire(&mut ctx).await;

    // Unavailable sources are never called
    assert_eq!(*log.lock(), vec!["api", "espn", "scrape"]);

    assert_eq!(games.len(), slate.len());
    assert!(games.iter().all(|g| g.source == SourceKind::Simulation));
    assert_eq!(ctx.last_source, Some(SourceKind::Simulation));

    let last = ctx.trace.last().unwrap();
    assert_eq!(last.source, "Market Simulation");
    assert_eq!(last.level, TraceLevel::Success);
}

#[tokio::test(start_paused = true)]
async fn test_hanging_source_times_out() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let hang = StubSource::new("hang", SourceKind::LiveSession, Behavior::Hang, &log);
    let api = StubSource::new(
        "api",
        SourceKind::OddsApi,
        Behavior::Games(vec![("Baltimore Ravens", "Buffalo Bills")]),
        &log,
    );

    let orch = orchestrator(vec![hang, api]);
    let mut ctx = AcquisitionContext::new(Slate::week_one());
    let games = orch.acquire(&mut ctx).await;

    assert_eq!(games.len(), 1);
    assert_eq!(games[0].game.home_team, "Buffalo Bills");
    assert!(ctx
        .trace
        .iter()
        .any(|t| t.source == "hang" && t.message.contains("imed out")));
}

#[tokio::test]
async fn test_strict_slate_rejects_off_slate_results() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let api = StubSource::new(
        "api",
        SourceKind::OddsApi,
        Behavior::Games(vec![("Philadelphia Eagles", "Dallas Cowboys")]),
        &log,
    );

    let orch = orchestrator(vec![api]);
    let mut ctx = AcquisitionContext::new(Slate::week_one().strict(true));
    let games = orch.acquire(&mut ctx).await;

    // Reversed pairing is not on the slate, so the cycle falls through
    assert_eq!(ctx.last_source, Some(SourceKind::Simulation));
    assert_eq!(games.len(), 16);
}

#[tokio::test]
async fn test_context_carries_across_cycles() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let api = StubSource::new(
        "api",
        SourceKind::OddsApi,
        Behavior::Games(vec![("Dallas Cowboys", "Philadelphia Eagles")]),
        &log,
    );
    let orch = orchestrator(vec![api.clone()]);
    let mut ctx = AcquisitionContext::new(Slate::week_one());

    orch.acquire(&mut ctx).await;
    let first_cycle = ctx.cycle_id;
    let first_success = ctx.last_success_at;
    orch.acquire(&mut ctx).await;

    assert_ne!(ctx.cycle_id, first_cycle);
    assert!(ctx.last_success_at >= first_success);
    assert_eq!(api.calls(), 2);
    // Trace holds only the latest cycle
    assert_eq!(ctx.trace.len(), 2);
}
