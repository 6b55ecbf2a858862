//! Odds sources.
//!
//! Every adapter implements [`OddsSource`]. The orchestrator tries them in
//! priority order: live session, vendor odds API, ESPN, scrape, and finally
//! the simulation, which never fails.

pub mod error;
pub mod espn;
pub mod http;
pub mod live;
pub mod odds_api;
pub mod scrape;
pub mod simulation;

use crate::models::{GameOddsSet, SourceKind, SportsbookQuote};
use crate::slate::Slate;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

pub use error::SourceError;
pub use espn::{EspnConfig, EspnSource};
pub use live::{LiveSessionConfig, LiveSessionSource};
pub use odds_api::{OddsApiConfig, OddsApiSource};
pub use scrape::{ScrapeConfig, ScrapeSource};
pub use simulation::{MarketSimulator, SimulationSource};

/// Book name for the placeholder quote of a game listed without bookmakers
pub const MARKET_DEFAULT_BOOK: &str = "Market Default";
pub const DEFAULT_SPREAD: f64 = 0.0;
pub const DEFAULT_TOTAL: f64 = 45.0;
pub const DEFAULT_MONEYLINE_HOME: i32 = -100;
pub const DEFAULT_MONEYLINE_AWAY: i32 = 100;
pub const DEFAULT_VIG: i32 = -110;

pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_SCRAPE_TIMEOUT: Duration = Duration::from_secs(15);

/// Quote used when a vendor lists a game with an empty bookmaker list
pub fn placeholder_quote(now: DateTime<Utc>) -> SportsbookQuote {
    SportsbookQuote {
        book_name: MARKET_DEFAULT_BOOK.to_string(),
        spread: DEFAULT_SPREAD,
        total: DEFAULT_TOTAL,
        moneyline_home: DEFAULT_MONEYLINE_HOME,
        moneyline_away: DEFAULT_MONEYLINE_AWAY,
        vig: DEFAULT_VIG,
        total_vig: DEFAULT_VIG,
        last_update: now,
    }
}

/// A provider of odds for a slate.
///
/// `fetch` reports failure through [`SourceError`]; it must never panic,
/// and it must not return an empty `Ok` (use `SourceError::EmptyResult`).
#[async_trait]
pub trait OddsSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Name for logs and trace lines
    fn source_name(&self) -> &str;

    /// False when the source would be skipped without I/O
    /// (missing config, open or disabled breaker)
    fn is_available(&self) -> bool {
        true
    }

    /// Budget the orchestrator gives one `fetch`
    fn timeout(&self) -> Duration {
        DEFAULT_SOURCE_TIMEOUT
    }

    async fn fetch(&self, slate: &Slate) -> Result<Vec<GameOddsSet>, SourceError>;
}
