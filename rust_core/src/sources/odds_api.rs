//! The Odds API (v4) adapter.
//!
//! `GET {base}/v4/sports/{sport}/odds?apiKey=..&regions=..&markets=h2h,spreads,totals&oddsFormat=..`
//!
//! Events are parsed one at a time: a malformed event or one without a
//! `bookmakers` field is skipped, an empty bookmaker list yields the
//! placeholder quote.

use super::http::{build_client, ensure_available, record_outcome, send_json};
use super::{
    placeholder_quote, OddsSource, SourceError, DEFAULT_MONEYLINE_AWAY, DEFAULT_MONEYLINE_HOME,
    DEFAULT_SOURCE_TIMEOUT, DEFAULT_SPREAD, DEFAULT_TOTAL, DEFAULT_VIG,
};
use crate::circuit_breaker::SourceCircuitBreaker;
use crate::models::{Game, GameOddsSet, SourceKind, SportsbookQuote};
use crate::slate::Slate;
use crate::teams;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.the-odds-api.com";
pub const DEFAULT_SPORT_KEY: &str = "americanfootball_nfl";
const MARKETS: &str = "h2h,spreads,totals";

#[derive(Debug, Clone)]
pub struct OddsApiConfig {
    /// Absent key means the source reports `NotConfigured`
    pub api_key: Option<String>,
    pub base_url: String,
    pub sport_key: String,
    pub regions: String,
    pub odds_format: String,
    pub timeout: Duration,
}

impl Default for OddsApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            sport_key: DEFAULT_SPORT_KEY.to_string(),
            regions: "us".to_string(),
            odds_format: "american".to_string(),
            timeout: DEFAULT_SOURCE_TIMEOUT,
        }
    }
}

// Vendor schema

#[derive(Debug, Deserialize)]
struct ApiEvent {
    home_team: String,
    away_team: String,
    #[serde(default)]
    commence_time: Option<String>,
    /// `None` when the field is missing entirely
    #[serde(default)]
    bookmakers: Option<Vec<ApiBookmaker>>,
}

#[derive(Debug, Deserialize)]
struct ApiBookmaker {
    #[serde(default)]
    key: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    last_update: Option<String>,
    #[serde(default)]
    markets: Vec<ApiMarket>,
}

#[derive(Debug, Deserialize)]
struct ApiMarket {
    key: String,
    #[serde(default)]
    outcomes: Vec<ApiOutcome>,
}

#[derive(Debug, Deserialize)]
struct ApiOutcome {
    name: String,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    point: Option<f64>,
}

impl ApiBookmaker {
    fn market(&self, key: &str) -> Option<&ApiMarket> {
        self.markets.iter().find(|m| m.key == key)
    }

    fn outcome(&self, market: &str, name: &str) -> Option<&ApiOutcome> {
        self.market(market)?
            .outcomes
            .iter()
            .find(|o| o.name.eq_ignore_ascii_case(name))
    }
}

fn price(outcome: Option<&ApiOutcome>, default: i32) -> i32 {
    outcome
        .and_then(|o| o.price)
        .filter(|p| p.is_finite())
        .map(|p| p.round() as i32)
        .unwrap_or(default)
}

fn parse_time(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Quote for one bookmaker; missing markets fall back to defaults
fn quote_from_bookmaker(
    book: &ApiBookmaker,
    home_team: &str,
    away_team: &str,
    now: DateTime<Utc>,
) -> SportsbookQuote {
    let home_spread = book.outcome("spreads", home_team);
    let over = book.outcome("totals", "Over");

    SportsbookQuote {
        book_name: if book.title.is_empty() {
            book.key.clone()
        } else {
            book.title.clone()
        },
        spread: home_spread.and_then(|o| o.point).unwrap_or(DEFAULT_SPREAD),
        total: over.and_then(|o| o.point).unwrap_or(DEFAULT_TOTAL),
        moneyline_home: price(book.outcome("h2h", home_team), DEFAULT_MONEYLINE_HOME),
        moneyline_away: price(book.outcome("h2h", away_team), DEFAULT_MONEYLINE_AWAY),
        vig: price(home_spread, DEFAULT_VIG),
        total_vig: price(over, DEFAULT_VIG),
        last_update: parse_time(book.last_update.as_deref()).unwrap_or(now),
    }
}

/// Map a decoded payload onto odds sets, skipping unusable events
fn parse_events(
    events: Vec<serde_json::Value>,
    slate: &Slate,
    now: DateTime<Utc>,
) -> Vec<GameOddsSet> {
    let mut games = Vec::with_capacity(events.len());

    for (i, raw) in events.into_iter().enumerate() {
        let event: ApiEvent = match serde_json::from_value(raw) {
            Ok(event) => event,
            Err(e) => {
                warn!("Skipping malformed odds event #{}: {}", i, e);
                continue;
            }
        };

        let Some(bookmakers) = event.bookmakers.as_ref() else {
            warn!(
                "Skipping {} @ {}: no bookmakers field",
                event.away_team, event.home_team
            );
            continue;
        };

        let away = teams::canonical_or_raw(&event.away_team);
        let home = teams::canonical_or_raw(&event.home_team);
        let kickoff = parse_time(event.commence_time.as_deref())
            .or_else(|| slate.kickoff_for(&away, &home))
            .unwrap_or(now);
        let game = Game::new(away, home, kickoff);

        if !game.is_valid() {
            warn!("Skipping invalid odds event: {}", game.key());
            continue;
        }

        let mut set = GameOddsSet::new(game, SourceKind::OddsApi, now);
        if bookmakers.is_empty() {
            set.insert_quote(placeholder_quote(now));
        } else {
            for book in bookmakers {
                set.insert_quote(quote_from_bookmaker(
                    book,
                    &event.home_team,
                    &event.away_team,
                    now,
                ));
            }
        }
        games.push(set);
    }

    games
}

pub struct OddsApiSource {
    client: Client,
    config: OddsApiConfig,
    circuit_breaker: Arc<SourceCircuitBreaker>,
}

impl std::fmt::Debug for OddsApiSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OddsApiSource")
            .field("base_url", &self.config.base_url)
            .field("configured", &self.config.api_key.is_some())
            .field("circuit_breaker_state", &self.circuit_breaker.state())
            .finish()
    }
}

impl OddsApiSource {
    pub fn new(config: OddsApiConfig) -> Self {
        Self {
            client: build_client(config.timeout),
            circuit_breaker: Arc::new(SourceCircuitBreaker::with_defaults("odds_api")),
            config,
        }
    }

    pub fn with_breaker(mut self, breaker: Arc<SourceCircuitBreaker>) -> Self {
        self.circuit_breaker = breaker;
        self
    }

    pub fn circuit_breaker(&self) -> &SourceCircuitBreaker {
        &self.circuit_breaker
    }

    fn url(&self) -> String {
        format!(
            "{}/v4/sports/{}/odds",
            self.config.base_url.trim_end_matches('/'),
            self.config.sport_key
        )
    }

    async fn fetch_internal(&self, api_key: &str, slate: &Slate) -> Result<Vec<GameOddsSet>, SourceError> {
        let request = self.client.get(self.url()).query(&[
            ("apiKey", api_key),
            ("regions", self.config.regions.as_str()),
            ("markets", MARKETS),
            ("oddsFormat", self.config.odds_format.as_str()),
        ]);

        let events: Vec<serde_json::Value> = send_json(request).await?;
        debug!("Odds API returned {} events", events.len());

        let games = parse_events(events, slate, Utc::now());
        if games.is_empty() {
            return Err(SourceError::EmptyResult);
        }
        info!("Odds API: {} games", games.len());
        Ok(games)
    }
}

#[async_trait]
impl OddsSource for OddsApiSource {
    fn kind(&self) -> SourceKind {
        SourceKind::OddsApi
    }

    fn source_name(&self) -> &str {
        "The Odds API"
    }

    fn is_available(&self) -> bool {
        self.config.api_key.is_some() && self.circuit_breaker.is_available()
    }

    fn timeout(&self) -> Duration {
        self.config.timeout
    }

    async fn fetch(&self, slate: &Slate) -> Result<Vec<GameOddsSet>, SourceError> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Err(SourceError::NotConfigured("ODDS_API_KEY".to_string()));
        };
        ensure_available(&self.circuit_breaker)?;

        let result = self.fetch_internal(api_key, slate).await;
        record_outcome(&self.circuit_breaker, &result);
        result
    }
}
