use super::http::{build_client, ensure_available, record_outcome, send_json};
use super::simulation::MarketSimulator;
use super::{
    OddsSource, SourceError, DEFAULT_MONEYLINE_AWAY, DEFAULT_MONEYLINE_HOME,
    DEFAULT_SOURCE_TIMEOUT, DEFAULT_SPREAD, DEFAULT_TOTAL, DEFAULT_VIG,
};
use crate::circuit_breaker::SourceCircuitBreaker;
use crate::models::{Game, GameOddsSet, SourceKind, SportsbookQuote};
use crate::slate::Slate;
use crate::teams;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_SCOREBOARD_URL: &str =
    "https://site.api.espn.com/apis/site/v2/sports/football/nfl/scoreboard";

#[derive(Debug, Clone)]
pub struct EspnConfig {
    pub scoreboard_url: String,
    pub timeout: Duration,
}

impl Default for EspnConfig {
    fn default() -> Self {
        Self {
            scoreboard_url: DEFAULT_SCOREBOARD_URL.to_string(),
            timeout: DEFAULT_SOURCE_TIMEOUT,
        }
    }
}

/// ESPN writes kickoffs as "2025-09-05T00:20Z"; accept RFC 3339 too
fn parse_espn_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%MZ")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn american(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_f64().map(|f| f.round() as i32),
        Value::String(s) => s.trim().trim_start_matches('+').parse::<i32>().ok(),
        _ => None,
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// One `odds[]` entry; spread is home-relative like ours
fn quote_from_odds(entry: &Value, now: DateTime<Utc>) -> Option<SportsbookQuote> {
    let book_name = entry["provider"]["name"].as_str()?.trim();
    if book_name.is_empty() {
        return None;
    }

    Some(SportsbookQuote {
        book_name: book_name.to_string(),
        spread: number(&entry["spread"]).unwrap_or(DEFAULT_SPREAD),
        total: number(&entry["overUnder"]).unwrap_or(DEFAULT_TOTAL),
        moneyline_home: american(&entry["homeTeamOdds"]["moneyLine"])
            .unwrap_or(DEFAULT_MONEYLINE_HOME),
        moneyline_away: american(&entry["awayTeamOdds"]["moneyLine"])
            .unwrap_or(DEFAULT_MONEYLINE_AWAY),
        vig: DEFAULT_VIG,
        total_vig: DEFAULT_VIG,
        last_update: now,
    })
}

/// Teams for an event, `None` when either side is missing
fn event_game(event: &Value, slate: &Slate, now: DateTime<Utc>) -> Option<Game> {
    let competitors = event["competitions"][0]["competitors"].as_array()?;

    let mut home = None;
    let mut away = None;
    for competitor in competitors {
        let team = &competitor["team"];
        let name = team["displayName"]
            .as_str()
            .or_else(|| team["name"].as_str())?;
        match competitor["homeAway"].as_str() {
            Some("home") => home = Some(teams::canonical_or_raw(name)),
            Some("away") => away = Some(teams::canonical_or_raw(name)),
            _ => {}
        }
    }

    let (away, home) = (away?, home?);
    let kickoff = event["date"]
        .as_str()
        .and_then(parse_espn_date)
        .or_else(|| slate.kickoff_for(&away, &home))
        .unwrap_or(now);
    Some(Game::new(away, home, kickoff))
}

pub struct EspnSource {
    client: Client,
    config: EspnConfig,
    simulator: Arc<MarketSimulator>,
    circuit_breaker: Arc<SourceCircuitBreaker>,
}

impl std::fmt::Debug for EspnSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EspnSource")
            .field("scoreboard_url", &self.config.scoreboard_url)
            .field("circuit_breaker_state", &self.circuit_breaker.state())
            .finish()
    }
}

impl EspnSource {
    pub fn new(config: EspnConfig, simulator: Arc<MarketSimulator>) -> Self {
        Self {
            client: build_client(config.timeout),
            config,
            simulator,
            circuit_breaker: Arc::new(SourceCircuitBreaker::with_defaults("espn")),
        }
    }

    pub fn circuit_breaker(&self) -> &SourceCircuitBreaker {
        &self.circuit_breaker
    }

    /// Map the scoreboard onto odds sets. Events that list no odds are
    /// filled from the rating-based simulator.
    fn parse_scoreboard(&self, data: &Value, slate: &Slate, now: DateTime<Utc>) -> Vec<GameOddsSet> {
        let Some(events) = data["events"].as_array() else {
            return Vec::new();
        };

        let mut rng = StdRng::from_entropy();
        let mut games = Vec::with_capacity(events.len());

        for event in events {
            let Some(game) = event_game(event, slate, now) else {
                warn!(
                    "Skipping ESPN event without both teams: {}",
                    event["id"].as_str().unwrap_or("?")
                );
                continue;
            };
            if !game.is_valid() {
                continue;
            }

            let quotes: Vec<SportsbookQuote> = event["competitions"][0]["odds"]
                .as_array()
                .map(|odds| odds.iter().filter_map(|o| quote_from_odds(o, now)).collect())
                .unwrap_or_default();

            if quotes.is_empty() {
                debug!("No ESPN odds for {}, simulating", game.key());
                games.push(self.simulator.simulate_game(&game, SourceKind::EspnApi, now, &mut rng));
            } else {
                games.push(GameOddsSet::new(game, SourceKind::EspnApi, now).with_quotes(quotes));
            }
        }

        games
    }

    async fn fetch_internal(&self, slate: &Slate) -> Result<Vec<GameOddsSet>, SourceError> {
        let request = self.client.get(&self.config.scoreboard_url);
        let data: Value = send_json(request).await?;

        let games = self.parse_scoreboard(&data, slate, Utc::now());
        if games.is_empty() {
            return Err(SourceError::EmptyResult);
        }
        info!("ESPN: {} games", games.len());
        Ok(games)
    }
}

#[async_trait]
impl OddsSource for EspnSource {
    fn kind(&self) -> SourceKind {
        SourceKind::EspnApi
    }

    fn source_name(&self) -> &str {
        "ESPN Scoreboard"
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_available()
    }

    fn timeout(&self) -> Duration {
        self.config.timeout
    }

    async fn fetch(&self, slate: &Slate) -> Result<Vec<GameOddsSet>, SourceError> {
        ensure_available(&self.circuit_breaker)?;

        let result = self.fetch_internal(slate).await;
        record_outcome(&self.circuit_breaker, &result);
        result
    }
}
