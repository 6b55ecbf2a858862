//! Live session adapter.
//!
//! Dynamic odds boards only render in a browser, so this source asks a
//! headless render service for the page and parses the rendered markup:
//!
//! - each `game-line` element is one game
//! - its first two `team-name` cells are away then home
//! - up to five `odds-cell` texts, one per book in roster order
//!
//! Odds cell text is tokenized loosely, e.g. `+3.5 (-110) O 47.5 (-108) +140 -165`:
//! the first small signed number is the away spread, an `O`/`U` number is
//! the total, parenthesised prices are spread then total vig, and bare
//! prices are away then home moneylines.

use super::http::{build_client, ensure_available, record_outcome, send_text};
use super::{
    OddsSource, SourceError, DEFAULT_MONEYLINE_AWAY, DEFAULT_MONEYLINE_HOME,
    DEFAULT_SOURCE_TIMEOUT, DEFAULT_SPREAD, DEFAULT_TOTAL, DEFAULT_VIG,
};
use crate::circuit_breaker::SourceCircuitBreaker;
use crate::models::{Game, GameOddsSet, SourceKind, SportsbookQuote};
use crate::slate::Slate;
use crate::synth::SPORTSBOOKS;
use crate::teams;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::Client;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_TARGET_URL: &str = "https://www.sportsbookreview.com/betting-odds/nfl-football/";
const MAX_GAMES: usize = 16;
const MAX_ODDS_CELLS: usize = 5;
const WAIT_SELECTOR: &str = ".game-line";

#[derive(Debug, Clone)]
pub struct LiveSessionConfig {
    /// Headless render service; absent means `NotConfigured`
    pub render_endpoint: Option<String>,
    pub target_url: String,
    pub timeout: Duration,
}

impl Default for LiveSessionConfig {
    fn default() -> Self {
        Self {
            render_endpoint: None,
            target_url: DEFAULT_TARGET_URL.to_string(),
            timeout: DEFAULT_SOURCE_TIMEOUT,
        }
    }
}

struct Patterns {
    game_line: Regex,
    team_name: Regex,
    odds_cell: Regex,
    tags: Regex,
    paren_price: Regex,
    total: Regex,
    spread: Regex,
    price: Regex,
}

fn patterns() -> Option<&'static Patterns> {
    static PATTERNS: OnceLock<Option<Patterns>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            Some(Patterns {
                game_line: Regex::new(r#"class="[^"]*\bgame-line\b[^"]*""#).ok()?,
                team_name: Regex::new(r#"(?s)class="[^"]*\bteam-name\b[^"]*"[^>]*>(.*?)</"#).ok()?,
                odds_cell: Regex::new(
                    r#"(?s)class="[^"]*\bodds-cell\b[^"]*"[^>]*>(.*?)</(?:td|div)>"#,
                )
                .ok()?,
                tags: Regex::new(r"<[^>]*>").ok()?,
                paren_price: Regex::new(r"\(\s*([+-]?\d{3,4})\s*\)").ok()?,
                total: Regex::new(r"(?i)\b[ou]\s*(\d{2}(?:\.\d)?)").ok()?,
                spread: Regex::new(r"(?i)(?:^|\s)(pk|[+-]\d{1,2}(?:\.\d)?)(?:\s|$)").ok()?,
                price: Regex::new(r"(?:^|\s)([+-]\d{3,4})(?:\s|$)").ok()?,
            })
        })
        .as_ref()
}

fn inner_text(p: &Patterns, html: &str) -> String {
    let text = p.tags.replace_all(html, " ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parsed contents of one odds cell
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CellOdds {
    /// Home-relative
    pub spread: Option<f64>,
    pub total: Option<f64>,
    pub vig: Option<i32>,
    pub total_vig: Option<i32>,
    pub moneyline_away: Option<i32>,
    pub moneyline_home: Option<i32>,
}

impl CellOdds {
    fn is_empty(&self) -> bool {
        *self == CellOdds::default()
    }

    fn into_quote(self, book_name: &str, now: DateTime<Utc>) -> SportsbookQuote {
        SportsbookQuote {
            book_name: book_name.to_string(),
            spread: self.spread.unwrap_or(DEFAULT_SPREAD),
            total: self.total.unwrap_or(DEFAULT_TOTAL),
            moneyline_home: self.moneyline_home.unwrap_or(DEFAULT_MONEYLINE_HOME),
            moneyline_away: self.moneyline_away.unwrap_or(DEFAULT_MONEYLINE_AWAY),
            vig: self.vig.unwrap_or(DEFAULT_VIG),
            total_vig: self.total_vig.unwrap_or(DEFAULT_VIG),
            last_update: now,
        }
    }
}

/// Tokenize one odds cell; `None` for blank or "-" cells.
pub fn parse_odds_cell(text: &str) -> Option<CellOdds> {
    let p = patterns()?;
    let text = text.trim();
    if text.is_empty() || text == "-" {
        return None;
    }

    let mut odds = CellOdds::default();

    let mut vigs = p
        .paren_price
        .captures_iter(text)
        .filter_map(|c| c[1].parse::<i32>().ok());
    odds.vig = vigs.next();
    odds.total_vig = vigs.next();
    let rest = p.paren_price.replace_all(text, " ");

    if let Some(c) = p.total.captures(&rest) {
        odds.total = c[1].parse::<f64>().ok();
    }
    let rest = p.total.replace_all(&rest, " ");
    // Pad so neighbouring tokens each see their own boundary
    let rest = format!(" {} ", rest.split_whitespace().collect::<Vec<_>>().join("  "));

    if let Some(c) = p.spread.captures(&rest) {
        let token = &c[1];
        odds.spread = if token.eq_ignore_ascii_case("pk") {
            Some(0.0)
        } else {
            // Listed line belongs to the away team
            token.parse::<f64>().ok().map(|away| -away + 0.0)
        };
    }

    let mut prices = p
        .price
        .captures_iter(&rest)
        .filter_map(|c| c[1].parse::<i32>().ok());
    odds.moneyline_away = prices.next();
    odds.moneyline_home = prices.next();

    (!odds.is_empty()).then_some(odds)
}

/// Rendered board -> odds sets
pub fn parse_board(html: &str, slate: &Slate, now: DateTime<Utc>) -> Vec<GameOddsSet> {
    let Some(p) = patterns() else {
        return Vec::new();
    };

    let starts: Vec<usize> = p.game_line.find_iter(html).map(|m| m.start()).collect();
    let mut games = Vec::new();

    for (i, &start) in starts.iter().enumerate() {
        if games.len() >= MAX_GAMES {
            break;
        }
        let end = starts.get(i + 1).copied().unwrap_or(html.len());
        let block = &html[start..end];

        let names: Vec<String> = p
            .team_name
            .captures_iter(block)
            .map(|c| inner_text(p, &c[1]))
            .filter(|name| !name.is_empty())
            .take(2)
            .collect();
        let [away, home] = names.as_slice() else {
            debug!("Skipping game-line without two team names");
            continue;
        };

        let away = teams::canonical_or_raw(away);
        let home = teams::canonical_or_raw(home);
        let kickoff = slate.kickoff_for(&away, &home).unwrap_or(now);
        let game = Game::new(away, home, kickoff);
        if !game.is_valid() {
            continue;
        }

        let quotes: Vec<SportsbookQuote> = p
            .odds_cell
            .captures_iter(block)
            .take(MAX_ODDS_CELLS)
            .enumerate()
            .filter_map(|(pos, c)| {
                let odds = parse_odds_cell(&inner_text(p, &c[1]))?;
                Some(odds.into_quote(SPORTSBOOKS[pos % SPORTSBOOKS.len()], now))
            })
            .collect();

        if quotes.is_empty() {
            debug!("No readable odds for {}", game.key());
            continue;
        }
        games.push(GameOddsSet::new(game, SourceKind::LiveSession, now).with_quotes(quotes));
    }

    games
}

pub struct LiveSessionSource {
    client: Client,
    config: LiveSessionConfig,
    circuit_breaker: Arc<SourceCircuitBreaker>,
}

impl std::fmt::Debug for LiveSessionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveSessionSource")
            .field("render_endpoint", &self.config.render_endpoint)
            .field("target_url", &self.config.target_url)
            .field("circuit_breaker_state", &self.circuit_breaker.state())
            .finish()
    }
}

impl LiveSessionSource {
    pub fn new(config: LiveSessionConfig) -> Self {
        Self {
            client: build_client(config.timeout),
            config,
            circuit_breaker: Arc::new(SourceCircuitBreaker::with_defaults("live_session")),
        }
    }

    async fn fetch_internal(&self, endpoint: &str, slate: &Slate) -> Result<Vec<GameOddsSet>, SourceError> {
        let wait_ms = self.config.timeout.as_millis().min(u128::from(u32::MAX)) as u64;
        let request = self.client.post(endpoint).json(&serde_json::json!({
            "url": self.config.target_url,
            "waitForSelector": { "selector": WAIT_SELECTOR, "timeout": wait_ms },
        }));

        let html = send_text(request).await?;
        let games = parse_board(&html, slate, Utc::now());
        if games.is_empty() {
            return Err(SourceError::EmptyResult);
        }
        info!("Live session: {} games from {}", games.len(), self.config.target_url);
        Ok(games)
    }
}

#[async_trait]
impl OddsSource for LiveSessionSource {
    fn kind(&self) -> SourceKind {
        SourceKind::LiveSession
    }

    fn source_name(&self) -> &str {
        "Live Session"
    }

    fn is_available(&self) -> bool {
        self.config.render_endpoint.is_some() && self.circuit_breaker.is_available()
    }

    fn timeout(&self) -> Duration {
        self.config.timeout
    }

    async fn fetch(&self, slate: &Slate) -> Result<Vec<GameOddsSet>, SourceError> {
        let Some(endpoint) = self.config.render_endpoint.as_deref() else {
            return Err(SourceError::NotConfigured("LIVE_RENDER_ENDPOINT".to_string()));
        };
        ensure_available(&self.circuit_breaker)?;

        let result = self.fetch_internal(endpoint, slate).await;
        record_outcome(&self.circuit_breaker, &result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BOARD: &str = r#"
        <div class="board">
          <div class="game-line row">
            <span class="team-name">Dallas Cowboys</span>
            <span class="team-name">Philadelphia Eagles</span>
            <div class="odds-cell">+7.5 (-110) O 47.5 (-108) +260 -330</div>
            <div class="odds-cell"><span>+7</span> <span>(-112)</span></div>
            <div class="odds-cell">-</div>
          </div>
          <div class="game-line">
            <span class="team-name">Chiefs</span>
          </div>
          <div class="game-line">
            <span class="team-name">Ravens</span>
            <span class="team-name">Bills</span>
            <div class="odds-cell">PK u51 -105 -115</div>
          </div>
        </div>"#;

    #[test]
    fn test_parse_full_cell() {
        let odds = parse_odds_cell("+7.5 (-110) O 47.5 (-108) +260 -330").unwrap();
        assert_eq!(odds.spread, Some(-7.5));
        assert_eq!(odds.total, Some(47.5));
        assert_eq!(odds.vig, Some(-110));
        assert_eq!(odds.total_vig, Some(-108));
        assert_eq!(odds.moneyline_away, Some(260));
        assert_eq!(odds.moneyline_home, Some(-330));
    }

    #[test]
    fn test_parse_partial_cells() {
        let odds = parse_odds_cell("-3").unwrap();
        assert_eq!(odds.spread, Some(3.0));
        assert_eq!(odds.total, None);

        let odds = parse_odds_cell("pk u44.5").unwrap();
        assert_eq!(odds.spread, Some(0.0));
        assert_eq!(odds.total, Some(44.5));

        assert_eq!(parse_odds_cell("-"), None);
        assert_eq!(parse_odds_cell("   "), None);
        assert_eq!(parse_odds_cell("n/a"), None);
    }

    #[test]
    fn test_parse_board() {
        let games = parse_board(BOARD, &Slate::week_one(), Utc::now());
        assert_eq!(games.len(), 2);

        let first = &games[0];
        assert_eq!(first.game.key(), "Dallas Cowboys @ Philadelphia Eagles");
        assert_eq!(first.sportsbooks.len(), 2);
        let dk = first.quote("DraftKings").unwrap();
        assert_eq!(dk.spread, -7.5);
        assert_eq!(dk.moneyline_home, -330);
        let fd = first.quote("FanDuel").unwrap();
        assert_eq!(fd.spread, -7.0);
        assert_eq!(fd.vig, -112);
        assert_eq!(fd.total, 45.0);

        let second = &games[1];
        assert_eq!(second.game.key(), "Baltimore Ravens @ Buffalo Bills");
        let dk = second.quote("DraftKings").unwrap();
        assert_eq!(dk.spread, 0.0);
        assert_eq!(dk.total, 51.0);
        assert_eq!(dk.moneyline_away, -105);
        assert_eq!(dk.moneyline_home, -115);
    }

    #[test]
    fn test_board_capped() {
        let line = r#"<div class="game-line"><span class="team-name">Jets</span><span class="team-name">Bills</span><div class="odds-cell">-3</div></div>"#;
        let html = line.repeat(20);
        assert_eq!(parse_board(&html, &Slate::week_one(), Utc::now()).len(), 16);
    }

    #[tokio::test]
    async fn test_fetch_through_render_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/content"))
            .and(body_partial_json(serde_json::json!({"url": DEFAULT_TARGET_URL})))
            .respond_with(ResponseTemplate::new(200).set_body_string(BOARD))
            .mount(&server)
            .await;

        let source = LiveSessionSource::new(LiveSessionConfig {
            render_endpoint: Some(format!("{}/content", server.uri())),
            ..LiveSessionConfig::default()
        });
        let games = source.fetch(&Slate::week_one()).await.unwrap();
        assert_eq!(games.len(), 2);
        assert!(games.iter().all(|g| g.source == SourceKind::LiveSession));
    }

    #[tokio::test]
    async fn test_not_configured() {
        let source = LiveSessionSource::new(LiveSessionConfig::default());
        assert!(!source.is_available());
        assert!(matches!(
            source.fetch(&Slate::week_one()).await,
            Err(SourceError::NotConfigured(_))
        ));
    }
}
