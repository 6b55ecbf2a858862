//! Best-effort HTML scrape.
//!
//! The page carries no usable odds: we only pull team nicknames out of the
//! text (in order of first appearance), pair them up as away/home and
//! attach simulated quotes.

use super::http::{build_client, ensure_available, record_outcome, send_text};
use super::simulation::MarketSimulator;
use super::{OddsSource, SourceError, DEFAULT_SCRAPE_TIMEOUT};
use crate::circuit_breaker::SourceCircuitBreaker;
use crate::models::{Game, GameOddsSet, SourceKind};
use crate::slate::Slate;
use crate::teams;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use regex::Regex;
use reqwest::Client;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_SCRAPE_URL: &str = "https://www.espn.com/nfl/scoreboard";
/// A full slate never has more than this many games
const MAX_SCRAPED_GAMES: usize = 16;

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub url: String,
    pub timeout: Duration,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SCRAPE_URL.to_string(),
            timeout: DEFAULT_SCRAPE_TIMEOUT,
        }
    }
}

fn markup_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<script.*?</script>|<style.*?</style>|<[^>]*>").ok())
        .as_ref()
}

fn nickname_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        let names: Vec<String> = teams::nicknames().map(regex::escape).collect();
        Regex::new(&format!(r"(?i)\b({})\b", names.join("|"))).ok()
    })
    .as_ref()
}

/// Markup -> visible text
pub fn strip_markup(html: &str) -> String {
    match markup_regex() {
        Some(re) => re.replace_all(html, " ").into_owned(),
        None => html.to_string(),
    }
}

/// Canonical team names in order of first appearance, each at most once
pub fn find_teams(text: &str) -> Vec<&'static str> {
    let Some(re) = nickname_regex() else {
        return Vec::new();
    };

    let mut found: Vec<&'static str> = Vec::new();
    for m in re.find_iter(text) {
        if let Some(name) = teams::resolve(m.as_str()) {
            if !found.contains(&name) {
                found.push(name);
            }
        }
    }
    found
}

/// Consecutive tokens become (away, home); a trailing odd token is dropped
pub fn pair_matchups(
    found: &[&str],
    slate: &Slate,
    now: DateTime<Utc>,
) -> Vec<Game> {
    found
        .chunks_exact(2)
        .take(MAX_SCRAPED_GAMES)
        .map(|pair| {
            let kickoff = slate.kickoff_for(pair[0], pair[1]).unwrap_or(now);
            Game::new(pair[0], pair[1], kickoff)
        })
        .collect()
}

pub struct ScrapeSource {
    client: Client,
    config: ScrapeConfig,
    simulator: Arc<MarketSimulator>,
    circuit_breaker: Arc<SourceCircuitBreaker>,
}

impl std::fmt::Debug for ScrapeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrapeSource")
            .field("url", &self.config.url)
            .field("circuit_breaker_state", &self.circuit_breaker.state())
            .finish()
    }
}

impl ScrapeSource {
    pub fn new(config: ScrapeConfig, simulator: Arc<MarketSimulator>) -> Self {
        Self {
            client: build_client(config.timeout),
            config,
            simulator,
            circuit_breaker: Arc::new(SourceCircuitBreaker::with_defaults("scrape")),
        }
    }

    fn games_from_markup(&self, html: &str, slate: &Slate, now: DateTime<Utc>) -> Vec<GameOddsSet> {
        let text = strip_markup(html);
        let found = find_teams(&text);
        debug!("Scrape found {} team tokens", found.len());

        let mut rng = StdRng::from_entropy();
        pair_matchups(&found, slate, now)
            .iter()
            .map(|game| self.simulator.simulate_game(game, SourceKind::Scrape, now, &mut rng))
            .collect()
    }

    async fn fetch_internal(&self, slate: &Slate) -> Result<Vec<GameOddsSet>, SourceError> {
        let html = send_text(self.client.get(&self.config.url)).await?;

        let games = self.games_from_markup(&html, slate, Utc::now());
        if games.is_empty() {
            return Err(SourceError::EmptyResult);
        }
        info!("Scrape: {} matchups from {}", games.len(), self.config.url);
        Ok(games)
    }
}

#[async_trait]
impl OddsSource for ScrapeSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Scrape
    }

    fn source_name(&self) -> &str {
        "Web Scrape"
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratings::RatingTable;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<html><head><script>var t = "Bears";</script></head>
        <body><div class="game">COWBOYS at <b>Eagles</b></div>
        <div class="game">chiefs vs Chargers</div>
        <div>Eagles again</div><span>Steelers</span></body></html>"#;

    fn source(url: String) -> ScrapeSource {
        ScrapeSource::new(
            ScrapeConfig {
                url,
                ..ScrapeConfig::default()
            },
            Arc::new(MarketSimulator::new(Arc::new(RatingTable::nfl()))),
        )
    }

    #[test]
    fn test_find_teams_in_order() {
        let text = strip_markup(PAGE);
        let found = find_teams(&text);
        // Script contents are ignored, repeats count once
        assert_eq!(
            found,
            vec![
                "Dallas Cowboys",
                "Philadelphia Eagles",
                "Kansas City Chiefs",
                "Los Angeles Chargers",
                "Pittsburgh Steelers",
            ]
        );
    }

    #[test]
    fn test_word_boundaries() {
        assert!(find_teams("the jetsons and the ramsgate pub").is_empty());
        assert_eq!(find_teams("49ers-Seahawks"), vec!["San Francisco 49ers", "Seattle Seahawks"]);
    }

    #[test]
    fn test_pairing_drops_odd_token() {
        let found = ["Dallas Cowboys", "Philadelphia Eagles", "Pittsburgh Steelers"];
        let games = pair_matchups(&found, &Slate::week_one(), Utc::now());
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].key(), "Dallas Cowboys @ Philadelphia Eagles");
        assert_eq!(
            Some(games[0].kickoff),
            Slate::week_one().kickoff_for("Dallas Cowboys", "Philadelphia Eagles")
        );
    }

    #[tokio::test]
    async fn test_scrape_attaches_simulated_quotes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;

        let games = source(server.uri()).fetch(&Slate::week_one()).await.unwrap();
        assert_eq!(games.len(), 2);
        for set in &games {
            assert_eq!(set.source, SourceKind::Scrape);
            assert_eq!(set.sportsbooks.len(), 5);
        }
    }

    #[tokio::test]
    async fn test_page_without_teams_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>No games today</p>"))
            .mount(&server)
            .await;

        let err = source(server.uri()).fetch(&Slate::week_one()).await.unwrap_err();
        assert_eq!(err, SourceError::EmptyResult);
    }
}
