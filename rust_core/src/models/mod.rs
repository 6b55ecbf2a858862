// Shared models for the QWERK odds pipeline
use crate::teams;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Team Ratings
// ============================================================================

/// Static strength profile for a single team.
///
/// Ratings sit roughly on a 0-100 scale; `recent_form` is a 0-1 fraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamRating {
    pub power_rating: f64,
    #[serde(alias = "off_rating")]
    pub offense_rating: f64,
    #[serde(alias = "def_rating")]
    pub defense_rating: f64,
    pub recent_form: f64,
}

impl TeamRating {
    /// Rating handed to any team the table does not know.
    pub const DEFAULT: TeamRating = TeamRating::new(80.0, 80.0, 80.0, 0.70);

    pub const fn new(power: f64, offense: f64, defense: f64, recent_form: f64) -> Self {
        Self {
            power_rating: power,
            offense_rating: offense,
            defense_rating: defense,
            recent_form,
        }
    }
}

impl Default for TeamRating {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ============================================================================
// Games
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    Away,
    Home,
}

impl TeamSide {
    pub fn opposite(&self) -> Self {
        match self {
            TeamSide::Away => TeamSide::Home,
            TeamSide::Home => TeamSide::Away,
        }
    }
}

/// A single contest. Identity is the `(away_team, home_team)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub away_team: String,
    pub home_team: String,
    /// Scheduled kickoff; synthetic for scraped and simulated games
    pub kickoff: DateTime<Utc>,
}

impl Game {
    pub fn new(
        away_team: impl Into<String>,
        home_team: impl Into<String>,
        kickoff: DateTime<Utc>,
    ) -> Self {
        Self {
            away_team: away_team.into(),
            home_team: home_team.into(),
            kickoff,
        }
    }

    /// Display key, e.g. "Dallas Cowboys @ Philadelphia Eagles"
    pub fn key(&self) -> String {
        format!("{} @ {}", self.away_team, self.home_team)
    }

    /// Abbreviated key ("DAL @ PHI"); unknown teams show as "UNK"
    pub fn short_label(&self) -> String {
        format!("{} @ {}", teams::abbr(&self.away_team), teams::abbr(&self.home_team))
    }

    pub fn pair(&self) -> (&str, &str) {
        (&self.away_team, &self.home_team)
    }

    pub fn same_matchup(&self, other: &Game) -> bool {
        self.pair() == other.pair()
    }

    /// Both teams named and distinct
    pub fn is_valid(&self) -> bool {
        let away = self.away_team.trim();
        let home = self.home_team.trim();
        !away.is_empty() && !home.is_empty() && !away.eq_ignore_ascii_case(home)
    }

    pub fn team(&self, side: TeamSide) -> &str {
        match side {
            TeamSide::Away => &self.away_team,
            TeamSide::Home => &self.home_team,
        }
    }
}

// ============================================================================
// Quotes
// ============================================================================

/// One sportsbook's lines for a game.
///
/// `spread` is home-relative: negative means the home team is favored.
/// Moneylines and vig use American odds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SportsbookQuote {
    pub book_name: String,
    pub spread: f64,
    pub total: f64,
    pub moneyline_home: i32,
    pub moneyline_away: i32,
    /// Price on the spread
    pub vig: i32,
    /// Price on the total
    pub total_vig: i32,
    pub last_update: DateTime<Utc>,
}

impl SportsbookQuote {
    /// Spread from the away team's perspective
    pub fn away_spread(&self) -> f64 {
        -self.spread + 0.0
    }

    /// Side the spread favors, `None` at pick'em
    pub fn favorite(&self) -> Option<TeamSide> {
        if self.spread < 0.0 {
            Some(TeamSide::Home)
        } else if self.spread > 0.0 {
            Some(TeamSide::Away)
        } else {
            None
        }
    }
}

// ============================================================================
// Sources
// ============================================================================

/// Which adapter produced an odds set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    LiveSession,
    OddsApi,
    EspnApi,
    Scrape,
    Simulation,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::LiveSession => "live_session",
            SourceKind::OddsApi => "odds_api",
            SourceKind::EspnApi => "espn_api",
            SourceKind::Scrape => "scrape",
            SourceKind::Simulation => "simulation",
        }
    }

    /// Whether this source performs network I/O
    pub fn is_network(&self) -> bool {
        !matches!(self, SourceKind::Simulation)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BettingVolume {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SharpMoney {
    Home,
    Away,
    Balanced,
}

/// Simulated market color attached to synthesized odds sets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketContext {
    /// Line movement applied to the base spread (half-point multiple)
    pub market_movement: f64,
    pub betting_volume: BettingVolume,
    pub sharp_money: SharpMoney,
}

/// A game plus every quote one source returned for it.
///
/// An empty `sportsbooks` map counts as an unusable result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameOddsSet {
    pub game: Game,
    pub sportsbooks: BTreeMap<String, SportsbookQuote>,
    pub source: SourceKind,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market: Option<MarketContext>,
}

impl GameOddsSet {
    pub fn new(game: Game, source: SourceKind, timestamp: DateTime<Utc>) -> Self {
        Self {
            game,
            sportsbooks: BTreeMap::new(),
            source,
            timestamp,
            market: None,
        }
    }

    pub fn with_quotes(mut self, quotes: impl IntoIterator<Item = SportsbookQuote>) -> Self {
        for quote in quotes {
            self.insert_quote(quote);
        }
        self
    }

    pub fn insert_quote(&mut self, quote: SportsbookQuote) {
        self.sportsbooks.insert(quote.book_name.clone(), quote);
    }

    pub fn is_usable(&self) -> bool {
        !self.sportsbooks.is_empty()
    }

    pub fn quote(&self, book: &str) -> Option<&SportsbookQuote> {
        self.sportsbooks.get(book)
    }
}

// ============================================================================
// Predictions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TotalPick {
    Over,
    Under,
}

impl TotalPick {
    pub fn as_str(&self) -> &'static str {
        match self {
            TotalPick::Over => "OVER",
            TotalPick::Under => "UNDER",
        }
    }
}

impl fmt::Display for TotalPick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of a single named model for one game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub model_name: String,
    /// Team id taken against the spread
    pub spread_pick: String,
    pub total_pick: TotalPick,
    /// Team id taken straight up
    pub moneyline_pick: String,
    pub confidence: f64,
    pub expected_value: f64,
    pub kelly_fraction: f64,
    pub spread_line: f64,
    pub predicted_total: f64,
    pub win_probability: f64,
    pub implied_odds: i32,
}

/// A pick and the confidence attached to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickConfidence<T> {
    pub pick: T,
    pub confidence: f64,
}

/// Headline pick for a game, derived independently of the individual models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusPrediction {
    pub model_name: String,
    pub spread: PickConfidence<String>,
    pub total: PickConfidence<TotalPick>,
    pub moneyline: PickConfidence<String>,
    pub reasoning_bullets: Vec<String>,
    pub overall_confidence: f64,
}

/// Everything predicted for one game: the consensus plus named models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamePredictions {
    pub consensus: ConsensusPrediction,
    #[serde(flatten)]
    pub models: BTreeMap<String, PredictionResult>,
}

/// Game key ("Away @ Home") -> predictions
pub type PredictionSet = BTreeMap<String, GamePredictions>;
