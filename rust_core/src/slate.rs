//! Slates: the set of contests an acquisition cycle works against.

use crate::models::Game;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rustc_hash::FxHashSet;
use thiserror::Error;

/// Opening-week matchups as (away, home)
static WEEK_ONE: &[(&str, &str)] = &[
    ("Dallas Cowboys", "Philadelphia Eagles"),
    ("Kansas City Chiefs", "Los Angeles Chargers"),
    ("Las Vegas Raiders", "New England Patriots"),
    ("Pittsburgh Steelers", "New York Jets"),
    ("Miami Dolphins", "Indianapolis Colts"),
    ("Arizona Cardinals", "New Orleans Saints"),
    ("New York Giants", "Washington Commanders"),
    ("Carolina Panthers", "Jacksonville Jaguars"),
    ("Cincinnati Bengals", "Cleveland Browns"),
    ("Tampa Bay Buccaneers", "Atlanta Falcons"),
    ("Tennessee Titans", "Denver Broncos"),
    ("San Francisco 49ers", "Seattle Seahawks"),
    ("Detroit Lions", "Green Bay Packers"),
    ("Houston Texans", "Los Angeles Rams"),
    ("Baltimore Ravens", "Buffalo Bills"),
    ("Minnesota Vikings", "Chicago Bears"),
];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SlateError {
    #[error("Game has an empty team name: {0}")]
    MissingTeam(String),

    #[error("Team plays itself: {0}")]
    SameTeam(String),

    #[error("Duplicate matchup on slate: {0}")]
    Duplicate(String),
}

/// Ordered set of games with no duplicate (away, home) pairs.
///
/// When `strict` is set, network adapters drop any game they return
/// that is not on the slate.
#[derive(Debug, Clone, PartialEq)]
pub struct Slate {
    pub label: String,
    games: Vec<Game>,
    pub strict: bool,
}

impl Slate {
    pub fn new(label: impl Into<String>, games: Vec<Game>) -> Result<Self, SlateError> {
        let mut seen = FxHashSet::default();
        for game in &games {
            if game.away_team.trim().is_empty() || game.home_team.trim().is_empty() {
                return Err(SlateError::MissingTeam(game.key()));
            }
            if !game.is_valid() {
                return Err(SlateError::SameTeam(game.key()));
            }
            if !seen.insert((game.away_team.clone(), game.home_team.clone())) {
                return Err(SlateError::Duplicate(game.key()));
            }
        }

        Ok(Self {
            label: label.into(),
            games,
            strict: false,
        })
    }

    /// Default opening-week slate. Kickoffs are synthetic: one Thursday
    /// opener, then Sunday windows in 3-hour steps, then a Monday finale.
    pub fn week_one() -> Self {
        let thursday = Utc
            .with_ymd_and_hms(2025, 9, 5, 0, 20, 0)
            .single()
            .unwrap_or_else(Utc::now);
        let sunday = thursday + Duration::days(2) + Duration::hours(16) + Duration::minutes(40);
        let monday = thursday + Duration::days(4);

        let last = WEEK_ONE.len() - 1;
        let games = WEEK_ONE
            .iter()
            .enumerate()
            .map(|(i, &(away, home))| {
                let kickoff = match i {
                    0 => thursday,
                    i if i == last => monday,
                    i => sunday + Duration::hours(3 * ((i as i64 - 1) / 6)),
                };
                Game::new(away, home, kickoff)
            })
            .collect();

        // Pairs are static and distinct
        Self {
            label: "NFL Week 1".to_string(),
            games,
            strict: false,
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn contains(&self, away: &str, home: &str) -> bool {
        self.games.iter().any(|g| g.pair() == (away, home))
    }

    /// Kickoff for a matchup on the slate, if any.
    pub fn kickoff_for(&self, away: &str, home: &str) -> Option<DateTime<Utc>> {
        self.games
            .iter()
            .find(|g| g.pair() == (away, home))
            .map(|g| g.kickoff)
    }
}

impl Default for Slate {
    fn default() -> Self {
        Self::week_one()
    }
}
