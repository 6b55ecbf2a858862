//! Team strength ratings.
//!
//! This module provides:
//! - The built-in NFL rating table
//! - Default-rating policy for unknown teams
//! - JSON loading of an alternate table

use crate::models::TeamRating;
use crate::teams;
use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Built-in ratings: (team, power, offense, defense, recent form)
static NFL_RATINGS: &[(&str, f64, f64, f64, f64)] = &[
    ("Kansas City Chiefs", 95.0, 92.0, 88.0, 0.85),
    ("Buffalo Bills", 92.0, 89.0, 86.0, 0.82),
    ("San Francisco 49ers", 90.0, 88.0, 91.0, 0.78),
    ("Green Bay Packers", 89.0, 86.0, 84.0, 0.79),
    ("Philadelphia Eagles", 88.0, 85.0, 84.0, 0.80),
    ("Dallas Cowboys", 87.0, 89.0, 82.0, 0.75),
    ("Baltimore Ravens", 86.0, 84.0, 89.0, 0.83),
    ("Los Angeles Rams", 86.0, 84.0, 85.0, 0.77),
    ("Cincinnati Bengals", 85.0, 91.0, 78.0, 0.77),
    ("Minnesota Vikings", 85.0, 84.0, 82.0, 0.76),
    ("Miami Dolphins", 84.0, 87.0, 79.0, 0.72),
    ("Detroit Lions", 84.0, 88.0, 78.0, 0.81),
    ("Seattle Seahawks", 84.0, 82.0, 81.0, 0.73),
    ("Los Angeles Chargers", 83.0, 82.0, 85.0, 0.74),
    ("Tampa Bay Buccaneers", 83.0, 87.0, 77.0, 0.75),
    ("New York Jets", 82.0, 78.0, 87.0, 0.71),
    ("New Orleans Saints", 82.0, 81.0, 84.0, 0.74),
    ("Pittsburgh Steelers", 81.0, 76.0, 88.0, 0.76),
    ("Cleveland Browns", 80.0, 79.0, 83.0, 0.69),
    ("Atlanta Falcons", 80.0, 85.0, 76.0, 0.72),
    ("Denver Broncos", 80.0, 78.0, 84.0, 0.71),
    ("Tennessee Titans", 79.0, 77.0, 81.0, 0.68),
    ("Arizona Cardinals", 79.0, 83.0, 75.0, 0.69),
    ("Indianapolis Colts", 78.0, 80.0, 76.0, 0.70),
    ("Chicago Bears", 78.0, 75.0, 83.0, 0.67),
    ("Washington Commanders", 78.0, 79.0, 78.0, 0.68),
    ("Jacksonville Jaguars", 77.0, 81.0, 73.0, 0.66),
    ("New York Giants", 77.0, 73.0, 82.0, 0.65),
    ("Houston Texans", 76.0, 83.0, 71.0, 0.73),
    ("Carolina Panthers", 76.0, 74.0, 79.0, 0.64),
    ("Las Vegas Raiders", 76.0, 77.0, 76.0, 0.66),
    ("New England Patriots", 75.0, 71.0, 80.0, 0.63),
];

/// Read-only team -> rating lookup with a default for unknown teams.
///
/// Keys are canonical team names when the registry knows the team,
/// otherwise the trimmed lowercase name from the source table.
#[derive(Debug, Clone)]
pub struct RatingTable {
    ratings: FxHashMap<String, TeamRating>,
    default: TeamRating,
}

impl RatingTable {
    /// Empty table; every lookup returns the default rating.
    pub fn empty() -> Self {
        Self {
            ratings: FxHashMap::default(),
            default: TeamRating::DEFAULT,
        }
    }

    /// The built-in NFL table.
    pub fn nfl() -> Self {
        Self::from_entries(NFL_RATINGS.iter().map(|&(name, p, o, d, f)| {
            (name.to_string(), TeamRating::new(p, o, d, f))
        }))
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, TeamRating)>) -> Self {
        let mut table = Self::empty();
        for (name, rating) in entries {
            table.ratings.insert(Self::key(&name), rating);
        }
        table
    }

    /// Load from a JSON file: `{ "team": { "power_rating": .., ... }, ... }`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read rating table {}", path.display()))?;
        let entries: HashMap<String, TeamRating> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse rating table {}", path.display()))?;

        debug!("Loaded {} team ratings from {}", entries.len(), path.display());
        Ok(Self::from_entries(entries))
    }

    /// Replace the rating handed to unknown teams.
    pub fn with_default(mut self, default: TeamRating) -> Self {
        self.default = default;
        self
    }

    fn key(name: &str) -> String {
        teams::resolve(name)
            .map(str::to_string)
            .unwrap_or_else(|| name.trim().to_lowercase())
    }

    /// Rating for a team; never fails, unknown teams get the default.
    pub fn get(&self, team: &str) -> TeamRating {
        self.ratings
            .get(&Self::key(team))
            .copied()
            .unwrap_or(self.default)
    }

    pub fn contains(&self, team: &str) -> bool {
        self.ratings.contains_key(&Self::key(team))
    }

    pub fn default_rating(&self) -> TeamRating {
        self.default
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }
}

impl Default for RatingTable {
    fn default() -> Self {
        Self::nfl()
    }
}
