//! NFL team registry.
//!
//! This module provides:
//! - Static team data (full name, nickname, abbreviation, division)
//! - Case-insensitive resolution from any of those spellings
//! - Fuzzy fallback for vendor spellings via Jaro-Winkler

use rustc_hash::FxHashMap;
use std::sync::OnceLock;

/// Minimum Jaro-Winkler similarity to accept a fuzzy team match
const FUZZY_MATCH_THRESHOLD: f64 = 0.92;

/// Static data for a single team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamInfo {
    pub name: &'static str,
    pub nickname: &'static str,
    pub abbr: &'static str,
    pub division: &'static str,
}

const fn team(
    name: &'static str,
    nickname: &'static str,
    abbr: &'static str,
    division: &'static str,
) -> TeamInfo {
    TeamInfo {
        name,
        nickname,
        abbr,
        division,
    }
}

/// All 32 franchises.
pub static NFL_TEAMS: &[TeamInfo] = &[
    team("Arizona Cardinals", "Cardinals", "ARI", "NFC West"),
    team("Atlanta Falcons", "Falcons", "ATL", "NFC South"),
    team("Baltimore Ravens", "Ravens", "BAL", "AFC North"),
    team("Buffalo Bills", "Bills", "BUF", "AFC East"),
    team("Carolina Panthers", "Panthers", "CAR", "NFC South"),
    team("Chicago Bears", "Bears", "CHI", "NFC North"),
    team("Cincinnati Bengals", "Bengals", "CIN", "AFC North"),
    team("Cleveland Browns", "Browns", "CLE", "AFC North"),
    team("Dallas Cowboys", "Cowboys", "DAL", "NFC East"),
    team("Denver Broncos", "Broncos", "DEN", "AFC West"),
    team("Detroit Lions", "Lions", "DET", "NFC North"),
    team("Green Bay Packers", "Packers", "GB", "NFC North"),
    team("Houston Texans", "Texans", "HOU", "AFC South"),
    team("Indianapolis Colts", "Colts", "IND", "AFC South"),
    team("Jacksonville Jaguars", "Jaguars", "JAX", "AFC South"),
    team("Kansas City Chiefs", "Chiefs", "KC", "AFC West"),
    team("Las Vegas Raiders", "Raiders", "LV", "AFC West"),
    team("Los Angeles Chargers", "Chargers", "LAC", "AFC West"),
    team("Los Angeles Rams", "Rams", "LAR", "NFC West"),
    team("Miami Dolphins", "Dolphins", "MIA", "AFC East"),
    team("Minnesota Vikings", "Vikings", "MIN", "NFC North"),
    team("New England Patriots", "Patriots", "NE", "AFC East"),
    team("New Orleans Saints", "Saints", "NO", "NFC South"),
    team("New York Giants", "Giants", "NYG", "NFC East"),
    team("New York Jets", "Jets", "NYJ", "AFC East"),
    team("Philadelphia Eagles", "Eagles", "PHI", "NFC East"),
    team("Pittsburgh Steelers", "Steelers", "PIT", "AFC North"),
    team("San Francisco 49ers", "49ers", "SF", "NFC West"),
    team("Seattle Seahawks", "Seahawks", "SEA", "NFC West"),
    team("Tampa Bay Buccaneers", "Buccaneers", "TB", "NFC South"),
    team("Tennessee Titans", "Titans", "TEN", "AFC South"),
    team("Washington Commanders", "Commanders", "WAS", "NFC East"),
];

/// lowercase spelling -> index into NFL_TEAMS
fn index() -> &'static FxHashMap<String, usize> {
    static INDEX: OnceLock<FxHashMap<String, usize>> = OnceLock::new();
    INDEX.get_or_init(|| {
        let mut map = FxHashMap::default();
        for (i, t) in NFL_TEAMS.iter().enumerate() {
            map.insert(t.name.to_lowercase(), i);
            map.insert(t.nickname.to_lowercase(), i);
            map.insert(t.abbr.to_lowercase(), i);
        }
        map
    })
}

/// Look up a team by full name, nickname or abbreviation.
///
/// Falls back to fuzzy matching against full names so minor vendor
/// misspellings still land on the right franchise.
pub fn lookup(name: &str) -> Option<&'static TeamInfo> {
    let key = name.trim().to_lowercase();
    if key.is_empty() {
        return None;
    }

    if let Some(&i) = index().get(&key) {
        return Some(&NFL_TEAMS[i]);
    }

    NFL_TEAMS
        .iter()
        .map(|t| (t, strsim::jaro_winkler(&key, &t.name.to_lowercase())))
        .filter(|(_, score)| *score >= FUZZY_MATCH_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(t, _)| t)
}

/// Canonical full name for any known spelling.
pub fn resolve(name: &str) -> Option<&'static str> {
    lookup(name).map(|t| t.name)
}

/// Canonical full name, or the input unchanged when unknown.
pub fn canonical_or_raw(name: &str) -> String {
    resolve(name)
        .map(str::to_string)
        .unwrap_or_else(|| name.trim().to_string())
}

/// Team abbreviation, "UNK" when unknown.
pub fn abbr(name: &str) -> &'static str {
    lookup(name).map(|t| t.abbr).unwrap_or("UNK")
}

/// Full names of every team in a division (e.g. "AFC East").
pub fn division_teams(division: &str) -> Vec<&'static str> {
    NFL_TEAMS
        .iter()
        .filter(|t| t.division.eq_ignore_ascii_case(division))
        .map(|t| t.name)
        .collect()
}

/// Whether two teams share a division.
pub fn is_divisional(a: &str, b: &str) -> bool {
    match (lookup(a), resolve(b)) {
        (Some(x), Some(other)) => division_teams(x.division).contains(&other),
        _ => false,
    }
}

/// Nicknames used as search tokens when scraping free text.
pub fn nicknames() -> impl Iterator<Item = &'static str> {
    NFL_TEAMS.iter().map(|t| t.nickname)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_spellings() {
        assert_eq!(resolve("Kansas City Chiefs"), Some("Kansas City Chiefs"));
        assert_eq!(resolve("chiefs"), Some("Kansas City Chiefs"));
        assert_eq!(resolve("KC"), Some("Kansas City Chiefs"));
        assert_eq!(resolve("49ers"), Some("San Francisco 49ers"));
    }

    #[test]
    fn test_fuzzy_resolution() {
        assert_eq!(resolve("Kansas City Chefs"), Some("Kansas City Chiefs"));
        assert_eq!(resolve("Springfield Atoms"), None);
        assert_eq!(resolve("   "), None);
    }

    #[test]
    fn test_abbr_unknown() {
        assert_eq!(abbr("Green Bay Packers"), "GB");
        assert_eq!(abbr("London Monarchs"), "UNK");
    }

    #[test]
    fn test_divisions() {
        let east = division_teams("AFC East");
        assert_eq!(east.len(), 4);
        assert!(east.contains(&"Buffalo Bills"));
        assert!(is_divisional("Cowboys", "Philadelphia Eagles"));
        assert!(!is_divisional("Cowboys", "Chiefs"));
        assert!(division_teams("XFL North").is_empty());
    }

    #[test]
    fn test_registry_is_complete() {
        assert_eq!(NFL_TEAMS.len(), 32);
        assert_eq!(nicknames().count(), 32);
        assert_eq!(canonical_or_raw("Unknown FC"), "Unknown FC");
    }
}
