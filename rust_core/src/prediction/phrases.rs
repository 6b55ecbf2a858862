//! Static phrase tables for consensus reasoning.
//!
//! Placeholders: `{away}`, `{home}`, `{pick}` (the winning side of the
//! category), `{either}` (a seeded choice of either team),
//! `{away_factor}` / `{home_factor}` (team strength phrases) and
//! `{detail}` (one of the template's own details).

use crate::teams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub text: &'static str,
    pub details: &'static [&'static str],
}

const fn plain(text: &'static str) -> Template {
    Template { text, details: &[] }
}

const fn detailed(text: &'static str, details: &'static [&'static str]) -> Template {
    Template { text, details }
}

pub const DEFAULT_AWAY_FACTORS: [&str; 4] = [
    "offensive potential",
    "defensive improvements",
    "coaching changes",
    "young talent",
];

pub const DEFAULT_HOME_FACTORS: [&str; 4] = [
    "home field advantage",
    "defensive strength",
    "offensive weapons",
    "coaching stability",
];

pub static TEAM_FACTORS: &[(&str, [&str; 4])] = &[
    ("Kansas City Chiefs", ["elite quarterback play", "championship experience", "strong offensive line", "playoff-tested defense"]),
    ("Buffalo Bills", ["explosive passing offense", "improved rushing attack", "elite pass rush", "home field advantage"]),
    ("San Francisco 49ers", ["dominant defense", "versatile offensive scheme", "strong running game", "coaching advantage"]),
    ("Philadelphia Eagles", ["balanced offensive attack", "aggressive defense", "strong special teams", "divisional familiarity"]),
    ("Dallas Cowboys", ["high-powered offense", "playmaking defense", "home crowd support", "divisional rivalry intensity"]),
    ("Baltimore Ravens", ["dynamic rushing offense", "opportunistic defense", "strong coaching", "playoff experience"]),
    ("Cincinnati Bengals", ["elite passing offense", "improved offensive line", "young core talent", "recent success momentum"]),
    ("Miami Dolphins", ["explosive offensive weapons", "improved defense", "speed advantage", "warm weather home games"]),
    ("Los Angeles Chargers", ["elite quarterback", "strong pass rush", "defensive playmakers", "coaching stability"]),
    ("New York Jets", ["elite defense", "improved offensive line", "veteran leadership", "home field energy"]),
    ("Pittsburgh Steelers", ["strong defense", "physical running game", "coaching experience", "divisional toughness"]),
    ("Cleveland Browns", ["strong running game", "elite pass rush", "defensive depth", "home field advantage"]),
    ("Green Bay Packers", ["elite quarterback", "strong receiving corps", "improved defense", "cold weather advantage"]),
    ("Detroit Lions", ["explosive offense", "improved defense", "home crowd energy", "coaching innovation"]),
    ("Minnesota Vikings", ["strong passing attack", "defensive playmakers", "home field advantage", "divisional knowledge"]),
    ("Chicago Bears", ["strong defense", "improved offensive line", "young talent development", "divisional rivalry"]),
    ("New Orleans Saints", ["strong home field advantage", "defensive experience", "coaching stability", "divisional familiarity"]),
    ("Tampa Bay Buccaneers", ["offensive firepower", "veteran leadership", "warm weather advantage", "recent success"]),
    ("Atlanta Falcons", ["explosive offensive potential", "improved defense", "home dome advantage", "coaching changes"]),
    ("Carolina Panthers", ["defensive playmakers", "young talent", "divisional familiarity", "home field support"]),
    ("Los Angeles Rams", ["offensive line strength", "defensive experience", "coaching advantage", "home field benefit"]),
    ("Seattle Seahawks", ["strong home field advantage", "defensive improvements", "running game strength", "coaching experience"]),
    ("Arizona Cardinals", ["offensive weapons", "improved defense", "home field advantage", "coaching stability"]),
    ("Houston Texans", ["young quarterback development", "defensive improvements", "home crowd support", "coaching innovation"]),
    ("Indianapolis Colts", ["strong offensive line", "defensive depth", "home field advantage", "coaching experience"]),
    ("Jacksonville Jaguars", ["offensive playmakers", "defensive improvements", "home field energy", "young core talent"]),
    ("Tennessee Titans", ["physical running game", "defensive experience", "home field advantage", "coaching stability"]),
    ("Denver Broncos", ["strong defense", "altitude advantage", "coaching improvements", "home field benefit"]),
    ("Las Vegas Raiders", ["offensive weapons", "improved defense", "home field advantage", "coaching changes"]),
    ("New England Patriots", ["coaching advantage", "defensive discipline", "home field benefit", "system familiarity"]),
    ("New York Giants", ["defensive improvements", "offensive line strength", "home field advantage", "coaching stability"]),
    ("Washington Commanders", ["defensive playmakers", "improved offense", "home field support", "divisional knowledge"]),
];

/// Strength phrases for a team; unknown teams get the side's defaults.
pub fn team_factors(team: &str, home: bool) -> &'static [&'static str] {
    let canonical = teams::resolve(team).unwrap_or(team);
    TEAM_FACTORS
        .iter()
        .find(|(name, _)| *name == canonical)
        .map(|(_, factors)| factors.as_slice())
        .unwrap_or(if home {
            &DEFAULT_HOME_FACTORS[..]
        } else {
            &DEFAULT_AWAY_FACTORS[..]
        })
}

pub static HOME_SPREAD: &[Template] = &[plain(
    "{home} benefits from {home_factor} and crowd support, giving them the edge against the spread",
)];

pub static ROAD_SPREAD: &[Template] = &[plain(
    "{away} shows {away_factor} that translates well on the road, making them the spread play",
)];

pub static OVER: &[Template] = &[
    detailed(
        "Both teams feature {detail}, pushing this game over the total",
        &["high-powered offenses", "explosive playmakers", "weak defensive secondaries"],
    ),
    detailed(
        "Weather conditions and {detail} favor scoring, pushing this game over the total",
        &["dome environment", "favorable wind patterns", "warm temperatures"],
    ),
    detailed(
        "Recent matchups between these teams have {detail}, pushing this game over the total",
        &["exceeded totals", "featured high-scoring affairs", "seen defensive struggles"],
    ),
];

pub static UNDER: &[Template] = &[
    detailed(
        "Both defenses show {detail}, keeping scoring below the total",
        &["strong pass rush", "elite secondary play", "improved run stopping"],
    ),
    detailed(
        "Weather conditions including {detail} limit scoring, keeping scoring below the total",
        &["cold temperatures", "potential wind", "defensive weather"],
    ),
    detailed(
        "Both teams prefer {detail} offensive approaches, keeping scoring below the total",
        &["ground-and-pound", "ball control", "time-consuming drives"],
    ),
];

pub static MATCHUP: &[Template] = &[
    plain("{away}'s {away_factor} creates favorable matchups against {home}'s defensive scheme"),
    plain("{home}'s {home_factor} should neutralize {away}'s primary offensive threats"),
    plain("Key injury reports favor {either} with better depth and health status"),
    plain("Recent form analysis shows {either} trending upward in key performance metrics"),
];

/// Matchup framing for teams that share a division
pub static DIVISIONAL: &[Template] = &[
    plain("Division familiarity narrows the gap: {home}'s {home_factor} has seen {away} twice a year"),
    plain("{away}'s {away_factor} gets a rematch-style test against a {home} staff that knows it well"),
    plain("Rivalry games compress margins and {either} has handled this divisional spot better"),
];

pub static ANALYTICS: &[Template] = &[
    detailed(
        "Advanced metrics show {pick} with superior {detail}",
        &["DVOA ratings", "EPA per play", "success rate", "explosive play percentage"],
    ),
    detailed(
        "Situational analysis favors {pick} in {detail}",
        &["red zone efficiency", "third down conversions", "turnover differential", "time of possession"],
    ),
    detailed(
        "Historical data indicates {pick} performs better in {detail}",
        &["primetime games", "divisional matchups", "similar weather conditions", "playoff-type atmospheres"],
    ),
];

pub static MARKET: &[Template] = &[
    plain("Sharp money movement suggests {either} offers better value than public perception indicates"),
    detailed(
        "Line movement and betting percentages reveal {detail}",
        &["contrarian opportunity", "public fade spot", "sharp consensus play"],
    ),
    plain("Historical performance against similar spreads favors {either} in this spot"),
];
