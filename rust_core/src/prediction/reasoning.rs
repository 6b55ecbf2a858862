//! Consensus reasoning bullets.
//!
//! `compose` is a pure function of (category, picks, seed): it picks a
//! template from the category's table and fills its placeholders, drawing
//! every choice from a generator built from `seed`.

use super::phrases::{self, Template};
use super::seed::matchup_seed;
use crate::models::{TeamSide, TotalPick};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReasoningCategory {
    Spread,
    Total,
    Matchup,
    Analytics,
    Market,
}

impl ReasoningCategory {
    /// Bullet order
    pub const ALL: [ReasoningCategory; 5] = [
        ReasoningCategory::Spread,
        ReasoningCategory::Total,
        ReasoningCategory::Matchup,
        ReasoningCategory::Analytics,
        ReasoningCategory::Market,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ReasoningCategory::Spread => "spread",
            ReasoningCategory::Total => "total",
            ReasoningCategory::Matchup => "matchup",
            ReasoningCategory::Analytics => "analytics",
            ReasoningCategory::Market => "market",
        }
    }

    fn headline(&self, input: &ReasoningInput<'_>) -> &'static str {
        match (self, input.spread_pick, input.total_pick) {
            (ReasoningCategory::Spread, TeamSide::Home, _) => "Home Field Advantage",
            (ReasoningCategory::Spread, TeamSide::Away, _) => "Road Warrior Value",
            (ReasoningCategory::Total, _, TotalPick::Over) => "Over Analysis",
            (ReasoningCategory::Total, _, TotalPick::Under) => "Under Analysis",
            (ReasoningCategory::Matchup, ..) => "Key Matchup",
            (ReasoningCategory::Analytics, ..) => "Analytics Edge",
            (ReasoningCategory::Market, ..) => "Market Intelligence",
        }
    }

    fn templates(&self, input: &ReasoningInput<'_>) -> &'static [Template] {
        match self {
            ReasoningCategory::Spread => match input.spread_pick {
                TeamSide::Home => phrases::HOME_SPREAD,
                TeamSide::Away => phrases::ROAD_SPREAD,
            },
            ReasoningCategory::Total => match input.total_pick {
                TotalPick::Over => phrases::OVER,
                TotalPick::Under => phrases::UNDER,
            },
            ReasoningCategory::Matchup if input.divisional => phrases::DIVISIONAL,
            ReasoningCategory::Matchup => phrases::MATCHUP,
            ReasoningCategory::Analytics => phrases::ANALYTICS,
            ReasoningCategory::Market => phrases::MARKET,
        }
    }

    /// Side substituted for `{pick}`
    fn pick_side(&self, input: &ReasoningInput<'_>) -> TeamSide {
        match self {
            ReasoningCategory::Spread => input.spread_pick,
            _ => input.moneyline_pick,
        }
    }
}

/// Picks the reasoning is written around
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReasoningInput<'a> {
    pub away: &'a str,
    pub home: &'a str,
    pub spread_pick: TeamSide,
    pub total_pick: TotalPick,
    pub moneyline_pick: TeamSide,
    /// Both teams share a division
    pub divisional: bool,
}

impl ReasoningInput<'_> {
    fn team(&self, side: TeamSide) -> &str {
        match side {
            TeamSide::Away => self.away,
            TeamSide::Home => self.home,
        }
    }
}

fn choose<'t, R: Rng + ?Sized>(options: &'t [&'t str], rng: &mut R) -> &'t str {
    options.choose(rng).copied().unwrap_or_default()
}

/// One "Headline: text" bullet.
pub fn compose(category: ReasoningCategory, input: &ReasoningInput<'_>, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    let templates = category.templates(input);
    let Some(template) = templates.choose(&mut rng) else {
        return category.headline(input).to_string();
    };

    // Draw order is fixed so the same seed always fills the same way
    let away_factor = choose(phrases::team_factors(input.away, false), &mut rng);
    let home_factor = choose(phrases::team_factors(input.home, true), &mut rng);
    let either = if rng.gen_bool(0.5) { input.away } else { input.home };
    let detail = choose(template.details, &mut rng);

    let text = template
        .text
        .replace("{away_factor}", away_factor)
        .replace("{home_factor}", home_factor)
        .replace("{either}", either)
        .replace("{detail}", detail)
        .replace("{pick}", input.team(category.pick_side(input)))
        .replace("{away}", input.away)
        .replace("{home}", input.home);

    format!("{}: {}", category.headline(input), text)
}

/// Seed for one reasoning category of a matchup's consensus
pub fn category_seed(away: &str, home: &str, category: ReasoningCategory) -> u64 {
    matchup_seed(away, home, &format!("consensus/reasoning/{}", category.key()))
}

/// Five bullets, one per category, in `ReasoningCategory::ALL` order.
pub fn reasoning_bullets(input: &ReasoningInput<'_>) -> Vec<String> {
    ReasoningCategory::ALL
        .iter()
        .map(|&category| compose(category, input, category_seed(input.away, input.home, category)))
        .collect()
}
