//! Ratings -> canonical line.
//!
//! The margin is `(home_power + HFA - away_power) / 3.2`, quantized to the
//! nearest half point. Quotes carry the home-relative spread, which is the
//! negated margin: a stronger home side produces a negative spread.

use crate::models::TeamRating;
use chrono::{DateTime, Timelike, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

/// Rating points added to the home side before differencing
pub const HOME_FIELD_ADVANTAGE: f64 = 2.5;
/// Rating points per point of spread
pub const RATING_POINTS_PER_POINT: f64 = 3.2;
/// Total for two league-average offenses
pub const BASE_TOTAL: f64 = 35.0;
pub const LEAGUE_AVG_OFFENSE: f64 = 75.0;
/// Points of total per rating point of average offense above league average
pub const TOTAL_SCALE: f64 = 0.3;
/// Bound on the random perturbation of the total
pub const TOTAL_NOISE: f64 = 2.0;
/// Bound on time-of-day line movement
pub const MAX_MARKET_MOVEMENT: f64 = 0.5;
/// Floor for synthesized totals
pub const MIN_TOTAL: f64 = 0.5;

const MOVEMENT_STEPS: [f64; 3] = [-MAX_MARKET_MOVEMENT, 0.0, MAX_MARKET_MOVEMENT];

/// Round to the nearest half point, halves away from zero. Never returns -0.0.
#[inline]
pub fn quantize_half(value: f64) -> f64 {
    (value * 2.0).round() / 2.0 + 0.0
}

/// Whether `value * 2` is an integer
#[inline]
pub fn is_half_point(value: f64) -> bool {
    let doubled = value * 2.0;
    doubled.is_finite() && doubled.fract() == 0.0
}

/// Fraction of the UTC day elapsed at `now`, in [0, 1)
pub fn day_fraction(now: DateTime<Utc>) -> f64 {
    f64::from(now.hour() * 60 + now.minute()) / 1440.0
}

/// Canonical line for one game.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesizedLine {
    /// Quantized home-minus-away margin (positive = home stronger)
    pub margin: f64,
    /// Home-relative spread, `-margin`
    pub spread: f64,
    pub total: f64,
    pub raw_margin: f64,
    pub raw_total: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct OddsSynthesizer {
    home_field_advantage: f64,
    total_noise: f64,
}

impl Default for OddsSynthesizer {
    fn default() -> Self {
        Self {
            home_field_advantage: HOME_FIELD_ADVANTAGE,
            total_noise: TOTAL_NOISE,
        }
    }
}

impl OddsSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the total perturbation bound; `0.0` makes totals exact.
    pub fn with_total_noise(mut self, bound: f64) -> Self {
        self.total_noise = bound.abs();
        self
    }

    pub fn with_home_field_advantage(mut self, hfa: f64) -> Self {
        self.home_field_advantage = hfa;
        self
    }

    pub fn raw_margin(&self, away: &TeamRating, home: &TeamRating) -> f64 {
        (home.power_rating + self.home_field_advantage - away.power_rating)
            / RATING_POINTS_PER_POINT
    }

    pub fn raw_total(&self, away: &TeamRating, home: &TeamRating) -> f64 {
        let avg_offense = (away.offense_rating + home.offense_rating) / 2.0;
        BASE_TOTAL + (avg_offense - LEAGUE_AVG_OFFENSE) * TOTAL_SCALE
    }

    pub fn synthesize<R: Rng + ?Sized>(
        &self,
        away: &TeamRating,
        home: &TeamRating,
        rng: &mut R,
    ) -> SynthesizedLine {
        let raw_margin = self.raw_margin(away, home);
        let margin = quantize_half(raw_margin);

        let raw_total = self.raw_total(away, home);
        let noise = if self.total_noise > 0.0 {
            rng.gen_range(-self.total_noise..=self.total_noise)
        } else {
            0.0
        };
        let total = quantize_half(raw_total + noise).max(MIN_TOTAL);

        SynthesizedLine {
            margin,
            spread: -margin + 0.0,
            total,
            raw_margin,
            raw_total,
        }
    }

    /// Random line movement in [-0.5, 0.5], scaled by the elapsed-day fraction.
    /// Not quantized; pass the result through `apply_movement`.
    pub fn market_movement<R: Rng + ?Sized>(&self, rng: &mut R, day_fraction: f64) -> f64 {
        let step = MOVEMENT_STEPS.choose(rng).copied().unwrap_or(0.0);
        step * day_fraction.clamp(0.0, 1.0)
    }

    /// Moved spread, re-quantized so the half-point invariant survives.
    pub fn apply_movement(&self, spread: f64, movement: f64) -> f64 {
        quantize_half(spread + movement)
    }
}
