//! Per-sportsbook quote variation and spread -> moneyline conversion.

use super::synthesizer::quantize_half;
use crate::models::SportsbookQuote;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

/// Standard book roster, in display order
pub const SPORTSBOOKS: [&str; 5] = ["DraftKings", "FanDuel", "BetMGM", "Caesars", "PointsBet"];

const TIGHT_STEPS: [f64; 3] = [-0.5, 0.0, 0.5];
const WIDE_STEPS: [f64; 5] = [-1.0, -0.5, 0.0, 0.5, 1.0];
const PICKEM_PRICES: [i32; 3] = [-105, -110, -115];
const VIG_JITTER: i32 = 5;

/// How far a book shades the market line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    /// Posts the market line as-is
    Fixed,
    /// One of {-0.5, 0, +0.5}
    Tight,
    /// One of {-1.0 ... +1.0} in half points
    Wide,
}

impl Adjustment {
    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let steps: &[f64] = match self {
            Adjustment::Fixed => return 0.0,
            Adjustment::Tight => &TIGHT_STEPS,
            Adjustment::Wide => &WIDE_STEPS,
        };
        steps.choose(rng).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookProfile {
    pub name: &'static str,
    pub spread: Adjustment,
    pub total: Adjustment,
    /// Baseline price before jitter
    pub vig: i32,
}

pub const BOOK_PROFILES: [BookProfile; 5] = [
    BookProfile { name: "DraftKings", spread: Adjustment::Fixed, total: Adjustment::Fixed, vig: -110 },
    BookProfile { name: "FanDuel", spread: Adjustment::Tight, total: Adjustment::Tight, vig: -110 },
    BookProfile { name: "BetMGM", spread: Adjustment::Tight, total: Adjustment::Wide, vig: -105 },
    BookProfile { name: "Caesars", spread: Adjustment::Tight, total: Adjustment::Tight, vig: -110 },
    BookProfile { name: "PointsBet", spread: Adjustment::Wide, total: Adjustment::Wide, vig: -105 },
];

/// Moneyline magnitude range for a band of absolute spreads.
///
/// Bands are contiguous and non-overlapping except at their shared edges,
/// so a larger |spread| never yields a price closer to even.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoneylineBand {
    /// Inclusive upper bound on |spread| for this band
    pub max_spread: f64,
    pub low: i32,
    pub high: i32,
}

const BANDS: [MoneylineBand; 4] = [
    MoneylineBand { max_spread: 1.0, low: 100, high: 120 },
    MoneylineBand { max_spread: 3.0, low: 120, high: 160 },
    MoneylineBand { max_spread: 7.0, low: 160, high: 280 },
    MoneylineBand { max_spread: f64::INFINITY, low: 280, high: 500 },
];

impl MoneylineBand {
    pub fn for_spread(abs_spread: f64) -> MoneylineBand {
        let abs_spread = abs_spread.abs();
        BANDS
            .iter()
            .copied()
            .find(|band| abs_spread <= band.max_spread)
            .unwrap_or(BANDS[BANDS.len() - 1])
    }
}

/// American price for one side given its own signed spread.
///
/// Positive spread = underdog (plus money), negative = favorite.
/// Zero is pick'em and draws from -105/-110/-115.
pub fn moneyline_for<R: Rng + ?Sized>(side_spread: f64, rng: &mut R) -> i32 {
    if side_spread == 0.0 {
        return PICKEM_PRICES.choose(rng).copied().unwrap_or(-110);
    }
    let band = MoneylineBand::for_spread(side_spread);
    let magnitude = rng.gen_range(band.low..=band.high);
    if side_spread > 0.0 {
        magnitude
    } else {
        -magnitude
    }
}

/// (home, away) moneylines for a home-relative spread
pub fn moneylines<R: Rng + ?Sized>(spread: f64, rng: &mut R) -> (i32, i32) {
    let home = moneyline_for(spread, rng);
    let away = moneyline_for(-spread, rng);
    (home, away)
}

#[derive(Debug, Clone)]
pub struct MarketVariationGenerator {
    profiles: Vec<BookProfile>,
}

impl Default for MarketVariationGenerator {
    fn default() -> Self {
        Self {
            profiles: BOOK_PROFILES.to_vec(),
        }
    }
}

impl MarketVariationGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profiles(profiles: Vec<BookProfile>) -> Self {
        Self { profiles }
    }

    pub fn book_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.profiles.iter().map(|p| p.name)
    }

    /// One quote per book around a home-relative base line.
    ///
    /// Every spread and total is re-quantized after adjustment, so the
    /// output stays on half points even if the base line was moved.
    pub fn vary<R: Rng + ?Sized>(
        &self,
        base_spread: f64,
        base_total: f64,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Vec<SportsbookQuote> {
        self.profiles
            .iter()
            .map(|profile| {
                let spread = quantize_half(base_spread + profile.spread.draw(rng));
                let total = quantize_half(base_total + profile.total.draw(rng)).max(0.5);
                let (moneyline_home, moneyline_away) = moneylines(spread, rng);
                let vig = profile.vig + rng.gen_range(-VIG_JITTER..=VIG_JITTER);
                let total_vig = profile.vig + rng.gen_range(-VIG_JITTER..=VIG_JITTER);

                SportsbookQuote {
                    book_name: profile.name.to_string(),
                    spread,
                    total,
                    moneyline_home,
                    moneyline_away,
                    vig,
                    total_vig,
                    last_update: now,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::is_half_point;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_vary_covers_roster() {
        let gen = MarketVariationGenerator::new();
        let mut rng = StdRng::seed_from_u64(11);
        let quotes = gen.vary(-3.5, 47.5, now(), &mut rng);

        let names: Vec<_> = quotes.iter().map(|q| q.book_name.as_str()).collect();
        assert_eq!(names, SPORTSBOOKS);
        // DraftKings posts the market line
        assert_eq!(quotes[0].spread, -3.5);
        assert_eq!(quotes[0].total, 47.5);
    }

    #[test]
    fn test_adjustments_stay_in_range() {
        let gen = MarketVariationGenerator::new();
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..200 {
            for q in gen.vary(2.5, 44.0, now(), &mut rng) {
                assert!(is_half_point(q.spread));
                assert!(is_half_point(q.total));
                let limit = match q.book_name.as_str() {
                    "DraftKings" => 0.0,
                    "PointsBet" => 1.0,
                    _ => 0.5,
                };
                assert!((q.spread - 2.5).abs() <= limit, "{} spread {}", q.book_name, q.spread);

                let base_vig = if matches!(q.book_name.as_str(), "BetMGM" | "PointsBet") {
                    -105
                } else {
                    -110
                };
                assert!((q.vig - base_vig).abs() <= VIG_JITTER);
                assert!((q.total_vig - base_vig).abs() <= VIG_JITTER);
            }
        }
    }

    #[test]
    fn test_moved_base_is_requantized() {
        let gen = MarketVariationGenerator::new();
        let mut rng = StdRng::seed_from_u64(9);
        for q in gen.vary(-3.0 + 0.37, 45.2, now(), &mut rng) {
            assert!(is_half_point(q.spread));
            assert!(is_half_point(q.total));
        }
    }

    #[test]
    fn test_favorite_gets_minus_price() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let (home, away) = moneylines(-6.5, &mut rng);
            assert!((-280..=-160).contains(&home));
            assert!((160..=280).contains(&away));

            let (home, away) = moneylines(2.5, &mut rng);
            assert!((120..=160).contains(&home));
            assert!((-160..=-120).contains(&away));
        }
    }

    #[test]
    fn test_pickem_prices() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..50 {
            let (home, away) = moneylines(0.0, &mut rng);
            assert!(PICKEM_PRICES.contains(&home));
            assert!(PICKEM_PRICES.contains(&away));
        }
    }

    #[test]
    fn test_band_lookup_by_value() {
        assert_eq!(MoneylineBand::for_spread(2.0), MoneylineBand::for_spread(-3.0));
        assert_ne!(MoneylineBand::for_spread(3.0), MoneylineBand::for_spread(3.5));
        let widest = MoneylineBand::for_spread(21.0);
        assert_eq!(widest.max_spread, f64::INFINITY);
        assert_eq!((widest.low, widest.high), (280, 500));
    }

    #[test]
    fn test_moneyline_monotonic_in_spread() {
        // Every price a larger spread can produce is at least as long as
        // every price a smaller spread can produce on the same side
        let spreads: Vec<f64> = (1..=30).map(|i| f64::from(i) * 0.5).collect();
        for pair in spreads.windows(2) {
            let smaller = MoneylineBand::for_spread(pair[0]);
            let larger = MoneylineBand::for_spread(pair[1]);
            assert!(larger.low >= smaller.low);
            assert!(larger.low >= smaller.high || larger == smaller);
        }

        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..100 {
            let short = moneyline_for(-1.0, &mut rng);
            let long = moneyline_for(-10.0, &mut rng);
            assert!(long <= short);
            let dog_short = moneyline_for(3.0, &mut rng);
            let dog_long = moneyline_for(7.5, &mut rng);
            assert!(dog_long >= dog_short);
        }
    }

    #[test]
    fn test_band_edges() {
        assert_eq!(MoneylineBand::for_spread(1.0).high, 120);
        assert_eq!(MoneylineBand::for_spread(1.5).low, 120);
        assert_eq!(MoneylineBand::for_spread(7.0).high, 280);
        assert_eq!(MoneylineBand::for_spread(-14.0).high, 500);
    }
}
