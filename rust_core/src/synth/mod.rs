//! Rating-driven market synthesis.
//!
//! - `synthesizer`: ratings -> canonical spread/total for a game
//! - `variation`: canonical line -> per-sportsbook quotes

pub mod synthesizer;
pub mod variation;

pub use synthesizer::{is_half_point, quantize_half, OddsSynthesizer, SynthesizedLine};
pub use variation::{moneyline_for, BookProfile, MarketVariationGenerator, MoneylineBand, SPORTSBOOKS};
