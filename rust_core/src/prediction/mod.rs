//! Seeded prediction and consensus engine.
//!
//! Every random draw comes from a generator seeded by hashing the matchup
//! plus a model key, so the same matchup always yields the same output.

pub mod engine;
pub mod phrases;
pub mod reasoning;
pub mod seed;

pub use engine::{ModelSpec, PredictionEngine, CONSENSUS_MODEL_NAME, MODELS};
pub use reasoning::{compose, reasoning_bullets, ReasoningCategory, ReasoningInput};
pub use seed::{matchup_rng, matchup_seed};
