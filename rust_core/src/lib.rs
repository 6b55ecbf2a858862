//! Qwerk Core - NFL odds acquisition, market synthesis and seeded predictions.
//!
//! This crate provides:
//! - Prioritized odds sources (live session, odds API, ESPN, scrape) with a
//!   rating-based market simulation as the terminal fallback
//! - Odds synthesis from team power/offense/defense ratings
//! - Per-sportsbook market variation
//! - Seeded, reproducible per-model predictions and consensus reasoning
//! - Per-source circuit breakers
//! - Line shopping helpers and a one-call refresh pipeline

pub mod circuit_breaker;
pub mod market;
pub mod models;
pub mod orchestrator;
pub mod pipeline;
pub mod prediction;
pub mod ratings;
pub mod slate;
pub mod sources;
pub mod synth;
pub mod teams;

pub use circuit_breaker::{BreakerConfig, CircuitState, SourceCircuitBreaker};
pub use market::{best_lines, BestLine, BestLines, PipelineSummary};
pub use models::*;
pub use orchestrator::{
    AcquisitionContext, OrchestratorConfig, SourceOrchestrator, TraceEntry, TraceLevel,
};
pub use pipeline::{OddsPipeline, PipelineOutput};
pub use prediction::PredictionEngine;
pub use ratings::RatingTable;
pub use slate::{Slate, SlateError};
pub use sources::{OddsSource, SourceError};
pub use synth::{MarketVariationGenerator, OddsSynthesizer};
