//! One refresh cycle: acquire odds, predict every game, summarize.

use crate::market::PipelineSummary;
use crate::models::{GameOddsSet, PredictionSet};
use crate::orchestrator::{AcquisitionContext, OrchestratorConfig, SourceOrchestrator, TraceEntry};
use crate::prediction::PredictionEngine;
use crate::ratings::RatingTable;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Result of a single pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub odds: Vec<GameOddsSet>,
    pub predictions: PredictionSet,
    pub summary: PipelineSummary,
    pub trace: Vec<TraceEntry>,
}

#[derive(Debug)]
pub struct OddsPipeline {
    orchestrator: SourceOrchestrator,
    engine: PredictionEngine,
}

impl OddsPipeline {
    pub fn new(orchestrator: SourceOrchestrator, engine: PredictionEngine) -> Self {
        Self {
            orchestrator,
            engine,
        }
    }

    /// Standard source chain plus the default model roster
    pub fn standard(config: OrchestratorConfig, ratings: Arc<RatingTable>) -> Self {
        Self::new(
            SourceOrchestrator::standard(config, ratings),
            PredictionEngine::new(),
        )
    }

    pub fn orchestrator(&self) -> &SourceOrchestrator {
        &self.orchestrator
    }

    /// Predictions cover exactly the games that were acquired.
    pub async fn run(&self, ctx: &mut AcquisitionContext) -> PipelineOutput {
        let odds = self.orchestrator.acquire(ctx).await;
        let predictions = self.engine.predict_all(odds.iter().map(|set| &set.game));
        let summary = PipelineSummary::compute(&odds, &predictions, ctx.last_source, Utc::now());

        info!(
            "Pipeline cycle {}: {} games from {} across {} books",
            ctx.cycle_id,
            summary.games_tracked,
            summary
                .source
                .map(|s| s.as_str())
                .unwrap_or("nothing"),
            summary.sportsbooks
        );

        PipelineOutput {
            odds,
            predictions,
            summary,
            trace: ctx.trace.clone(),
        }
    }
}
