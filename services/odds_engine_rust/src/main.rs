mod config;

use crate::config::Config;
use anyhow::{Context, Result};
use dotenv::dotenv;
use qwerk_core::orchestrator::AcquisitionContext;
use qwerk_core::pipeline::{OddsPipeline, PipelineOutput};
use qwerk_core::ratings::RatingTable;
use qwerk_core::slate::Slate;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn write_output(config: &Config, output: &PipelineOutput) -> Result<()> {
    let json = serde_json::to_string_pretty(output).context("Failed to serialize pipeline output")?;

    match &config.output_path {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            info!("Wrote {} games to {}", output.odds.len(), path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

async fn run_cycle(pipeline: &OddsPipeline, ctx: &mut AcquisitionContext, config: &Config) {
    let output = pipeline.run(ctx).await;
    if let Err(e) = write_output(config, &output) {
        error!("{:#}", e);
    }
}

/// Run `cycle` every `period` until `shutdown` resolves. The shutdown future
/// is polled across cycles, so a signal during a cycle cancels it.
/// Returns the number of completed cycles.
async fn refresh_loop<S, C, Fut>(period: Duration, shutdown: S, mut cycle: C) -> u64
where
    S: Future,
    C: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let mut completed = 0;
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = async {
                interval.tick().await;
                cycle().await;
            } => completed += 1,
        }
    }
    completed
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal"),
        Err(err) => error!("Unable to listen for shutdown signal: {}", err),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting Odds Engine...");

    let config = Config::from_env().context("Invalid configuration")?;

    let ratings = match &config.rating_table_path {
        Some(path) => RatingTable::load(path)?,
        None => RatingTable::nfl(),
    };
    info!("Rating table: {} teams", ratings.len());

    if config.odds_api_key.is_none() {
        warn!("ODDS_API_KEY not set, The Odds API source disabled");
    }

    let pipeline = OddsPipeline::standard(config.orchestrator_config(), Arc::new(ratings));
    info!("Source chain: {}", pipeline.orchestrator().describe());

    let slate = Slate::week_one().strict(config.strict_slate);
    let mut ctx = AcquisitionContext::new(slate);

    if config.run_once {
        run_cycle(&pipeline, &mut ctx, &config).await;
        return Ok(());
    }

    info!(
        "Refresh loop started (interval: {}s)",
        config.refresh_interval.as_secs()
    );
    let period = config.refresh_interval;
    let pipeline = Arc::new(pipeline);
    let config = Arc::new(config);
    let ctx = Arc::new(Mutex::new(ctx));

    let completed = refresh_loop(period, shutdown_signal(), || {
        let pipeline = pipeline.clone();
        let config = config.clone();
        let ctx = ctx.clone();
        async move {
            let mut ctx = ctx.lock().await;
            run_cycle(&pipeline, &mut ctx, &config).await;
        }
    })
    .await;

    info!("Odds Engine stopped after {} cycles", completed);
    Ok(())
}
