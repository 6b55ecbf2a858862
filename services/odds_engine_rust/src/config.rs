use anyhow::{anyhow, Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use qwerk_core::orchestrator::OrchestratorConfig;
use qwerk_core::sources::espn::DEFAULT_SCOREBOARD_URL;
use qwerk_core::sources::live::DEFAULT_TARGET_URL;
use qwerk_core::sources::odds_api::{DEFAULT_BASE_URL, DEFAULT_SPORT_KEY};
use qwerk_core::sources::scrape::DEFAULT_SCRAPE_URL;
use qwerk_core::sources::{EspnConfig, LiveSessionConfig, OddsApiConfig, ScrapeConfig};

#[derive(Debug, Clone)]
pub struct Config {
    pub odds_api_key: Option<String>,
    pub odds_api_base_url: String,
    pub odds_sport_key: String,
    pub odds_regions: String,
    pub odds_format: String,

    pub espn_scoreboard_url: String,
    pub scrape_url: String,

    pub live_render_endpoint: Option<String>,
    pub live_target_url: String,

    pub source_timeout: Duration,
    pub scrape_timeout: Duration,

    pub rating_table_path: Option<PathBuf>,
    pub simulation_seed: Option<u64>,
    pub strict_slate: bool,

    pub refresh_interval: Duration,
    pub run_once: bool,
    pub output_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let source_timeout = Duration::from_secs(
            parse_u64(get("SOURCE_TIMEOUT_SECS"), "SOURCE_TIMEOUT_SECS", 10)?,
        );
        let scrape_timeout = Duration::from_secs(
            parse_u64(get("SCRAPE_TIMEOUT_SECS"), "SCRAPE_TIMEOUT_SECS", 15)?,
        );

        let refresh_secs = parse_u64(get("REFRESH_INTERVAL_SECS"), "REFRESH_INTERVAL_SECS", 60)?;
        if refresh_secs == 0 {
            return Err(anyhow!("REFRESH_INTERVAL_SECS must be at least 1"));
        }

        let simulation_seed = get("SIMULATION_SEED")
            .map(|raw| {
                raw.parse::<u64>()
                    .with_context(|| format!("Invalid SIMULATION_SEED: {raw} (expected integer)"))
            })
            .transpose()?;

        Ok(Self {
            odds_api_key: get("ODDS_API_KEY"),
            odds_api_base_url: get_or("ODDS_API_BASE_URL", DEFAULT_BASE_URL),
            odds_sport_key: get_or("ODDS_SPORT_KEY", DEFAULT_SPORT_KEY),
            odds_regions: get_or("ODDS_REGIONS", "us"),
            odds_format: get_or("ODDS_FORMAT", "american"),
            espn_scoreboard_url: get_or("ESPN_SCOREBOARD_URL", DEFAULT_SCOREBOARD_URL),
            scrape_url: get_or("SCRAPE_URL", DEFAULT_SCRAPE_URL),
            live_render_endpoint: get("LIVE_RENDER_ENDPOINT"),
            live_target_url: get_or("LIVE_TARGET_URL", DEFAULT_TARGET_URL),
            source_timeout,
            scrape_timeout,
            rating_table_path: get("RATING_TABLE_PATH").map(PathBuf::from),
            simulation_seed,
            strict_slate: parse_bool(get("STRICT_SLATE"), false),
            refresh_interval: Duration::from_secs(refresh_secs),
            run_once: parse_bool(get("RUN_ONCE"), false),
            output_path: get("OUTPUT_PATH").map(PathBuf::from),
        })
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            live: LiveSessionConfig {
                render_endpoint: self.live_render_endpoint.clone(),
                target_url: self.live_target_url.clone(),
                timeout: self.source_timeout,
            },
            odds_api: OddsApiConfig {
                api_key: self.odds_api_key.clone(),
                base_url: self.odds_api_base_url.clone(),
                sport_key: self.odds_sport_key.clone(),
                regions: self.odds_regions.clone(),
                odds_format: self.odds_format.clone(),
                timeout: self.source_timeout,
            },
            espn: EspnConfig {
                scoreboard_url: self.espn_scoreboard_url.clone(),
                timeout: self.source_timeout,
            },
            scrape: ScrapeConfig {
                url: self.scrape_url.clone(),
                timeout: self.scrape_timeout,
            },
            simulation_seed: self.simulation_seed,
        }
    }
}

fn parse_bool(raw: Option<String>, default: bool) -> bool {
    raw.map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "y" | "on"))
        .unwrap_or(default)
}

fn parse_u64(raw: Option<String>, key: &str, default: u64) -> Result<u64> {
    match raw {
        Some(v) => v
            .parse::<u64>()
            .with_context(|| format!("Invalid {key}: {v} (expected integer)")),
        None => Ok(default),
    }
}
