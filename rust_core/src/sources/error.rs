//! Errors at the source-adapter boundary.
//!
//! Adapters return these to the orchestrator, which logs them and moves on
//! to the next source. None of them escape the acquisition chain.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SourceError {
    /// Connection failure or non-auth HTTP error
    #[error("transient failure: {0}")]
    Transient(String),

    #[error("timed out after {0}s")]
    Timeout(u64),

    /// 401; the source stays disabled for the rest of the run
    #[error("authentication failed: {0}")]
    AuthFailure(String),

    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Payload unusable as a whole
    #[error("parse error: {0}")]
    Parse(String),

    /// Ran fine but found no usable games
    #[error("no usable games")]
    EmptyResult,

    #[error("not configured: {0}")]
    NotConfigured(String),

    #[error("circuit open for {0}")]
    CircuitOpen(String),

    #[error("disabled: {0}")]
    Disabled(String),
}

/// Default back-off when a 429 carries no usable Retry-After
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

impl SourceError {
    pub fn rate_limited(retry_after_secs: u64) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    /// Map a non-200 response to the taxonomy
    pub fn from_status(status: StatusCode, retry_after: Option<&str>, body: &str) -> Self {
        let detail = if body.is_empty() {
            status.to_string()
        } else {
            format!("{} - {}", status, body.chars().take(200).collect::<String>())
        };

        match status.as_u16() {
            401 => Self::AuthFailure(detail),
            429 => Self::rate_limited(
                retry_after
                    .and_then(|v| v.trim().parse::<u64>().ok())
                    .unwrap_or(DEFAULT_RETRY_AFTER_SECS),
            ),
            _ => Self::Transient(detail),
        }
    }

    /// Whether the breaker should count this as a failure
    #[must_use]
    pub fn counts_as_failure(&self) -> bool {
        matches!(
            self,
            Self::Transient(_) | Self::Timeout(_) | Self::Parse(_) | Self::EmptyResult
        )
    }

    /// Whether the source was skipped without doing any work
    #[must_use]
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            Self::NotConfigured(_) | Self::CircuitOpen(_) | Self::Disabled(_)
        )
    }

    /// Short label for trace lines and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transient(_) => "transient",
            Self::Timeout(_) => "timeout",
            Self::AuthFailure(_) => "auth_failure",
            Self::RateLimited { .. } => "rate_limited",
            Self::Parse(_) => "parse",
            Self::EmptyResult => "empty",
            Self::NotConfigured(_) => "not_configured",
            Self::CircuitOpen(_) => "circuit_open",
            Self::Disabled(_) => "disabled",
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Transient(format!("request timeout: {err}"))
        } else if err.is_connect() {
            Self::Transient(format!("connection failed: {err}"))
        } else if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Transient(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
