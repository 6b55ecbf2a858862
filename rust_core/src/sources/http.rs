//! HTTP plumbing shared by the network adapters.

use super::error::SourceError;
use crate::circuit_breaker::{CircuitState, SourceCircuitBreaker};
use crate::models::GameOddsSet;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; qwerk-odds/0.1)";

/// Client with the request timeout and user agent applied. A builder
/// failure is logged and falls back to reqwest defaults; the orchestrator's
/// per-source deadline still bounds every fetch.
pub fn build_client(timeout: Duration) -> Client {
    match Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            warn!(
                "HTTP client builder failed ({}), using defaults without timeout or user agent",
                e
            );
            Client::new()
        }
    }
}

/// Fail fast when the breaker blocks the source
pub fn ensure_available(breaker: &SourceCircuitBreaker) -> Result<(), SourceError> {
    if breaker.is_available() {
        return Ok(());
    }
    let name = breaker.name().to_string();
    match breaker.state() {
        CircuitState::Disabled => Err(SourceError::Disabled(
            breaker.status().disabled_reason.unwrap_or(name),
        )),
        _ => Err(SourceError::CircuitOpen(name)),
    }
}

/// Feed a fetch outcome back into the breaker
pub fn record_outcome(
    breaker: &SourceCircuitBreaker,
    outcome: &Result<Vec<GameOddsSet>, SourceError>,
) {
    match outcome {
        Ok(_) => breaker.record_success(),
        Err(SourceError::AuthFailure(msg)) => breaker.disable(msg.clone()),
        Err(SourceError::RateLimited { retry_after_secs }) => {
            breaker.open_for(Duration::from_secs(*retry_after_secs))
        }
        Err(e) if e.counts_as_failure() => breaker.record_failure(),
        Err(_) => {}
    }
}

/// Send and return the body of a 2xx response; anything else is mapped
/// onto the error taxonomy.
pub async fn send_text(request: RequestBuilder) -> Result<String, SourceError> {
    let response = request.send().await?;
    let status = response.status();

    if !status.is_success() {
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.unwrap_or_default();
        return Err(SourceError::from_status(status, retry_after.as_deref(), &body));
    }

    let body = response.text().await?;
    debug!("Received {} bytes ({})", body.len(), status);
    Ok(body)
}

pub async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, SourceError> {
    let body = send_text(request).await?;
    Ok(serde_json::from_str(&body)?)
}
