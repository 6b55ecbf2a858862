//! Circuit breaker for odds sources.
//!
//! This module provides:
//! - Consecutive failure tracking per source
//! - Open / half-open / closed recovery cycle
//! - Explicit back-off windows (rate limits)
//! - Permanent disable for the rest of the run (auth failures)

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

/// States for a source circuit breaker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation - requests are allowed
    Closed,
    /// Circuit is open - requests are blocked until the window passes
    Open,
    /// Testing if the source has recovered
    HalfOpen,
    /// Blocked for the rest of the process run
    Disabled,
}

#[derive(Debug, Clone)]
pub struct BreakerConfig {
    /// Number of consecutive failures to trip the circuit
    pub failure_threshold: u32,
    /// Duration to wait before attempting recovery
    pub recovery_timeout: Duration,
    /// Number of successful calls in half-open state to close circuit
    pub success_threshold: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            recovery_timeout: Duration::from_secs(60),
            success_threshold: 1,
        }
    }
}

/// Snapshot for logging
#[derive(Debug, Clone, PartialEq)]
pub struct BreakerStatus {
    pub name: String,
    pub state: CircuitState,
    pub failure_count: u32,
    pub disabled_reason: Option<String>,
}

/// Circuit breaker owned by one network source.
///
/// - Opens after `failure_threshold` consecutive failures
/// - Half-opens once the recovery window has elapsed
/// - Closes after `success_threshold` half-open successes
/// - `disable` blocks the source until `reset`; used for auth failures,
///   which retrying will not fix
///
/// # Example
/// ```ignore
/// let breaker = SourceCircuitBreaker::with_defaults("odds_api");
///
/// if !breaker.is_available() {
///     return Err(SourceError::CircuitOpen("odds_api".into()));
/// }
///
/// match fetch().await {
///     Ok(games) => breaker.record_success(),
///     Err(SourceError::AuthFailure(msg)) => breaker.disable(msg),
///     Err(_) => breaker.record_failure(),
/// }
/// ```
pub struct SourceCircuitBreaker {
    name: String,
    config: BreakerConfig,
    state: RwLock<CircuitState>,
    failure_count: AtomicU32,
    success_count: AtomicU32,
    /// Requests blocked until this instant while Open
    open_until: RwLock<Option<Instant>>,
    disabled_reason: RwLock<Option<String>>,
}

impl SourceCircuitBreaker {
    pub fn new(name: &str, config: BreakerConfig) -> Self {
        Self {
            name: name.to_string(),
            config,
            state: RwLock::new(CircuitState::Closed),
            failure_count: AtomicU32::new(0),
            success_count: AtomicU32::new(0),
            open_until: RwLock::new(None),
            disabled_reason: RwLock::new(None),
        }
    }

    pub fn with_defaults(name: &str) -> Self {
        Self::new(name, BreakerConfig::default())
    }

    /// Check if the breaker allows a request; may move Open -> HalfOpen
    pub fn is_available(&self) -> bool {
        let mut state = self.state.write();

        match *state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Disabled => false,
            CircuitState::Open => {
                let should_try = self
                    .open_until
                    .read()
                    .map(|until| Instant::now() >= until)
                    .unwrap_or(true);

                if should_try {
                    *state = CircuitState::HalfOpen;
                    self.success_count.store(0, Ordering::SeqCst);
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&self) {
        self.failure_count.store(0, Ordering::SeqCst);

        let mut state = self.state.write();
        match *state {
            CircuitState::HalfOpen => {
                let successes = self.success_count.fetch_add(1, Ordering::SeqCst) + 1;
                if successes >= self.config.success_threshold {
                    *state = CircuitState::Closed;
                    tracing::info!(
                        "Source breaker '{}' closed after {} successful calls",
                        self.name,
                        successes
                    );
                }
            }
            CircuitState::Disabled => {}
            _ => {
                *state = CircuitState::Closed;
            }
        }
    }

    pub fn record_failure(&self) {
        let failures = self.failure_count.fetch_add(1, Ordering::SeqCst) + 1;

        let mut state = self.state.write();
        match *state {
            CircuitState::Closed => {
                if failures >= self.config.failure_threshold {
                    *state = CircuitState::Open;
                    *self.open_until.write() = Some(Instant::now() + self.config.recovery_timeout);
                    tracing::warn!(
                        "Source breaker '{}' OPENED after {} consecutive failures",
                        self.name,
                        failures
                    );
                }
            }
            CircuitState::HalfOpen => {
                *state = CircuitState::Open;
                *self.open_until.write() = Some(Instant::now() + self.config.recovery_timeout);
                tracing::warn!("Source breaker '{}' re-OPENED during half-open test", self.name);
            }
            CircuitState::Open | CircuitState::Disabled => {}
        }
    }

    /// Open immediately for `window` (e.g. a 429 Retry-After)
    pub fn open_for(&self, window: Duration) {
        let mut state = self.state.write();
        if *state == CircuitState::Disabled {
            return;
        }
        *state = CircuitState::Open;
        *self.open_until.write() = Some(Instant::now() + window);
        tracing::warn!("Source breaker '{}' backing off for {:?}", self.name, window);
    }

    /// Block the source until `reset`
    pub fn disable(&self, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::error!("Source breaker '{}' DISABLED: {}", self.name, reason);
        *self.state.write() = CircuitState::Disabled;
        *self.disabled_reason.write() = Some(reason);
    }

    pub fn state(&self) -> CircuitState {
        *self.state.read()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count.load(Ordering::SeqCst)
    }

    pub fn is_disabled(&self) -> bool {
        self.state() == CircuitState::Disabled
    }

    pub fn status(&self) -> BreakerStatus {
        BreakerStatus {
            name: self.name.clone(),
            state: self.state(),
            failure_count: self.failure_count(),
            disabled_reason: self.disabled_reason.read().clone(),
        }
    }

    /// Back to closed, clearing a disable
    pub fn reset(&self) {
        let mut state = self.state.write();
        *state = CircuitState::Closed;
        self.failure_count.store(0, Ordering::SeqCst);
        self.success_count.store(0, Ordering::SeqCst);
        *self.open_until.write() = None;
        *self.disabled_reason.write() = None;
    }
}

impl std::fmt::Debug for SourceCircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceCircuitBreaker")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("failure_count", &self.failure_count())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
