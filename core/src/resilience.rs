//! Circuit breaker + retry wrapper for downstream dependency calls.
//!
//! Knows nothing about discovery; any component talking to an external
//! service can own one of these. Breaker state sits behind a mutex because
//! multiple scan tasks may share a single client instance.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use sondr_common::error::ScanError;

#[derive(Debug, Clone)]
pub struct ResilienceConfig {
    /// Consecutive exhausted calls before the breaker opens.
    pub max_failures: u32,
    /// Cooldown before an open breaker lets one call through again.
    pub recovery_time: Duration,
    /// Attempts per admitted call.
    pub max_retries: u32,
    /// Backoff between attempts grows as `base * 2^attempt`.
    pub backoff_base: Duration,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            max_failures: 3,
            recovery_time: Duration::from_secs(30),
            max_retries: 3,
            backoff_base: Duration::from_millis(100),
        }
    }
}

#[derive(Debug)]
struct BreakerState {
    failures: u32,
    last_failure: Option<Instant>,
    open: bool,
}

pub struct ResilientClient {
    config: ResilienceConfig,
    state: Mutex<BreakerState>,
}

impl ResilientClient {
    pub fn new(config: ResilienceConfig) -> Self {
        Self {
            config,
            state: Mutex::new(BreakerState {
                failures: 0,
                last_failure: None,
                open: false,
            }),
        }
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().expect("breaker state poisoned").open
    }

    /// Runs `op`, producing a fresh future per attempt.
    ///
    /// An open breaker inside its cooldown short-circuits with
    /// [`ScanError::CircuitOpen`] before any I/O. Once the cooldown elapses
    /// the failure count resets and exactly one call passes through
    /// (half-open). Success resets the counter; exhausting every retry
    /// records a failure and may open the breaker.
    pub async fn call<T, F, Fut>(&self, mut op: F) -> anyhow::Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        if !self.admit() {
            return Err(ScanError::CircuitOpen.into());
        }

        let mut last_err = None;
        for attempt in 0..self.config.max_retries.max(1) {
            match op().await {
                Ok(value) => {
                    self.record_success();
                    return Ok(value);
                }
                Err(e) => {
                    debug!(attempt, "downstream attempt failed: {e:#}");
                    last_err = Some(e);
                    if attempt + 1 < self.config.max_retries.max(1) {
                        let backoff = self.config.backoff_base * 2u32.pow(attempt);
                        tokio::time::sleep(backoff).await;
                    }
                }
            }
        }

        self.record_failure();
        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("downstream call failed")))
    }

    fn admit(&self) -> bool {
        let mut state = self.state.lock().expect("breaker state poisoned");
        if !state.open {
            return true;
        }
        let elapsed_enough = state
            .last_failure
            .is_some_and(|at| at.elapsed() > self.config.recovery_time);
        if elapsed_enough {
            // Half-open: reset and let this one call through.
            debug!("breaker cooldown elapsed, admitting trial call");
            state.open = false;
            state.failures = 0;
            return true;
        }
        false
    }

    fn record_success(&self) {
        let mut state = self.state.lock().expect("breaker state poisoned");
        state.failures = 0;
        state.open = false;
    }

    fn record_failure(&self) {
        let mut state = self.state.lock().expect("breaker state poisoned");
        state.failures += 1;
        state.last_failure = Some(Instant::now());
        if state.failures >= self.config.max_failures {
            if !state.open {
                warn!(failures = state.failures, "opening circuit breaker");
            }
            state.open = true;
        }
    }
}
