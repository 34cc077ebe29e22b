//! Timeout, retry and circuit breaking around a [`ModelClient`].
//!
//! Only transient failures (network trouble, timeouts, HTTP 408/429/5xx) are
//! retried or counted against a breaker. Request-validation failures surface
//! immediately.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::time::{sleep, timeout};
use tracing::{info, warn};

use crate::config::{CircuitBreakerConfig, ModelRole, ResilienceConfig, RetryConfig};
use crate::error::ProviderError;

use super::{CompletionRequest, ModelClient};

/// Exponential backoff limited to transient errors.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            multiplier: config.multiplier,
        }
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = self.multiplier.max(1.0).powi(retry.saturating_sub(1) as i32);
        let millis = (self.initial_delay.as_millis() as f64 * factor) as u64;
        Duration::from_millis(millis).min(self.max_delay)
    }

    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut + Send,
        Fut: std::future::Future<Output = Result<T, ProviderError>> + Send,
        T: Send,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        "Retrying provider call (attempt {}/{}) after {:?}: {}",
                        attempt + 1,
                        self.max_attempts,
                        delay,
                        e
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    /// One probe call is allowed through.
    HalfOpen,
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    failure_threshold: u32,
    open_for: Duration,
    inner: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, open_for: Duration) -> Self {
        Self {
            failure_threshold: failure_threshold.max(1),
            open_for,
            inner: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                opened_at: None,
            }),
        }
    }

    pub fn from_config(config: &CircuitBreakerConfig) -> Self {
        Self::new(
            config.failure_threshold,
            Duration::from_secs(config.open_secs),
        )
    }

    /// Whether a call may proceed. An open circuit whose cool-down elapsed
    /// moves to half-open and admits one probe. A probe that has not reported
    /// back within another cool-down (its future was dropped, or it is still
    /// hanging) no longer blocks: the next caller becomes the probe.
    pub fn try_acquire(&self) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let cooled = inner
            .opened_at
            .map(|at| at.elapsed() >= self.open_for)
            .unwrap_or(true);
        match inner.state {
            CircuitState::Closed => true,
            CircuitState::HalfOpen if cooled => {
                inner.opened_at = Some(Instant::now());
                info!("Previous probe never completed, allowing another probe call");
                true
            }
            CircuitState::HalfOpen => false,
            CircuitState::Open if cooled => {
                inner.state = CircuitState::HalfOpen;
                inner.opened_at = Some(Instant::now());
                info!("Circuit breaker half-open, allowing probe call");
                true
            }
            CircuitState::Open => false,
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.state != CircuitState::Closed {
            info!("Circuit breaker closed");
        }
        inner.state = CircuitState::Closed;
        inner.consecutive_failures = 0;
        inner.opened_at = None;
    }

    pub fn record_failure(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.consecutive_failures += 1;
        let trip = inner.state == CircuitState::HalfOpen
            || inner.consecutive_failures >= self.failure_threshold;
        if trip {
            if inner.state != CircuitState::Open {
                warn!(
                    "Circuit breaker opened after {} consecutive failures",
                    inner.consecutive_failures
                );
            }
            inner.state = CircuitState::Open;
            inner.opened_at = Some(Instant::now());
        }
    }

    pub fn state(&self) -> CircuitState {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .state
    }
}

/// Adds a per-call timeout, bounded retry and one breaker per role to any
/// [`ModelClient`].
pub struct ResilientClient<C> {
    inner: C,
    call_timeout: Duration,
    retry: RetryPolicy,
    breakers: HashMap<ModelRole, CircuitBreaker>,
}

impl<C: ModelClient> ResilientClient<C> {
    pub fn new(inner: C, config: &ResilienceConfig) -> Self {
        let breakers = ModelRole::ALL
            .iter()
            .map(|role| (*role, CircuitBreaker::from_config(&config.circuit_breaker)))
            .collect();

        Self {
            inner,
            call_timeout: Duration::from_secs(config.timeout_secs),
            retry: RetryPolicy::from_config(&config.retry),
            breakers,
        }
    }

    pub fn with_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn breaker(&self, role: ModelRole) -> Option<&CircuitBreaker> {
        self.breakers.get(&role)
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    async fn attempt(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let role = request.role;
        let breaker = self.breakers.get(&role);

        if let Some(breaker) = breaker {
            if !breaker.try_acquire() {
                return Err(ProviderError::CircuitOpen { role });
            }
        }

        let result = match timeout(self.call_timeout, self.inner.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout {
                role,
                seconds: self.call_timeout.as_secs(),
            }),
        };

        if let Some(breaker) = breaker {
            match &result {
                Err(e) if e.is_transient() => breaker.record_failure(),
                // Any answer, even a rejected request, proves the provider is up.
                _ => breaker.record_success(),
            }
        }

        result
    }
}

#[async_trait]
impl<C: ModelClient> ModelClient for ResilientClient<C> {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        self.retry.execute(|| self.attempt(request)).await
    }
}
