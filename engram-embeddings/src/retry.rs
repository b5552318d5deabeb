use crate::error::EmbeddingError;
use crate::provider::{embed_checked, EmbeddingProvider};
use log::{debug, warn};
use rand::Rng;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Retry behavior for embedding calls.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts per call, including the first.
    pub max_attempts: u32,

    /// Base backoff delay; doubled per attempt.
    pub base_delay: Duration,

    /// Ceiling on the backoff delay.
    pub max_delay: Duration,

    /// Multiplicative jitter: each delay is scaled by a random factor in
    /// `[1 - jitter, 1 + jitter]`.
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            jitter: 0.25,
        }
    }
}

impl RetryConfig {
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = self
            .base_delay
            .saturating_mul(1u32 << attempt.min(16))
            .min(self.max_delay);
        let factor = rand::rng().random_range(1.0 - self.jitter..=1.0 + self.jitter);
        exp.mul_f64(factor.max(0.0))
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone)]
pub struct BreakerConfig {
    /// Consecutive failures that open the breaker.
    pub failure_threshold: u32,

    /// How long the breaker stays open once tripped.
    pub cooldown: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cooldown: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Default)]
struct BreakerState {
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

/// Failure-rate guard shared by every embedding call in an indexing
/// session. Owned by the orchestrator and passed by reference; state
/// transitions are serialized behind an async mutex, and the open-window
/// wait suspends rather than spinning.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: BreakerConfig,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            state: Mutex::new(BreakerState::default()),
        }
    }

    /// Clear all breaker state. Intended for test isolation and for reuse
    /// of a session object across runs.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        *state = BreakerState::default();
    }

    /// If the breaker is open, sleep out the remaining cooldown window
    /// before allowing the call to proceed. The sleep happens outside the
    /// state lock.
    async fn wait_if_open(&self) {
        let remaining = {
            let state = self.state.lock().await;
            state
                .opened_at
                .map(|at| self.config.cooldown.saturating_sub(at.elapsed()))
        };

        if let Some(remaining) = remaining {
            if !remaining.is_zero() {
                debug!("circuit breaker open, waiting {remaining:?}");
                tokio::time::sleep(remaining).await;
            }
            let mut state = self.state.lock().await;
            state.opened_at = None;
        }
    }

    async fn record_success(&self) {
        let mut state = self.state.lock().await;
        state.consecutive_failures = 0;
        state.opened_at = None;
    }

    async fn record_failure(&self) {
        let mut state = self.state.lock().await;
        state.consecutive_failures += 1;
        if state.consecutive_failures >= self.config.failure_threshold && state.opened_at.is_none()
        {
            warn!(
                "circuit breaker opened after {} consecutive failures",
                state.consecutive_failures
            );
            state.opened_at = Some(Instant::now());
        }
    }

    #[cfg(test)]
    async fn is_open(&self) -> bool {
        self.state.lock().await.opened_at.is_some()
    }
}

/// Embed `text` through the retry policy and the session's circuit
/// breaker. Exhausting all attempts returns the final error; the caller
/// treats it as a per-unit failure rather than aborting the pipeline.
pub async fn embed_with_retry(
    provider: &dyn EmbeddingProvider,
    breaker: &CircuitBreaker,
    retry: &RetryConfig,
    text: &str,
) -> Result<Vec<f32>, EmbeddingError> {
    let mut last_err = None;

    for attempt in 0..retry.max_attempts {
        breaker.wait_if_open().await;

        match embed_checked(provider, text).await {
            Ok(vector) => {
                breaker.record_success().await;
                return Ok(vector);
            }
            Err(err) => {
                breaker.record_failure().await;

                // Configuration faults will not heal on retry.
                if matches!(err, EmbeddingError::DimensionMismatch { .. }) {
                    return Err(err);
                }

                debug!(
                    "embedding attempt {}/{} failed: {err}",
                    attempt + 1,
                    retry.max_attempts
                );
                last_err = Some(err);

                if attempt + 1 < retry.max_attempts {
                    tokio::time::sleep(retry.delay_for_attempt(attempt)).await;
                }
            }
        }
    }

    Err(last_err.unwrap_or_else(|| EmbeddingError::Generation("no attempts made".into())))
}
