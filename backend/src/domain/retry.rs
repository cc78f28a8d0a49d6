//! Bounded retry with exponential backoff for idempotent record-store reads.
//!
//! Only errors that report themselves as transient are retried. Writes never
//! go through this policy.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::warn;

use super::ports::{PromptRepositoryError, SessionRepositoryError};

/// Async sleep abstraction so tests can observe backoff without waiting.
#[async_trait]
pub trait RetrySleeper: Send + Sync {
    /// Suspend execution for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Jitter applied on top of the exponential base delay.
pub trait BackoffJitter: Send + Sync {
    /// Return the delay to wait before attempt number `attempt` (1-based).
    fn jittered_delay(&self, base: Duration, attempt: u32) -> Duration;
}

/// Errors that may be retried.
pub trait TransientError {
    /// Whether a retry could succeed.
    fn is_transient(&self) -> bool;
}

impl TransientError for PromptRepositoryError {
    fn is_transient(&self) -> bool {
        PromptRepositoryError::is_transient(self)
    }
}

impl TransientError for SessionRepositoryError {
    fn is_transient(&self) -> bool {
        SessionRepositoryError::is_transient(self)
    }
}

/// Tokio-based sleeper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl RetrySleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Adds up to a quarter of the base delay at random.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomJitter;

impl BackoffJitter for RandomJitter {
    fn jittered_delay(&self, base: Duration, _attempt: u32) -> Duration {
        let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
        let max_extra = base_ms / 4;
        let extra = rand::thread_rng().gen_range(0..=max_extra);
        Duration::from_millis(base_ms.saturating_add(extra))
    }
}

/// Retry policy for idempotent reads.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use promptdeck::domain::ReadRetryPolicy;
///
/// let policy = ReadRetryPolicy::default().with_max_attempts(5);
/// assert_eq!(policy.max_attempts(), 5);
/// assert_eq!(policy.initial_delay(), Duration::from_millis(50));
/// ```
#[derive(Clone)]
pub struct ReadRetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    max_delay: Duration,
    sleeper: Arc<dyn RetrySleeper>,
    jitter: Arc<dyn BackoffJitter>,
}

impl Default for ReadRetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::from_millis(500),
            sleeper: Arc::new(TokioSleeper),
            jitter: Arc::new(RandomJitter),
        }
    }
}

impl ReadRetryPolicy {
    /// Total attempts including the first call. Clamped to at least one.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Set the first backoff delay and the cap applied to later ones.
    pub fn with_delays(mut self, initial_delay: Duration, max_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self.max_delay = max_delay.max(initial_delay);
        self
    }

    /// Replace the sleeper and jitter strategies.
    pub fn with_runtime(
        mut self,
        sleeper: Arc<dyn RetrySleeper>,
        jitter: Arc<dyn BackoffJitter>,
    ) -> Self {
        self.sleeper = sleeper;
        self.jitter = jitter;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    fn base_delay(&self, attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }

    /// Run `operation` until it succeeds, fails permanently, or the attempt
    /// budget is spent.
    pub async fn run<T, E, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, E>
    where
        E: TransientError + Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 1;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(error) if error.is_transient() && attempt < self.max_attempts => {
                    let delay = self
                        .jitter
                        .jittered_delay(self.base_delay(attempt), attempt)
                        .min(self.max_delay);
                    warn!(
                        operation,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %error,
                        "transient record store failure; retrying"
                    );
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}
