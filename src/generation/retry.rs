//! Bounded retry with exponential backoff.

use std::future::Future;
use std::time::Duration;

/// How often and how patiently to repeat a failing operation.
///
/// The policy holds no state between runs; one value can drive any number of
/// independent operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included
    pub max_attempts: u32,
    /// Delay after the first failure
    pub base_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

/// The error of the last attempt, once the policy has given up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exhausted<E> {
    pub error: E,
    pub attempts: u32,
}

impl RetryPolicy {
    /// `max_attempts` attempts with a one second base delay; zero is read as one.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }

    pub fn with_delays(mut self, base_delay: Duration, max_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self.max_delay = max_delay;
        self
    }

    /// Delay before the attempt following failed attempt number `attempt`
    /// (1-based): the base delay doubled per earlier failure, capped.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt.saturating_sub(1));
        factor
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    /// Run `operation` until it succeeds, fails permanently, or the attempt
    /// budget is spent.
    ///
    /// `is_transient` decides which errors are worth another attempt; any
    /// other error ends the run at once.
    pub async fn run<T, E, F, Fut, P>(&self, mut operation: F, is_transient: P) -> Result<T, Exhausted<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) if is_transient(&error) && attempt < max_attempts => {
                    let delay = self.backoff(attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "attempt failed, retrying: {}",
                        error
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                },
                Err(error) => {
                    return Err(Exhausted {
                        error,
                        attempts: attempt,
                    });
                },
            }
        }
    }
}
