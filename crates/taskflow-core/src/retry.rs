//! Pure retry-delay computation. No I/O, no clock reads — `now` is always
//! passed in by the caller so this stays deterministic and testable.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on a computed retry delay. The source implementation
/// (`original_source/domain/models/retry_policy.py`) has no cap and will
/// overflow `timedelta` on a long-enough exponential run; this spec picks
/// 30 days as a sane ceiling and documents it here rather than leaving it
/// an open question.
pub const MAX_RETRY_DELAY: Duration = Duration::days(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RetryStrategy {
    Fixed,
    Exponential,
}

/// Per-job retry behavior. The attempt budget itself (`max_attempts`) lives
/// on the `Job`, not here — this only knows how to space out retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub strategy: RetryStrategy,
    pub base_delay_seconds: u32,
}

impl RetryPolicy {
    pub fn new(strategy: RetryStrategy, base_delay_seconds: u32) -> Self {
        Self {
            strategy,
            base_delay_seconds,
        }
    }

    pub fn exponential(base_delay_seconds: u32) -> Self {
        Self::new(RetryStrategy::Exponential, base_delay_seconds)
    }

    pub fn fixed(base_delay_seconds: u32) -> Self {
        Self::new(RetryStrategy::Fixed, base_delay_seconds)
    }

    /// Returns the timestamp of the next attempt, or `None` if the retry
    /// budget is exhausted and the job should become DEAD.
    ///
    /// `attempts_after_increment` is the attempt counter *after* the
    /// failing attempt has been counted (the caller increments first).
    pub fn compute_next_run_at(
        &self,
        attempts_after_increment: u32,
        max_attempts: u32,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        if attempts_after_increment >= max_attempts {
            return None;
        }

        let delay = self.delay_for(attempts_after_increment);
        Some(now + delay)
    }

    /// The raw delay for a given (post-increment) attempt count, capped at
    /// [`MAX_RETRY_DELAY`]. Exposed separately so property tests can assert
    /// on the delay itself without needing a fixed `now`.
    pub fn delay_for(&self, attempts_after_increment: u32) -> Duration {
        let seconds: u64 = match self.strategy {
            RetryStrategy::Fixed => self.base_delay_seconds as u64,
            RetryStrategy::Exponential => {
                // base * 2^(n-1); n >= 1 always holds here since this is only
                // ever called with attempts_after_increment >= 1.
                let exponent = attempts_after_increment.saturating_sub(1);
                // Cap the exponent itself so the multiplication can't
                // overflow u64 before we even get to clamp against the cap.
                let capped_exponent = exponent.min(63);
                (self.base_delay_seconds as u64).saturating_mul(1u64 << capped_exponent)
            }
        };

        let capped_seconds = seconds.min(MAX_RETRY_DELAY.num_seconds() as u64);
        Duration::seconds(capped_seconds as i64)
    }
}
