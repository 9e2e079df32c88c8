//! Backoff policy and retry classification for transient failures.
//!
//! [`Backoff`] computes how long to wait before the next attempt and performs that
//! wait while honoring cancellation. [`RetryPredicate`] decides whether a failed
//! attempt is worth repeating at all.

use crate::Error;
use rand::Rng;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default base delay for exponential backoff.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Default upper bound (exclusive) of the random jitter added to every delay.
pub const DEFAULT_MAX_JITTER: Duration = Duration::from_millis(500);

/// Exponential backoff with additive jitter.
///
/// Without a server hint, attempt `a` (0-based) waits `base_delay * 2^a` plus a
/// uniformly distributed jitter in `[0, max_jitter)`. A positive server hint (in
/// seconds) replaces the exponential part.
///
/// # Examples
///
/// ```
/// use leadsdb::retry::Backoff;
/// use std::time::Duration;
///
/// let backoff = Backoff {
///     base_delay: Duration::from_millis(100),
///     max_jitter: Duration::ZERO,
/// };
///
/// assert_eq!(backoff.delay(0, None), Duration::from_millis(100));
/// assert_eq!(backoff.delay(3, None), Duration::from_millis(800));
/// assert_eq!(backoff.delay(3, Some(2)), Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    /// Delay before the first retry; doubled on every further attempt.
    pub base_delay: Duration,
    /// Exclusive upper bound of the random jitter. Zero disables jitter.
    pub max_jitter: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            base_delay: DEFAULT_BASE_DELAY,
            max_jitter: DEFAULT_MAX_JITTER,
        }
    }
}

impl Backoff {
    /// Returns the delay to wait after the failed attempt `attempt` (0-based).
    ///
    /// `retry_after` is the server requested delay in seconds; `None` or `Some(0)`
    /// falls back to exponential growth.
    pub fn delay(&self, attempt: u32, retry_after: Option<u64>) -> Duration {
        let base = match retry_after {
            Some(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                let multiplier = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
                self.base_delay.saturating_mul(multiplier)
            }
        };

        base.saturating_add(self.jitter())
    }

    fn jitter(&self) -> Duration {
        let max = self.max_jitter.as_nanos();
        if max == 0 {
            return Duration::ZERO;
        }
        let max = u64::try_from(max).unwrap_or(u64::MAX);
        Duration::from_nanos(rand::thread_rng().gen_range(0..max))
    }

    /// Sleeps for [`Backoff::delay`], returning early if `cancel` fires.
    ///
    /// Returns `true` if the full delay elapsed and `false` if it was cut short.
    pub async fn wait(
        &self,
        attempt: u32,
        retry_after: Option<u64>,
        cancel: &CancellationToken,
    ) -> bool {
        let delay = self.delay(attempt, retry_after);

        tracing::info!(
            delay_ms = delay.as_millis(),
            attempt = attempt,
            retry_after = retry_after,
            "Retrying request after delay"
        );

        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }
}

/// Trait for determining whether a failed attempt should be retried.
///
/// The default client predicate is [`RetryOnTransient`]. Implement this trait to
/// narrow or widen that set.
///
/// # Examples
///
/// ```
/// use leadsdb::{Error, RetryPredicate};
///
/// /// Never retry rate limited requests, only server failures.
/// struct ServerFailuresOnly;
///
/// impl RetryPredicate for ServerFailuresOnly {
///     fn should_retry(&self, error: &Error) -> bool {
///         error.is_retryable() && error.status().map_or(true, |s| s.is_server_error())
///     }
/// }
/// ```
pub trait RetryPredicate: Send + Sync {
    /// Returns `true` if the request that produced `error` should be attempted again.
    fn should_retry(&self, error: &Error) -> bool;
}

/// Retries transport failures and HTTP 429, 500, 502, 503 and 504.
///
/// Uses [`Error::is_retryable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryOnTransient;

impl RetryPredicate for RetryOnTransient {
    fn should_retry(&self, error: &Error) -> bool {
        error.is_retryable()
    }
}
