//! Bounded retry for backend calls.
//!
//! Backend calls that are safe to repeat go through [`with_retry`] instead
//! of looping by hand. The [`RetryPolicy`] fixes the attempt budget and the
//! delay between attempts; the caller decides which errors are worth
//! another attempt.
//!
//! # Usage
//!
//! ```ignore
//! use realty_map_client::retry::{self, RetryPolicy};
//!
//! // Three immediate attempts, retrying on any failure
//! let names = retry::with_retry(&RetryPolicy::immediate(3), "get_locations", || {
//!     api.locations()
//! }, |_| true).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;

use crate::ClientError;

/// Largest shift applied when doubling the exponential delay.
const MAX_DOUBLINGS: u32 = 16;

/// Delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Backoff {
    /// Retry immediately.
    None,
    /// Wait `base`, then `2 × base`, `4 × base`, … capped at `max`.
    Exponential {
        /// Delay before the second attempt.
        #[serde(with = "millis")]
        base: Duration,
        /// Upper bound on any single delay.
        #[serde(with = "millis")]
        max: Duration,
    },
}

/// How many times to attempt an operation and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero behaves like one.
    pub max_attempts: u32,
    /// Delay schedule.
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// `max_attempts` attempts with no delay in between.
    #[must_use]
    pub const fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::None,
        }
    }

    /// `max_attempts` attempts with exponential backoff.
    #[must_use]
    pub const fn exponential(max_attempts: u32, base: Duration, max: Duration) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Exponential { base, max },
        }
    }

    /// The delay to wait after failed attempt number `attempt` (1-based),
    /// or `None` to retry immediately.
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        match self.backoff {
            Backoff::None => None,
            Backoff::Exponential { base, max } => {
                let doublings = attempt.saturating_sub(1).min(MAX_DOUBLINGS);
                Some(base.saturating_mul(1u32 << doublings).min(max))
            }
        }
    }

    const fn attempts(&self) -> u32 {
        if self.max_attempts == 0 {
            1
        } else {
            self.max_attempts
        }
    }
}

/// Runs `operation` until it succeeds, fails with an error `should_retry`
/// rejects, or the policy's attempt budget is spent.
///
/// The `operation` closure is called once per attempt so every attempt is a
/// fresh request.
///
/// # Errors
///
/// Returns the first non-retryable error unchanged, or
/// [`ClientError::RetriesExhausted`] wrapping the last error once every
/// attempt has failed.
pub async fn with_retry<T, F, Fut, P>(
    policy: &RetryPolicy,
    operation: &str,
    mut call: F,
    should_retry: P,
) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
    P: Fn(&ClientError) -> bool,
{
    let max_attempts = policy.attempts();
    let mut attempt = 0;

    loop {
        attempt += 1;

        match call().await {
            Ok(value) => {
                if attempt > 1 {
                    log::info!("{operation} succeeded on attempt {attempt}/{max_attempts}");
                }
                return Ok(value);
            }
            Err(e) if !should_retry(&e) => return Err(e),
            Err(e) => {
                if attempt >= max_attempts {
                    log::error!("{operation} failed after {attempt} attempts, giving up: {e}");
                    return Err(ClientError::RetriesExhausted {
                        operation: operation.to_string(),
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }

                log::warn!(
                    "{operation} failed (attempts left: {}): {e}",
                    max_attempts - attempt
                );

                if let Some(delay) = policy.delay_after(attempt) {
                    log::debug!("  retrying {operation} in {delay:?}...");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
