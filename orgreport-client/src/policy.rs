//! Retry policy
//!
//! Pure decisions about whether a failed request may be resubmitted. The
//! transport asks; the policy never sleeps or performs I/O itself.

use std::time::Duration;

use async_trait::async_trait;

/// Retry decisions for [`crate::RateLimitedTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed for network failures and 5xx responses
    pub max_transient_retries: u32,
    /// Fixed delay between transient retries
    pub transient_spacing: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_TRANSIENT_RETRIES: u32 = 3;
    pub const DEFAULT_TRANSIENT_SPACING: Duration = Duration::from_secs(180);

    pub fn new(max_transient_retries: u32, transient_spacing: Duration) -> Self {
        Self {
            max_transient_retries,
            transient_spacing,
        }
    }

    /// A request is resubmitted after a rate limit only the first time
    pub fn should_retry_rate_limit(&self, attempts: u32) -> bool {
        attempts == 0
    }

    /// Abuse-flagged traffic is never resubmitted
    pub fn should_retry_abuse(&self) -> bool {
        false
    }

    pub fn should_retry_transient(&self, attempts: u32) -> bool {
        attempts < self.max_transient_retries
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_TRANSIENT_RETRIES,
            Self::DEFAULT_TRANSIENT_SPACING,
        )
    }
}

/// Suspends the calling task
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
