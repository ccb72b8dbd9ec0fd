//! Rate-limit aware transport decorator
//!
//! Wraps any [`Transport`] and applies a [`RetryPolicy`] to each logical
//! request:
//! - transient failures (network, 5xx) are resubmitted after a fixed delay,
//!   up to the policy's bound
//! - a rate-limited request waits the server-advised delay and is resubmitted
//!   once; a second rate limit for the same request is returned
//! - abuse detection is logged and returned immediately
//!
//! The transient and rate-limit counters are independent.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

use crate::error::{ClientError, Result};
use crate::policy::{RetryPolicy, Sleeper, TokioSleeper};
use crate::transport::{ApiRequest, ApiResponse, Transport, check_response};

/// [`Transport`] decorator applying retry and throttling rules
pub struct RateLimitedTransport<T> {
    inner: T,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl<T: Transport> RateLimitedTransport<T> {
    /// Wraps `inner` with the default policy
    pub fn new(inner: T) -> Self {
        Self::with_policy(inner, RetryPolicy::default())
    }

    pub fn with_policy(inner: T, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replaces the timer used for backoff waits
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }
}

#[async_trait]
impl<T: Transport> Transport for RateLimitedTransport<T> {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let mut transient_retries = 0;
        let mut rate_limit_retries = 0;

        loop {
            let outcome = self
                .inner
                .execute(request)
                .await
                .and_then(|response| check_response(response, Utc::now()));

            let err = match outcome {
                Ok(response) => return Ok(response),
                Err(e) => e,
            };

            match &err {
                ClientError::RateLimited { retry_after } => {
                    let retry_after = *retry_after;
                    warn!(
                        method = %request.method,
                        url = %request.url,
                        "Request quota exhausted"
                    );
                    if !self.policy.should_retry_rate_limit(rate_limit_retries) {
                        return Err(err);
                    }
                    rate_limit_retries += 1;
                    info!("Retrying after {} seconds!", retry_after.as_secs());
                    self.sleeper.sleep(retry_after).await;
                }
                ClientError::AbuseDetected { retry_after } => {
                    let retry_after = *retry_after;
                    warn!(
                        method = %request.method,
                        url = %request.url,
                        retry_after_secs = retry_after.as_secs(),
                        "Abuse detected"
                    );
                    if !self.policy.should_retry_abuse() {
                        return Err(err);
                    }
                    self.sleeper.sleep(retry_after).await;
                }
                e if e.is_transient() => {
                    if !self.policy.should_retry_transient(transient_retries) {
                        warn!(
                            method = %request.method,
                            url = %request.url,
                            "Giving up after {} retries: {}",
                            transient_retries,
                            e
                        );
                        return Err(err);
                    }
                    transient_retries += 1;
                    warn!(
                        method = %request.method,
                        url = %request.url,
                        "Transient failure (retry {}/{}): {}",
                        transient_retries,
                        self.policy.max_transient_retries,
                        e
                    );
                    self.sleeper.sleep(self.policy.transient_spacing).await;
                }
                _ => return Err(err),
            }
        }
    }
}
