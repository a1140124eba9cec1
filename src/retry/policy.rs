//! Fixed-delay retry policy for catalog calls.
//!
//! Transient failures (5xx, throttling, connection errors, failed token
//! exchanges) are retried after a constant wait. Authentication and
//! configuration failures are returned immediately.

use std::time::Duration;
use tokio::time::sleep;

use crate::config::ProviderConfig;
use crate::error::CatalogError;

/// Retry policy configuration
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts, the first call included
    pub max_attempts: u32,
    /// Wait between attempts
    pub delay: Duration,
    /// Custom retry condition function
    pub retry_condition: Option<fn(&CatalogError) -> bool>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            delay: Duration::from_secs(3),
            retry_condition: None,
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy
    pub fn new() -> Self {
        Self::default()
    }

    /// `retries` retries (so `retries + 1` attempts) separated by `delay`.
    pub const fn fixed(retries: u32, delay: Duration) -> Self {
        Self {
            max_attempts: retries.saturating_add(1),
            delay,
            retry_condition: None,
        }
    }

    /// Policy described by `retry` / `retry_wait` in the configuration.
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::fixed(
            config.retry_count,
            Duration::from_secs(config.retry_wait_seconds),
        )
    }

    /// Set maximum attempts
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set custom retry condition
    pub fn with_retry_condition(mut self, condition: fn(&CatalogError) -> bool) -> Self {
        self.retry_condition = Some(condition);
        self
    }

    /// Check if an error should be retried
    pub fn should_retry(&self, error: &CatalogError) -> bool {
        if let Some(condition) = self.retry_condition {
            condition(error)
        } else {
            error.is_retryable()
        }
    }
}

/// Retry executor that handles the actual retry logic
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    /// Create a new retry executor
    pub const fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute a function with retry logic
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, CatalogError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, CatalogError>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(error) => {
                    if !self.policy.should_retry(&error) || attempt == max_attempts {
                        return Err(error);
                    }

                    tracing::warn!(
                        target: "catalog_auth::retry",
                        attempt,
                        max_attempts,
                        delay_ms = self.policy.delay.as_millis() as u64,
                        error = %error,
                        "transient failure, retrying"
                    );
                    sleep(self.policy.delay).await;
                }
            }
        }

        Err(CatalogError::InternalError(
            "Retry executor failed without error".to_string(),
        ))
    }
}
