use std::time::Duration;

use reqwest::StatusCode;

/// How often and how patiently an upstream call is repeated.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    /// Linear backoff unit: the n-th retry waits `n * backoff_step`.
    pub backoff_step: Duration,
    pub retry_on: fn(StatusCode) -> bool,
}

fn rate_limited(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step: Duration::from_secs(1),
            retry_on: rate_limited,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_step: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_step,
            ..Self::default()
        }
    }

    pub fn is_retryable(&self, status: StatusCode) -> bool {
        (self.retry_on)(status)
    }

    /// Sleep before the attempt following `attempt` (1-based), or `None` once
    /// the budget is spent.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        Some(self.backoff_step * attempt)
    }
}
