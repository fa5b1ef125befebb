// File: ./src/client/retry.rs
//! Bounded retry with exponential backoff.
//!
//! Connection failures and 429 responses are retried for every method since
//! the server has not acted on the request. Server errors and other transport
//! failures are retried for GET only: a POST that failed half-way may already
//! have created the card.
use crate::error::ApiError;
use http::Method;
use std::time::Duration;

const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one.
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    pub fn is_retryable(method: &Method, err: &ApiError) -> bool {
        match err {
            ApiError::Connect(_) | ApiError::RateLimited { .. } => true,
            ApiError::Server { .. } | ApiError::Transport(_) => *method == Method::GET,
            _ => false,
        }
    }

    /// Delay before retry number `attempt` (0-based), or `None` to give up.
    pub fn next_delay(&self, method: &Method, err: &ApiError, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_retries || !Self::is_retryable(method, err) {
            return None;
        }
        if let ApiError::RateLimited {
            retry_after: Some(wait),
        } = err
        {
            return Some((*wait).min(MAX_RETRY_AFTER));
        }
        Some(self.backoff(attempt))
    }

    /// `base * 2^attempt` plus up to 25% jitter.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = self.base_delay.saturating_mul(2u32.saturating_pow(attempt.min(16)));
        let jitter_ms = (exp.as_millis() as u64) / 4;
        let jitter = if jitter_ms > 0 {
            Duration::from_millis(fastrand::u64(0..=jitter_ms))
        } else {
            Duration::ZERO
        };
        exp + jitter
    }
}

/// Parses a `Retry-After` header given in seconds.
pub fn parse_retry_after(headers: &http::HeaderMap) -> Option<Duration> {
    headers
        .get(http::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
