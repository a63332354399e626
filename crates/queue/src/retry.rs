//! Retry policy and dead letter handling.

#![allow(missing_docs)]

use std::time::Duration;

use ideaboard_common::config::QueueConfig;
use serde::Serialize;

/// Retry configuration with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts per job, the first run included.
    pub max_attempts: usize,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound for any delay.
    pub max_delay: Duration,
    /// Multiplier for exponential backoff.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
            multiplier: 2.0,
        }
    }
}

impl From<&QueueConfig> for RetryConfig {
    fn from(config: &QueueConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            ..Self::default()
        }
    }
}

impl RetryConfig {
    /// Retries the queue should grant after the first run.
    #[must_use]
    pub const fn retries(&self) -> usize {
        self.max_attempts.saturating_sub(1)
    }

    /// Delay before retrying after the given failed attempt (1-indexed).
    #[must_use]
    pub fn delay_after_attempt(&self, attempt: usize) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let delay_secs = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);

        if !delay_secs.is_finite() || delay_secs >= self.max_delay.as_secs_f64() {
            self.max_delay
        } else {
            Duration::from_secs_f64(delay_secs)
        }
    }

    /// Whether the given attempt (1-indexed) is the last one.
    #[must_use]
    pub const fn is_final_attempt(&self, attempt: usize) -> bool {
        attempt >= self.max_attempts
    }
}

/// A job that failed its final attempt.
#[derive(Debug, Clone, Serialize)]
pub struct DeadLetterEntry<T> {
    /// The failed job.
    pub job: T,
    /// Number of attempts made.
    pub attempts: usize,
    /// Last error message.
    pub last_error: String,
    /// Timestamp of last failure.
    pub failed_at: chrono::DateTime<chrono::Utc>,
}

impl<T: Serialize> DeadLetterEntry<T> {
    /// Create a new dead letter entry.
    pub fn new(job: T, attempts: usize, error: String) -> Self {
        Self {
            job,
            attempts,
            last_error: error,
            failed_at: chrono::Utc::now(),
        }
    }

    /// Write the entry to the error log for operators.
    pub fn record(&self, queue: &str) {
        let job = serde_json::to_string(&self.job).unwrap_or_else(|e| format!("<unserializable: {e}>"));
        tracing::error!(
            queue = queue,
            job = %job,
            attempts = self.attempts,
            last_error = %self.last_error,
            failed_at = %self.failed_at,
            "Job moved to dead letter log"
        );
    }
}
