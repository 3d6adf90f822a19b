//! Survey configuration.
//!
//! Controls how collections are scanned: sampled vs. full, concurrency
//! across collections, and the retry policy for transient database errors.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How documents are drawn from a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// Draw up to `n` documents pseudo-randomly (server-side `$sample`,
    /// without replacement). Collections smaller than `n` contribute all of
    /// their documents. Rare fields may be missed; that is the accepted
    /// trade-off for cost.
    Sample(u32),
    /// Visit every document exactly once. Cost scales with collection size.
    Full,
}

impl Default for ScanMode {
    fn default() -> Self {
        ScanMode::Sample(100)
    }
}

/// Bounded-backoff retry policy for transient database errors.
///
/// Permission errors are never retried regardless of this policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first (1 = no retries).
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each subsequent one.
    pub base_delay: Duration,
    /// Cap on the computed delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Computes the backoff delay for a retry (1-based), capped at
    /// `max_delay`. Jitter is added by the retry helper, not here.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.base_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

/// Configuration for one survey run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyConfig {
    /// Scan mode applied to every collection.
    pub mode: ScanMode,
    /// Whether `system.*` collections are surveyed.
    pub include_system: bool,
    /// How many collections are scanned concurrently.
    pub concurrency: usize,
    /// Retry policy for transient errors.
    pub retry: RetryPolicy,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            mode: ScanMode::default(),
            include_system: false,
            concurrency: 4,
            retry: RetryPolicy::default(),
        }
    }
}

impl SurveyConfig {
    /// Creates a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the scan mode.
    pub fn with_mode(mut self, mode: ScanMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builder method to include system collections.
    pub fn with_include_system(mut self, include: bool) -> Self {
        self.include_system = include;
        self
    }

    /// Builder method to set collection-scan concurrency.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Builder method to set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Validates configuration values.
    ///
    /// # Errors
    /// Returns error if any value is out of range.
    pub fn validate(&self) -> crate::Result<()> {
        if let ScanMode::Sample(0) = self.mode {
            return Err(crate::error::SurveyError::configuration(
                "sample size must be greater than 0",
            ));
        }
        if self.concurrency == 0 {
            return Err(crate::error::SurveyError::configuration(
                "concurrency must be greater than 0",
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(crate::error::SurveyError::configuration(
                "retry max_attempts must be greater than 0",
            ));
        }
        Ok(())
    }
}
