//! Requeue policy for failed population requests
//!
//! The worker never sleeps on a failure: it either pushes the request straight
//! back onto the tail of its queue or schedules that push after a backoff
//! delay. This module only decides whether and when.

use std::time::Duration;

/// Configuration for requeue behavior
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of requeues per request (`None` = retry forever)
    pub max_retries: Option<u32>,

    /// Delay before the first requeue (zero = requeue immediately)
    pub initial_backoff: Duration,

    /// Maximum backoff duration
    pub max_backoff: Duration,

    /// Backoff multiplier (typically 2.0 for exponential backoff)
    pub multiplier: f64,

    /// Add random jitter to prevent thundering herd
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::forever()
    }
}

impl RetryPolicy {
    /// Requeue immediately, without limit
    pub fn forever() -> Self {
        Self {
            max_retries: None,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::from_secs(30),
            multiplier: 2.0,
            jitter: false,
        }
    }

    /// Whether a request that has already been retried `retries` times may go again
    pub fn allows_retry(&self, retries: u32) -> bool {
        match self.max_retries {
            Some(max) => retries < max,
            None => true,
        }
    }

    /// Delay before requeue number `retry` (0-based)
    ///
    /// Always within `[0, max_backoff]` before jitter, whatever the multiplier.
    pub fn backoff_duration(&self, retry: u32) -> Duration {
        if self.initial_backoff.is_zero() {
            return Duration::ZERO;
        }

        let exponent = retry.min(i32::MAX as u32) as i32;
        let base = self.initial_backoff.as_secs_f64() * self.multiplier.powi(exponent);
        // f64::max discards NaN, so a non-finite product collapses to zero
        let capped = base.max(0.0).min(self.max_backoff.as_secs_f64());

        let final_duration = if self.jitter {
            // Add 0-25% jitter
            let jitter_factor = 1.0 + (rand_jitter() * 0.25);
            capped * jitter_factor
        } else {
            capped
        };

        Duration::try_from_secs_f64(final_duration).unwrap_or(self.max_backoff)
    }
}

/// Simple pseudo-random jitter (0.0 to 1.0) without external dependency
fn rand_jitter() -> f64 {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    (nanos % 1000) as f64 / 1000.0
}
