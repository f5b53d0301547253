//! Retry policy and backoff calculations

use std::time::Duration;

/// Exponential backoff with jitter for retryable CDN failures
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    /// Fraction of the delay randomly added or removed
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

impl RetryPolicy {
    /// No retries at all
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (1-based)
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        // Precision loss acceptable for backoff calculations
        #[allow(clippy::cast_precision_loss)]
        let base_delay = self.initial_delay.as_millis().min(u128::from(u64::MAX)) as f64;
        #[allow(clippy::cast_precision_loss)]
        let max_delay = self.max_delay.as_millis().min(u128::from(u64::MAX)) as f64;

        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let delay = (base_delay * self.backoff_multiplier.powi(exponent)).min(max_delay);

        // Add jitter
        let jitter = delay * self.jitter_factor * (rand::random::<f64>() - 0.5);

        // max(0.0) ensures non-negative, round() handles fractional part
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let final_delay = (delay + jitter).max(0.0).round() as u64;

        Duration::from_millis(final_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_grows_and_caps() {
        let policy = RetryPolicy {
            max_retries: 5,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(1000),
            backoff_multiplier: 2.0,
            jitter_factor: 0.0,
        };
        assert_eq!(policy.backoff_delay(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_delay(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_delay(3), Duration::from_millis(400));
        assert_eq!(policy.backoff_delay(10), Duration::from_millis(1000));
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let policy = RetryPolicy {
            jitter_factor: 0.5,
            ..RetryPolicy::new(3, Duration::from_millis(1000))
        };
        for _ in 0..100 {
            let delay = policy.backoff_delay(1).as_millis();
            assert!((750..=1250).contains(&delay));
        }
    }
}
