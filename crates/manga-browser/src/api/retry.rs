//! Retry policy for rate-limited (HTTP 429) responses.
//!
//! The default keeps retrying after a flat one second for as long as the API
//! answers 429. Configuration can cap the attempts and grow the delay
//! exponentially instead.

use shared::config::{BackoffKind, RetryConfig};
use std::time::Duration;

/// How a fetch cycle reacts to HTTP 429
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before the first retry
    pub delay: Duration,
    /// Maximum attempts per cycle, including the first (None = unlimited)
    pub max_attempts: Option<u32>,
    /// Backoff growth
    pub backoff: BackoffKind,
    /// Cap for exponential growth
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            delay: Duration::from_millis(config.delay_ms),
            max_attempts: config.max_attempts,
            backoff: config.backoff,
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }
}

impl RetryPolicy {
    /// Flat delay, unlimited attempts
    pub fn fixed(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
            backoff: BackoffKind::Fixed,
            max_delay: delay,
        }
    }

    /// Delay to wait after `attempt` (1-based) was rate limited, or `None`
    /// when no further attempt is allowed.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if let Some(max) = self.max_attempts {
            if attempt >= max {
                return None;
            }
        }

        let delay = match self.backoff {
            BackoffKind::Fixed => self.delay,
            BackoffKind::Exponential => {
                let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
                self.delay.saturating_mul(factor).min(self.max_delay)
            }
        };

        Some(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_flat_one_second_forever() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Some(Duration::from_secs(1)));
        assert_eq!(policy.delay_after(50), Some(Duration::from_secs(1)));
        assert_eq!(policy.delay_after(10_000), Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_attempt_cap() {
        let policy = RetryPolicy {
            max_attempts: Some(3),
            ..RetryPolicy::fixed(Duration::from_millis(500))
        };
        assert_eq!(policy.delay_after(1), Some(Duration::from_millis(500)));
        assert_eq!(policy.delay_after(2), Some(Duration::from_millis(500)));
        assert_eq!(policy.delay_after(3), None);
    }

    #[test]
    fn test_exponential_growth_is_capped() {
        let policy = RetryPolicy {
            delay: Duration::from_secs(1),
            max_attempts: None,
            backoff: BackoffKind::Exponential,
            max_delay: Duration::from_secs(5),
        };
        assert_eq!(policy.delay_after(1), Some(Duration::from_secs(1)));
        assert_eq!(policy.delay_after(2), Some(Duration::from_secs(2)));
        assert_eq!(policy.delay_after(3), Some(Duration::from_secs(4)));
        assert_eq!(policy.delay_after(4), Some(Duration::from_secs(5)));
        assert_eq!(policy.delay_after(64), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_from_config() {
        let config = RetryConfig {
            delay_ms: 250,
            max_attempts: Some(4),
            backoff: BackoffKind::Exponential,
            max_delay_ms: 2000,
        };
        let policy = RetryPolicy::from(&config);
        assert_eq!(policy.delay, Duration::from_millis(250));
        assert_eq!(policy.max_attempts, Some(4));
        assert_eq!(policy.max_delay, Duration::from_secs(2));
    }
}
