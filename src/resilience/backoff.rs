//! Exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;

use crate::config::RetryConfig;

/// Backoff schedule for retried control-plane queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base_ms: u64,
    max_ms: u64,
}

impl Backoff {
    pub fn new(base_ms: u64, max_ms: u64) -> Self {
        Self { base_ms, max_ms }
    }

    /// Delay to wait before retry number `attempt` (1-based).
    ///
    /// Attempt 0 is the initial call and never waits.
    pub fn delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let exponential_base = 2u64.saturating_pow(attempt - 1);
        let capped_delay = self.base_ms.saturating_mul(exponential_base).min(self.max_ms);

        // Jitter: 0 to 10% of the delay, so concurrent invocations spread out.
        let jitter_range = capped_delay / 10;
        let jitter = if jitter_range > 0 {
            rand::thread_rng().gen_range(0..jitter_range)
        } else {
            0
        };

        Duration::from_millis(capped_delay + jitter)
    }
}

impl From<&RetryConfig> for Backoff {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.base_delay_ms, config.max_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_grows_until_cap() {
        let backoff = Backoff::new(100, 1000);

        assert_eq!(backoff.delay(0), Duration::ZERO);

        let first = backoff.delay(1).as_millis();
        assert!((100..110).contains(&first));

        let second = backoff.delay(2).as_millis();
        assert!((200..220).contains(&second));

        let capped = backoff.delay(10).as_millis();
        assert!((1000..1100).contains(&capped));
    }

    #[test]
    fn test_zero_base_never_waits() {
        let backoff = Backoff::new(0, 1000);
        assert_eq!(backoff.delay(5), Duration::ZERO);
    }
}
