use std::time::Duration;

/// How the log stream reconnects after it drops.
///
/// `max_attempts` counts consecutive failures; a connection that gets through
/// resets the count. Delays double from `base_delay` up to `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl ReconnectPolicy {
    /// Never reconnect: the first drop gives up.
    pub fn disabled() -> Self {
        Self {
            max_attempts: 0,
            ..Self::default()
        }
    }

    pub fn should_retry(&self, failures: u32) -> bool {
        failures <= self.max_attempts
    }

    /// Delay before reconnect attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let multiplier = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(multiplier).min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_doubles_and_caps() {
        let policy = ReconnectPolicy {
            max_attempts: 10,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(3),
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for(2), Duration::from_secs(1));
        assert_eq!(policy.delay_for(3), Duration::from_secs(2));
        assert_eq!(policy.delay_for(4), Duration::from_secs(3));
        assert_eq!(policy.delay_for(60), Duration::from_secs(3));
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let policy = ReconnectPolicy::default();
        assert!(policy.should_retry(1));
        assert!(policy.should_retry(5));
        assert!(!policy.should_retry(6));
        assert!(!ReconnectPolicy::disabled().should_retry(1));
    }
}
