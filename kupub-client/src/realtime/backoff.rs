use std::time::Duration;

use crate::config::RealtimeConfig;

/// Reconnect delay schedule.
///
/// The n-th consecutive failure waits `initial · multiplierⁿ⁻¹`, capped at
/// `max`. Once `max_attempts` consecutive failures have been recorded the
/// schedule is exhausted.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    multiplier: u32,
    max_attempts: u32,
    failures: u32,
}

impl Backoff {
    pub fn new(config: &RealtimeConfig) -> Self {
        Self {
            initial: config.initial_delay,
            max: config.max_delay,
            multiplier: config.multiplier.max(1),
            max_attempts: config.max_attempts,
            failures: 0,
        }
    }

    /// Record a failure. Returns the delay before the next attempt, or
    /// `None` when no attempt should follow.
    pub fn next_delay(&mut self) -> Option<Duration> {
        self.failures = self.failures.saturating_add(1);
        if self.max_attempts > 0 && self.failures >= self.max_attempts {
            return None;
        }
        Some(self.delay_for(self.failures))
    }

    /// Delay after the `failure`-th consecutive failure (1-based)
    pub fn delay_for(&self, failure: u32) -> Duration {
        let exponent = failure.saturating_sub(1);
        let factor = self.multiplier.checked_pow(exponent).unwrap_or(u32::MAX);
        self.initial.saturating_mul(factor).min(self.max)
    }

    /// Consecutive failures so far
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// A session reached the live state
    pub fn reset(&mut self) {
        self.failures = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max_attempts: u32) -> RealtimeConfig {
        RealtimeConfig::default()
            .with_initial_delay(Duration::from_secs(5))
            .with_max_delay(Duration::from_secs(60))
            .with_multiplier(2)
            .with_max_attempts(max_attempts)
    }

    #[test]
    fn test_delays_double_until_cap() {
        let mut backoff = Backoff::new(&config(0));
        let delays: Vec<u64> = (0..6)
            .map(|_| backoff.next_delay().unwrap().as_secs())
            .collect();
        assert_eq!(delays, [5, 10, 20, 40, 60, 60]);
    }

    #[test]
    fn test_exhausted_after_max_attempts() {
        let mut backoff = Backoff::new(&config(3));
        assert_eq!(backoff.next_delay(), Some(Duration::from_secs(5)));
        assert_eq!(backoff.next_delay(), Some(Duration::from_secs(10)));
        assert_eq!(backoff.next_delay(), None);
        assert_eq!(backoff.failures(), 3);
    }

    #[test]
    fn test_reset_restarts_schedule() {
        let mut backoff = Backoff::new(&config(3));
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.next_delay(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_huge_exponent_saturates_to_cap() {
        let backoff = Backoff::new(&config(0));
        assert_eq!(backoff.delay_for(200), Duration::from_secs(60));
    }
}
