use std::thread;
use std::time::Duration;

/// Sleep seam so the retry schedule is testable without real waits.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Linear backoff policy for remote fetches.
///
/// The default matches the long-running batch posture: never give up, wait
/// `attempt * 60s` between tries. Tests and impatient callers can cap the
/// attempt count or shrink the unit.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: Option<u32>,
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: None,
            backoff_unit: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Delay before the retry following failure number `attempt` (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff_unit * attempt
    }

    /// True once `attempt` failures have used up the allowed tries.
    pub fn is_exhausted(&self, attempt: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempt >= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_grows_linearly() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(1), Duration::from_secs(60));
        assert_eq!(policy.delay(2), Duration::from_secs(120));
        assert_eq!(policy.delay(5), Duration::from_secs(300));
    }

    #[test]
    fn unbounded_never_exhausts() {
        let policy = RetryPolicy::default();
        assert!(!policy.is_exhausted(1_000_000));
    }

    #[test]
    fn bounded_exhausts_at_max() {
        let policy = RetryPolicy {
            max_attempts: Some(3),
            backoff_unit: Duration::from_millis(1),
        };
        assert!(!policy.is_exhausted(2));
        assert!(policy.is_exhausted(3));
    }
}
