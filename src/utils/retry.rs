//! Retry policy with exponential backoff for blocked or failed page fetches.

use std::time::Duration;

/// Why a page request is being retried
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryCause {
    /// Network-level failure (connect, timeout, reset)
    Transport(String),
    /// HTTP 429 or 503
    RateLimited(u16),
    /// A 200 response that is really a CAPTCHA / unusual-traffic page
    BlockPage,
}

impl RetryCause {
    /// Whether this cause points at automated-traffic detection
    pub fn is_block(&self) -> bool {
        !matches!(self, RetryCause::Transport(_))
    }

    /// Classify an HTTP status; `None` means the status is not retried
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            429 | 503 => Some(RetryCause::RateLimited(status)),
            _ => None,
        }
    }
}

impl std::fmt::Display for RetryCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetryCause::Transport(msg) => write!(f, "request failed: {}", msg),
            RetryCause::RateLimited(status) => {
                write!(f, "HTTP {} suggests rate limiting or a temporary block", status)
            }
            RetryCause::BlockPage => write!(f, "page looks like a CAPTCHA / unusual traffic block"),
        }
    }
}

/// Geometric backoff: `base × 2^(attempt-1)`, up to `max_retries` retries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub max_retries: u32,
}

impl BackoffPolicy {
    pub fn new(base: Duration, max_retries: u32) -> Self {
        Self { base, max_retries }
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base.saturating_mul(1u32 << exponent)
    }

    /// True once `attempts` failures exceed the retry ceiling
    pub fn exhausted(&self, attempts: u32) -> bool {
        attempts > self.max_retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_doubles() {
        let policy = BackoffPolicy::new(Duration::from_secs(10), 5);
        assert_eq!(policy.delay_for(1), Duration::from_secs(10));
        assert_eq!(policy.delay_for(2), Duration::from_secs(20));
        assert_eq!(policy.delay_for(3), Duration::from_secs(40));
        assert_eq!(policy.delay_for(4), Duration::from_secs(80));
    }

    #[test]
    fn test_exhausted_after_ceiling() {
        let policy = BackoffPolicy::new(Duration::from_secs(1), 2);
        assert!(!policy.exhausted(1));
        assert!(!policy.exhausted(2));
        assert!(policy.exhausted(3));

        let no_retries = BackoffPolicy::new(Duration::from_secs(1), 0);
        assert!(no_retries.exhausted(1));
    }

    #[test]
    fn test_retry_cause_from_status() {
        assert_eq!(RetryCause::from_status(429), Some(RetryCause::RateLimited(429)));
        assert_eq!(RetryCause::from_status(503), Some(RetryCause::RateLimited(503)));
        assert_eq!(RetryCause::from_status(404), None);
        assert_eq!(RetryCause::from_status(500), None);
    }

    #[test]
    fn test_is_block() {
        assert!(RetryCause::BlockPage.is_block());
        assert!(RetryCause::RateLimited(429).is_block());
        assert!(!RetryCause::Transport("reset".to_string()).is_block());
    }

    #[test]
    fn test_huge_attempt_does_not_overflow() {
        let policy = BackoffPolicy::new(Duration::from_secs(10), 100);
        assert!(policy.delay_for(90) >= policy.delay_for(31));
    }
}
