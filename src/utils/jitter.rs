//! Randomized waits between requests.
//!
//! Page and profile pacing must not be a fixed interval: each wait is drawn
//! uniformly from `[mean - spread, mean + spread]`.

use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JitteredDelay {
    mean: Duration,
    spread: Duration,
}

impl JitteredDelay {
    pub const ZERO: JitteredDelay = JitteredDelay {
        mean: Duration::ZERO,
        spread: Duration::ZERO,
    };

    /// `spread` is clamped to `mean` so a wait is never negative
    pub fn new(mean: Duration, spread: Duration) -> Self {
        Self {
            mean,
            spread: spread.min(mean),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.mean.is_zero()
    }

    /// Draw one wait
    pub fn sample(&self) -> Duration {
        if self.spread.is_zero() {
            return self.mean;
        }
        let low = self.mean - self.spread;
        let width = self.spread.as_secs_f64() * 2.0;
        low + Duration::from_secs_f64(fastrand::f64() * width)
    }

    /// Sleep for one sampled wait and return how long it was
    pub async fn wait(&self) -> Duration {
        let delay = self.sample();
        if !delay.is_zero() {
            sleep(delay).await;
        }
        delay
    }
}
