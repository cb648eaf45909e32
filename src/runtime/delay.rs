//! Artificial typing latency applied before a successful reply is shown

use rand::Rng;
use std::time::Duration;

const DEFAULT_MIN: Duration = Duration::from_millis(800);
const DEFAULT_MAX: Duration = Duration::from_millis(2000);

/// Uniform delay over `[min, max)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingDelay {
    pub min: Duration,
    pub max: Duration,
}

impl Default for TypingDelay {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN,
            max: DEFAULT_MAX,
        }
    }
}

impl TypingDelay {
    /// `max` below `min` is raised to `min`
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max: max.max(min),
        }
    }

    #[must_use]
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    #[must_use]
    pub fn sample(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        rand::thread_rng().gen_range(self.min..self.max)
    }
}
