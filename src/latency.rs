// Latency Emulation
// Artificial service latency shared by the HTTP handler and the in-process source.

use std::time::Duration;
use tracing::debug;

use crate::contracts::RandomSource;

/// Fixed minimum delay plus bounded random jitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyProfile {
    base: Duration,
    jitter: Duration,
}

impl Default for LatencyProfile {
    /// 300 ms plus up to 400 ms of jitter
    fn default() -> Self {
        Self::new(Duration::from_millis(300), Duration::from_millis(400))
    }
}

impl LatencyProfile {
    pub const fn new(base: Duration, jitter: Duration) -> Self {
        Self { base, jitter }
    }

    /// No artificial delay at all
    pub const fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    pub fn jitter(&self) -> Duration {
        self.jitter
    }

    pub fn is_disabled(&self) -> bool {
        self.base.is_zero() && self.jitter.is_zero()
    }

    /// Delay in `[base, base + jitter)`
    pub fn sample(&self, random: &dyn RandomSource) -> Duration {
        if self.jitter.is_zero() {
            return self.base;
        }
        self.base + self.jitter.mul_f64(random.next_unit())
    }

    /// Sleep for a sampled delay without blocking other tasks.
    /// Returns the delay that was applied.
    pub async fn delay(&self, random: &dyn RandomSource) -> Duration {
        if self.is_disabled() {
            return Duration::ZERO;
        }
        let delay = self.sample(random);
        debug!(delay_ms = delay.as_millis(), "Simulating service latency");
        tokio::time::sleep(delay).await;
        delay
    }
}
