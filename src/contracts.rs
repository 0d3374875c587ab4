// Contracts
// Seams of the analytics engine: where randomness comes from and where
// analytics results are fetched from. Everything behind these traits is
// injected explicitly by the caller.

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::Result;
use crate::types::{AnalyticsResult, MetricKind, Timeframe};

/// Largest value a [`RandomSource`] may return
const MAX_UNIT: f64 = 1.0 - f64::EPSILON;

/// Source of uniform draws for the synthesizer, aggregator and latency emulation
///
/// # Postconditions
/// - `next_unit` returns a value in `[0, 1)`
/// - Draws are independent of previous results unless the implementation
///   documents otherwise (e.g. [`SequenceRandomSource`])
///
/// Not suitable for anything security related.
pub trait RandomSource: Send + Sync {
    fn next_unit(&self) -> f64;
}

/// Thread-local generator; the production default
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandomSource;

impl RandomSource for ThreadRandomSource {
    fn next_unit(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Reproducible generator seeded once at construction
#[derive(Debug)]
pub struct SeededRandomSource {
    rng: Mutex<StdRng>,
}

impl SeededRandomSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandomSource {
    fn next_unit(&self) -> f64 {
        self.rng.lock().gen::<f64>()
    }
}

/// Replays a fixed list of draws, wrapping around at the end.
/// Values are clamped into `[0, 1)`; an empty list always yields `0.5`.
#[derive(Debug)]
pub struct SequenceRandomSource {
    values: Vec<f64>,
    cursor: AtomicUsize,
}

impl SequenceRandomSource {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            cursor: AtomicUsize::new(0),
        }
    }

    /// Source that always returns the same draw
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for SequenceRandomSource {
    fn next_unit(&self) -> f64 {
        if self.values.is_empty() {
            return 0.5;
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.values.len();
        self.values[index].clamp(0.0, MAX_UNIT)
    }
}

/// Anything that can hand out an [`AnalyticsResult`] for a metric and timeframe
///
/// # Postconditions
/// - On success the result has the canonical shape for `timeframe`
/// - Implementations never retry; retry policy belongs to the caller
/// - Results carry no information about which source produced them
#[async_trait]
pub trait AnalyticsSource: Send + Sync {
    async fn fetch(&self, metric: MetricKind, timeframe: Timeframe) -> Result<AnalyticsResult>;

    /// Short label used in logs
    fn name(&self) -> &'static str;
}
