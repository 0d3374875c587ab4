// Analytics Generator
// Single entry point composing the synthesizer and the aggregator. Used the same
// way by the HTTP handler and by the in-process source, so both produce
// identically shaped results.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

use crate::contracts::{RandomSource, SeededRandomSource, ThreadRandomSource};
use crate::observability::record_series_generated;
use crate::pure::{aggregate, synthesize};
use crate::types::{AnalyticsResult, MetricKind, Timeframe};

/// Builds fresh [`AnalyticsResult`]s from an injected random source
///
/// Inputs are already-validated enums; string validation happens at the
/// boundary that owns the generator.
#[derive(Clone)]
pub struct AnalyticsGenerator {
    random: Arc<dyn RandomSource>,
}

impl Default for AnalyticsGenerator {
    fn default() -> Self {
        Self::new(Arc::new(ThreadRandomSource))
    }
}

impl std::fmt::Debug for AnalyticsGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsGenerator").finish_non_exhaustive()
    }
}

impl AnalyticsGenerator {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }

    /// Generator whose draws are reproducible for a given seed
    pub fn seeded(seed: u64) -> Self {
        Self::new(Arc::new(SeededRandomSource::new(seed)))
    }

    /// Random source shared with collaborators such as latency emulation
    pub fn random_source(&self) -> &Arc<dyn RandomSource> {
        &self.random
    }

    /// Generate a result for `metric` over `timeframe`, ending now
    pub fn generate(&self, metric: MetricKind, timeframe: Timeframe) -> AnalyticsResult {
        self.generate_at(metric, timeframe, Utc::now())
    }

    /// Generate a result whose newest sample is stamped `now`
    pub fn generate_at(
        &self,
        metric: MetricKind,
        timeframe: Timeframe,
        now: DateTime<Utc>,
    ) -> AnalyticsResult {
        let profile = metric.profile();
        let random = self.random.as_ref();

        let points = synthesize(
            timeframe.shape(),
            profile.baseline,
            profile.fluctuation,
            now,
            random,
        );
        let (p75, comparison) = aggregate(&points, profile.baseline, profile.precision, random);

        debug!(
            metric = %metric,
            timeframe = %timeframe,
            points = points.len(),
            p75,
            change = comparison.change(),
            "Generated analytics series"
        );
        record_series_generated(points.len());

        AnalyticsResult::new(metric, p75, points, comparison)
    }
}

/// Generate with the thread-local random source
pub fn generate(metric: MetricKind, timeframe: Timeframe) -> AnalyticsResult {
    AnalyticsGenerator::default().generate(metric, timeframe)
}
