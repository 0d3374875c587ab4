// Aggregator
// p75 summary over a synthesized series and the synthetic period comparison.

use super::round_to;
use crate::contracts::RandomSource;
use crate::types::{ComparisonResult, Sample};

/// Percentile rank used for the summary value
const P75_RANK: f64 = 0.75;

/// Half-width of the synthetic change range, in percent
const CHANGE_SPAN: f64 = 5.0;

/// Decimal places kept on the reported change
const CHANGE_PRECISION: u32 = 1;

/// Nearest-rank 75th percentile, rounded to `precision` decimals
///
/// Values are sorted ascending and the element at `floor(0.75 * len)` is
/// taken as-is, so the result is always one of the inputs before rounding.
/// An empty series yields `baseline`.
pub fn p75(samples: &[Sample], baseline: f64, precision: u32) -> f64 {
    let mut values: Vec<f64> = samples.iter().map(Sample::value).collect();
    values.sort_by(f64::total_cmp);

    let rank = (values.len() as f64 * P75_RANK).floor() as usize;
    let value = values.get(rank).copied().unwrap_or(baseline);
    round_to(value, precision)
}

/// Draw a change in `[-5, 5)` percent, independent of any series.
/// The direction is classified on the rounded value that gets reported.
pub fn compare_periods(random: &dyn RandomSource) -> ComparisonResult {
    let change = random.next_unit() * (CHANGE_SPAN * 2.0) - CHANGE_SPAN;
    ComparisonResult::from_change(round_to(change, CHANGE_PRECISION))
}

/// p75 summary plus period comparison for one series
pub fn aggregate(
    samples: &[Sample],
    baseline: f64,
    precision: u32,
    random: &dyn RandomSource,
) -> (f64, ComparisonResult) {
    (p75(samples, baseline, precision), compare_periods(random))
}
