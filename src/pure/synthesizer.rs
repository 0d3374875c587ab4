// Time-series synthesizer
// Bounded pseudo-random fluctuation around a baseline, oldest sample first.

use chrono::{DateTime, SubsecRound, Utc};

use super::round_to;
use crate::contracts::RandomSource;
use crate::types::{Sample, SeriesShape};

/// Decimal places kept on every synthesized value
pub const SAMPLE_PRECISION: u32 = 3;

/// Synthesize a series of `shape.count` samples ending at `now`
///
/// Sample `i` (counting back from the newest) sits at `now - i * interval`
/// and carries `baseline + (u - 0.5) * fluctuation`, rounded to
/// [`SAMPLE_PRECISION`] decimals, where `u` is one draw from `random`.
/// `now` is truncated to whole milliseconds so timestamps survive ISO-8601
/// serialization unchanged.
pub fn synthesize(
    shape: SeriesShape,
    baseline: f64,
    fluctuation: f64,
    now: DateTime<Utc>,
    random: &dyn RandomSource,
) -> Vec<Sample> {
    let now = now.trunc_subsecs(3);

    (0..shape.count)
        .rev()
        .map(|steps| {
            let time = shape.interval.steps_back(now, steps);
            let value = baseline + (random.next_unit() - 0.5) * fluctuation;
            Sample::new(time, round_to(value, SAMPLE_PRECISION))
        })
        .collect()
}

/// Synthesize from a raw timeframe label without validating it.
/// Unrecognized labels produce the 24-point hourly fallback shape.
pub fn synthesize_for_label(
    label: &str,
    baseline: f64,
    fluctuation: f64,
    now: DateTime<Utc>,
    random: &dyn RandomSource,
) -> Vec<Sample> {
    synthesize(
        SeriesShape::from_label(label),
        baseline,
        fluctuation,
        now,
        random,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{SequenceRandomSource, ThreadRandomSource};
    use crate::types::{SeriesInterval, Timeframe};
    use chrono::{Duration, TimeZone};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap()
    }

    #[test]
    fn test_hourly_series_ends_at_now() {
        let samples = synthesize(
            Timeframe::Last24Hours.shape(),
            1800.0,
            400.0,
            fixed_now(),
            &ThreadRandomSource,
        );

        assert_eq!(samples.len(), 24);
        assert_eq!(samples.last().unwrap().time(), fixed_now());
        assert_eq!(samples[0].time(), fixed_now() - Duration::hours(23));
        for pair in samples.windows(2) {
            assert_eq!(pair[1].time() - pair[0].time(), Duration::hours(1));
        }
    }

    #[test]
    fn test_daily_series_spacing() {
        for timeframe in [Timeframe::Last7Days, Timeframe::Last30Days] {
            let shape = timeframe.shape();
            let samples = synthesize(shape, 20.0, 15.0, fixed_now(), &ThreadRandomSource);

            assert_eq!(samples.len(), shape.count);
            assert_eq!(shape.interval, SeriesInterval::Day);
            for pair in samples.windows(2) {
                assert_eq!(pair[1].time() - pair[0].time(), Duration::days(1));
            }
        }
    }

    #[test]
    fn test_values_follow_draws() {
        let random = SequenceRandomSource::new(vec![0.0, 0.5, 0.75]);
        let shape = SeriesShape {
            count: 3,
            interval: SeriesInterval::Hour,
        };
        let samples = synthesize(shape, 1800.0, 400.0, fixed_now(), &random);

        let values: Vec<f64> = samples.iter().map(Sample::value).collect();
        assert_eq!(values, vec![1600.0, 1800.0, 1900.0]);
    }

    #[test]
    fn test_values_rounded_to_three_decimals() {
        let random = SequenceRandomSource::constant(0.123456789);
        let samples = synthesize(
            Timeframe::Last7Days.shape(),
            0.1,
            0.08,
            fixed_now(),
            &random,
        );

        for sample in &samples {
            let scaled = sample.value() * 1000.0;
            assert!((scaled - scaled.round()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_now_truncated_to_millis() {
        let now = fixed_now() + Duration::nanoseconds(1_234_567);
        let samples = synthesize(
            Timeframe::Last24Hours.shape(),
            20.0,
            15.0,
            now,
            &ThreadRandomSource,
        );
        assert_eq!(
            samples.last().unwrap().time(),
            fixed_now() + Duration::milliseconds(1)
        );
    }

    #[test]
    fn test_unknown_label_produces_hourly_fallback() {
        let samples = synthesize_for_label("quarter", 20.0, 15.0, fixed_now(), &ThreadRandomSource);

        assert_eq!(samples.len(), 24);
        for pair in samples.windows(2) {
            assert_eq!(pair[1].time() - pair[0].time(), Duration::hours(1));
        }
    }

    #[test]
    fn test_known_label_matches_typed_shape() {
        let samples = synthesize_for_label("7d", 20.0, 15.0, fixed_now(), &ThreadRandomSource);
        assert_eq!(samples.len(), 7);
    }
}
