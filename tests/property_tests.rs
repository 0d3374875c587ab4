// Property-Based Testing - invariants of the analytics engine across seeds and inputs

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use std::sync::Arc;
use webvitals::*;

// Custom strategies for generating test data
mod strategies {
    use super::*;

    pub fn metric_strategy() -> impl Strategy<Value = MetricKind> {
        prop_oneof![
            Just(MetricKind::Lcp),
            Just(MetricKind::Fid),
            Just(MetricKind::Cls),
        ]
    }

    pub fn timeframe_strategy() -> impl Strategy<Value = Timeframe> {
        prop_oneof![
            Just(Timeframe::Last24Hours),
            Just(Timeframe::Last7Days),
            Just(Timeframe::Last30Days),
        ]
    }

    // Any instant between 2001 and 2033, with sub-millisecond noise
    pub fn now_strategy() -> impl Strategy<Value = DateTime<Utc>> {
        (1_000_000_000i64..2_000_000_000, 0u32..1_000_000_000)
            .prop_map(|(secs, nanos)| Utc.timestamp_opt(secs, nanos).unwrap())
    }

    // Draws in [0, 1), including the exact edges
    pub fn draw_strategy() -> impl Strategy<Value = f64> {
        prop_oneof![
            0.0f64..1.0,
            Just(0.0),
            Just(1.0 - f64::EPSILON),
            Just(0.5),
        ]
    }
}

use strategies::*;

fn decimals_within(value: f64, precision: u32) -> bool {
    round_to(value, precision) == value
}

proptest! {
    #[test]
    fn series_length_and_spacing(
        seed in any::<u64>(),
        metric in metric_strategy(),
        timeframe in timeframe_strategy(),
        now in now_strategy(),
    ) {
        let generator = AnalyticsGenerator::seeded(seed);
        let result = generator.generate_at(metric, timeframe, now);
        let shape = timeframe.shape();

        prop_assert_eq!(result.metric(), metric);
        prop_assert_eq!(result.points().len(), shape.count);

        // Strictly ascending, evenly spaced, ending at "now" truncated to millis
        for pair in result.points().windows(2) {
            prop_assert_eq!(pair[1].time() - pair[0].time(), shape.interval.step());
        }
        let last = result.points().last().unwrap().time();
        prop_assert_eq!(last.timestamp_millis(), now.timestamp_millis());
        prop_assert_eq!(last.timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn sample_values_stay_in_band(
        seed in any::<u64>(),
        metric in metric_strategy(),
        timeframe in timeframe_strategy(),
    ) {
        let profile = metric.profile();
        let result = AnalyticsGenerator::seeded(seed).generate(metric, timeframe);
        let half = profile.fluctuation / 2.0;

        for sample in result.points() {
            prop_assert!(sample.value() >= profile.baseline - half - 1e-9);
            prop_assert!(sample.value() <= profile.baseline + half + 1e-9);
            prop_assert!(decimals_within(sample.value(), 3));
        }
    }

    #[test]
    fn p75_is_a_rounded_member_of_the_series(
        seed in any::<u64>(),
        metric in metric_strategy(),
        timeframe in timeframe_strategy(),
    ) {
        let result = AnalyticsGenerator::seeded(seed).generate(metric, timeframe);
        let precision = metric.precision();

        prop_assert!(decimals_within(result.p75(), precision));
        prop_assert!(result
            .points()
            .iter()
            .any(|sample| round_to(sample.value(), precision) == result.p75()));

        // At least a quarter of the samples sit at or above p75 before rounding
        let mut values: Vec<f64> = result.points().iter().map(Sample::value).collect();
        values.sort_by(f64::total_cmp);
        let index = (values.len() as f64 * 0.75).floor() as usize;
        prop_assert_eq!(round_to(values[index], precision), result.p75());
    }

    #[test]
    fn comparison_is_bounded_and_classified(
        seed in any::<u64>(),
        metric in metric_strategy(),
        timeframe in timeframe_strategy(),
    ) {
        let comparison = *AnalyticsGenerator::seeded(seed)
            .generate(metric, timeframe)
            .comparison();
        let change = comparison.change();

        prop_assert!((-5.0..=5.0).contains(&change));
        prop_assert!(decimals_within(change, 1));

        let expected = if change > 0.5 {
            ChangeType::Increase
        } else if change < -0.5 {
            ChangeType::Decrease
        } else {
            ChangeType::Neutral
        };
        prop_assert_eq!(comparison.change_type(), expected);
    }

    #[test]
    fn same_seed_same_result(
        seed in any::<u64>(),
        metric in metric_strategy(),
        timeframe in timeframe_strategy(),
        now in now_strategy(),
    ) {
        let a = AnalyticsGenerator::seeded(seed).generate_at(metric, timeframe, now);
        let b = AnalyticsGenerator::seeded(seed).generate_at(metric, timeframe, now);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn constant_draw_gives_flat_series(
        draw in draw_strategy(),
        metric in metric_strategy(),
        timeframe in timeframe_strategy(),
    ) {
        let generator = AnalyticsGenerator::new(Arc::new(SequenceRandomSource::constant(draw)));
        let result = generator.generate(metric, timeframe);
        let first = result.points()[0].value();

        prop_assert!(result.points().iter().all(|sample| sample.value() == first));
        prop_assert_eq!(result.p75(), round_to(first, metric.precision()));
    }

    #[test]
    fn unknown_timeframe_labels_fall_back_to_hourly_day(label in "[a-z0-9]{0,6}") {
        prop_assume!(label.parse::<Timeframe>().is_err());
        let shape = SeriesShape::from_label(&label);
        prop_assert_eq!(shape, SeriesShape::FALLBACK);
        prop_assert_eq!(shape.count, 24);
        prop_assert_eq!(shape.interval, SeriesInterval::Hour);
    }

    #[test]
    fn round_to_is_idempotent(value in -1.0e6f64..1.0e6, decimals in 0u32..4) {
        let once = round_to(value, decimals);
        prop_assert_eq!(round_to(once, decimals), once);
        prop_assert!(!(once == 0.0 && once.is_sign_negative()));
    }
}
