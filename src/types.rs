// Domain Types
// Metric and timeframe enums, series shapes, samples and the analytics result.
// Enums cannot hold unknown values; string inputs are parsed at the boundary.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AnalyticsError;

/// Web-performance metric reported by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    /// Largest Contentful Paint
    #[serde(rename = "LCP")]
    Lcp,
    /// First Input Delay
    #[serde(rename = "FID")]
    Fid,
    /// Cumulative Layout Shift
    #[serde(rename = "CLS")]
    Cls,
}

/// Per-metric generation parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricProfile {
    pub baseline: f64,
    pub fluctuation: f64,
    pub unit: &'static str,
    /// Decimal places used when rounding the p75 summary
    pub precision: u32,
}

impl MetricKind {
    pub const ALL: [MetricKind; 3] = [MetricKind::Lcp, MetricKind::Fid, MetricKind::Cls];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Lcp => "LCP",
            MetricKind::Fid => "FID",
            MetricKind::Cls => "CLS",
        }
    }

    /// Fixed generation table; adding a variant without an entry fails to compile
    pub fn profile(&self) -> MetricProfile {
        match self {
            MetricKind::Lcp => MetricProfile {
                baseline: 1800.0,
                fluctuation: 400.0,
                unit: "ms",
                precision: 0,
            },
            MetricKind::Fid => MetricProfile {
                baseline: 20.0,
                fluctuation: 15.0,
                unit: "ms",
                precision: 0,
            },
            MetricKind::Cls => MetricProfile {
                baseline: 0.1,
                fluctuation: 0.08,
                unit: "",
                precision: 3,
            },
        }
    }

    pub fn unit(&self) -> &'static str {
        self.profile().unit
    }

    pub fn precision(&self) -> u32 {
        self.profile().precision
    }

    /// Whether a rising value is a regression. CLS movements read the other way.
    pub fn higher_is_worse(&self) -> bool {
        match self {
            MetricKind::Lcp | MetricKind::Fid => true,
            MetricKind::Cls => false,
        }
    }

    /// Render a value with the metric's precision and unit, e.g. `1834ms` or `0.094`
    pub fn format_value(&self, value: f64) -> String {
        let precision = self.precision() as usize;
        format!("{:.*}{}", precision, value, self.unit())
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LCP" => Ok(MetricKind::Lcp),
            "FID" => Ok(MetricKind::Fid),
            "CLS" => Ok(MetricKind::Cls),
            other => Err(AnalyticsError::InvalidMetric(other.to_string())),
        }
    }
}

/// Historical window requested by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "24h")]
    Last24Hours,
    #[serde(rename = "7d")]
    Last7Days,
    #[serde(rename = "30d")]
    Last30Days,
}

impl Timeframe {
    pub const ALL: [Timeframe; 3] = [
        Timeframe::Last24Hours,
        Timeframe::Last7Days,
        Timeframe::Last30Days,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Last24Hours => "24h",
            Timeframe::Last7Days => "7d",
            Timeframe::Last30Days => "30d",
        }
    }

    pub fn shape(&self) -> SeriesShape {
        SeriesShape::from(*self)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "24h" => Ok(Timeframe::Last24Hours),
            "7d" => Ok(Timeframe::Last7Days),
            "30d" => Ok(Timeframe::Last30Days),
            other => Err(AnalyticsError::InvalidTimeframe(other.to_string())),
        }
    }
}

/// Spacing between consecutive samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesInterval {
    Hour,
    Day,
}

impl SeriesInterval {
    pub fn step(&self) -> Duration {
        match self {
            SeriesInterval::Hour => Duration::hours(1),
            SeriesInterval::Day => Duration::days(1),
        }
    }

    /// `now` minus `steps` intervals, computed on the UTC timeline
    pub fn steps_back(&self, now: DateTime<Utc>, steps: usize) -> DateTime<Utc> {
        let steps = steps as i64;
        match self {
            SeriesInterval::Hour => now - Duration::hours(steps),
            SeriesInterval::Day => now - Duration::days(steps),
        }
    }
}

/// Point count and spacing of a synthesized series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeriesShape {
    pub count: usize,
    pub interval: SeriesInterval,
}

impl SeriesShape {
    /// Shape used when a timeframe label is not recognized
    pub const FALLBACK: SeriesShape = SeriesShape {
        count: 24,
        interval: SeriesInterval::Hour,
    };

    /// Resolve a raw timeframe label. Unknown labels yield [`SeriesShape::FALLBACK`]
    /// instead of an error; callers that need validation parse a [`Timeframe`] first.
    pub fn from_label(label: &str) -> Self {
        label
            .parse::<Timeframe>()
            .map(SeriesShape::from)
            .unwrap_or(SeriesShape::FALLBACK)
    }
}

impl From<Timeframe> for SeriesShape {
    fn from(timeframe: Timeframe) -> Self {
        match timeframe {
            Timeframe::Last24Hours => SeriesShape {
                count: 24,
                interval: SeriesInterval::Hour,
            },
            Timeframe::Last7Days => SeriesShape {
                count: 7,
                interval: SeriesInterval::Day,
            },
            Timeframe::Last30Days => SeriesShape {
                count: 30,
                interval: SeriesInterval::Day,
            },
        }
    }
}

/// A single timestamped value of a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(with = "iso_millis")]
    time: DateTime<Utc>,
    #[serde(with = "json_number")]
    value: f64,
}

impl Sample {
    pub fn new(time: DateTime<Utc>, value: f64) -> Self {
        Self { time, value }
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Direction of the period-over-period change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Increase,
    Decrease,
    Neutral,
}

impl ChangeType {
    /// Changes within this magnitude (inclusive) are reported as neutral
    pub const NEUTRAL_BAND: f64 = 0.5;

    pub fn classify(change: f64) -> Self {
        if change > Self::NEUTRAL_BAND {
            ChangeType::Increase
        } else if change < -Self::NEUTRAL_BAND {
            ChangeType::Decrease
        } else {
            ChangeType::Neutral
        }
    }
}

/// Synthetic period-over-period comparison, in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    #[serde(with = "json_number")]
    change: f64,
    #[serde(rename = "changeType")]
    change_type: ChangeType,
}

impl ComparisonResult {
    /// Build a comparison whose direction is derived from `change`
    pub fn from_change(change: f64) -> Self {
        Self {
            change,
            change_type: ChangeType::classify(change),
        }
    }

    pub fn change(&self) -> f64 {
        self.change
    }

    pub fn change_type(&self) -> ChangeType {
        self.change_type
    }
}

/// Request-scoped analytics payload for one metric and timeframe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsResult {
    metric: MetricKind,
    #[serde(with = "json_number")]
    p75: f64,
    points: Vec<Sample>,
    comparison: ComparisonResult,
}

impl AnalyticsResult {
    pub fn new(
        metric: MetricKind,
        p75: f64,
        points: Vec<Sample>,
        comparison: ComparisonResult,
    ) -> Self {
        Self {
            metric,
            p75,
            points,
            comparison,
        }
    }

    pub fn metric(&self) -> MetricKind {
        self.metric
    }

    pub fn p75(&self) -> f64 {
        self.p75
    }

    pub fn points(&self) -> &[Sample] {
        &self.points
    }

    pub fn comparison(&self) -> &ComparisonResult {
        &self.comparison
    }
}

/// ISO-8601 timestamps with millisecond precision and a `Z` suffix
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|time| time.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

// Whole numbers are written without a fractional part (`1912`, not `1912.0`)
mod json_number {
    use serde::{Deserialize, Deserializer, Serializer};

    // Integers above 2^53 are no longer exact in an f64
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.fract() == 0.0 && value.abs() <= MAX_EXACT {
            serializer.serialize_i64(*value as i64)
        } else {
            serializer.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        f64::deserialize(deserializer)
    }
}
