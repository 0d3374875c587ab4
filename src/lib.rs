// webvitals - Mock web-vitals analytics engine and dashboard API
// Root library module

pub mod config;
pub mod contracts;
pub mod dashboard;
pub mod error;
pub mod generator;
pub mod http_server;
pub mod latency;
pub mod observability;
pub mod pure;
pub mod sources;
pub mod types;

// Re-export key types
pub use observability::{
    default_filter, get_metrics, init_logging, init_logging_with_config, init_logging_with_level,
    record_metric, traced, with_trace_id, MetricType,
};

pub use contracts::{
    AnalyticsSource, RandomSource, SeededRandomSource, SequenceRandomSource, ThreadRandomSource,
};

pub use types::{
    AnalyticsResult, ChangeType, ComparisonResult, MetricKind, MetricProfile, Sample,
    SeriesInterval, SeriesShape, Timeframe,
};

pub use error::{AnalyticsError, INVALID_METRIC_MESSAGE, INVALID_TIMEFRAME_MESSAGE};

// Re-export the engine
pub use generator::{generate, AnalyticsGenerator};
pub use pure::{aggregate, compare_periods, p75, round_to, synthesize, synthesize_for_label};

// Re-export collaborators
pub use config::AppConfig;
pub use dashboard::{load_dashboard, DashboardSnapshot, FilterOptions, MetricCard, Sentiment};
pub use http_server::{create_server, serve_on, start_server, AppState};
pub use latency::LatencyProfile;
pub use sources::{HttpAnalyticsSource, LocalAnalyticsSource};
