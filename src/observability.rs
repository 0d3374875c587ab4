// Observability
// Structured logging setup, trace-id scoped operations and process-wide counters
// for the analytics server.

use anyhow::Result;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

// Global atomic counters
static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(0);
static REJECTED_COUNTER: AtomicU64 = AtomicU64::new(0);
static ERROR_COUNTER: AtomicU64 = AtomicU64::new(0);
static SERIES_COUNTER: AtomicU64 = AtomicU64::new(0);

const DEFAULT_LEVEL: &str = "info";
const VERBOSE_FILTER: &str = "webvitals=debug,info";
const QUIET_FILTER: &str = "error";

/// Initialize the logging and tracing infrastructure with default verbosity
pub fn init_logging() -> Result<()> {
    init_logging_with_level(false, false)
}

/// Initialize logging with configurable verbosity and the default `info` level
pub fn init_logging_with_level(verbose: bool, quiet: bool) -> Result<()> {
    init_logging_with_config(verbose, quiet, DEFAULT_LEVEL)
}

/// Filter used when neither a flag nor `RUST_LOG` picks one
///
/// `level` applies to this crate; everything else logs warnings and above.
pub fn default_filter(level: &str) -> String {
    format!("webvitals={},warn", level.trim().to_ascii_lowercase())
}

/// Initialize logging with `level` (from `[logging] level`) as the default
///
/// `quiet` wins over everything, then `verbose`, then `RUST_LOG` when set and
/// valid, then `level`.
pub fn init_logging_with_config(verbose: bool, quiet: bool, level: &str) -> Result<()> {
    let env_filter = if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        let configured = EnvFilter::try_new(default_filter(level))
            .unwrap_or_else(|_| EnvFilter::new(default_filter(DEFAULT_LEVEL)));
        if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::try_from_default_env().unwrap_or(configured)
        } else {
            configured
        }
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(!quiet)
        .with_thread_ids(!quiet)
        .with_line_number(!quiet)
        .with_file(!quiet)
        .with_ansi(true);

    match tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
    {
        Ok(()) => {
            if !quiet {
                info!("webvitals observability initialized");
            }
            Ok(())
        }
        // Already initialized, which is fine in test environments
        Err(_) => Ok(()),
    }
}

/// Metric types recorded through [`record_metric`]
#[derive(Debug, Clone)]
pub enum MetricType {
    Counter { name: &'static str, value: u64 },
    Gauge { name: &'static str, value: f64 },
    Timer { name: &'static str, duration: Duration },
}

/// Identity of one traced operation
#[derive(Debug, Clone)]
pub struct OperationContext {
    pub trace_id: Uuid,
    pub span_id: Uuid,
    pub operation: String,
    pub start_time: Instant,
}

impl OperationContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            trace_id: Uuid::new_v4(),
            span_id: Uuid::new_v4(),
            operation: operation.into(),
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Record a metric
pub fn record_metric(metric: MetricType) {
    match metric {
        MetricType::Counter { name, value } => {
            debug!("metric.counter {} = {}", name, value);
        }
        MetricType::Gauge { name, value } => {
            debug!("metric.gauge {} = {}", name, value);
        }
        MetricType::Timer { name, duration } => {
            debug!("metric.timer {} = {:?}", name, duration);
        }
    }
}

/// Execute an infallible future inside a trace context, logging its duration
pub async fn traced<F, T>(operation: &str, f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    let ctx = OperationContext::new(operation);

    debug!(
        trace_id = %ctx.trace_id,
        span_id = %ctx.span_id,
        "Starting operation: {}", operation
    );

    let value = f.await;
    let elapsed = ctx.elapsed();

    info!(
        trace_id = %ctx.trace_id,
        span_id = %ctx.span_id,
        elapsed_ms = elapsed.as_millis(),
        "Operation completed successfully: {}", operation
    );
    record_metric(MetricType::Timer {
        name: "operation.duration",
        duration: elapsed,
    });

    value
}

/// Execute a future inside a trace context, logging its outcome and duration
pub async fn with_trace_id<F, T>(operation: &str, f: F) -> Result<T>
where
    F: std::future::Future<Output = Result<T>>,
{
    let ctx = OperationContext::new(operation);

    debug!(
        trace_id = %ctx.trace_id,
        span_id = %ctx.span_id,
        "Starting operation: {}", operation
    );

    let result = f.await;
    let elapsed = ctx.elapsed();

    match &result {
        Ok(_) => {
            info!(
                trace_id = %ctx.trace_id,
                span_id = %ctx.span_id,
                elapsed_ms = elapsed.as_millis(),
                "Operation completed successfully: {}", operation
            );
            record_metric(MetricType::Timer {
                name: "operation.duration",
                duration: elapsed,
            });
        }
        Err(e) => {
            error!(
                trace_id = %ctx.trace_id,
                span_id = %ctx.span_id,
                elapsed_ms = elapsed.as_millis(),
                error = %e,
                "Operation failed: {}", operation
            );
            ERROR_COUNTER.fetch_add(1, Ordering::Relaxed);
            record_metric(MetricType::Counter {
                name: "operation.errors",
                value: 1,
            });
        }
    }

    result
}

/// Count a successfully served metrics request
pub fn record_request_served() {
    REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
}

/// Count a request rejected by boundary validation
pub fn record_request_rejected() {
    REJECTED_COUNTER.fetch_add(1, Ordering::Relaxed);
}

/// Count one synthesized series
pub fn record_series_generated(points: usize) {
    SERIES_COUNTER.fetch_add(1, Ordering::Relaxed);
    record_metric(MetricType::Gauge {
        name: "series.points",
        value: points as f64,
    });
}

/// Get current metrics snapshot
pub fn get_metrics() -> serde_json::Value {
    serde_json::json!({
        "requests": {
            "served": REQUEST_COUNTER.load(Ordering::Relaxed),
            "rejected": REJECTED_COUNTER.load(Ordering::Relaxed),
            "errors": ERROR_COUNTER.load(Ordering::Relaxed),
        },
        "series_generated": SERIES_COUNTER.load(Ordering::Relaxed),
        "timestamp": Utc::now().to_rfc3339(),
    })
}
