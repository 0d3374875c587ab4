// Error Types
// Boundary validation failures and transport failures seen by analytics sources.

/// Exact client-facing message for a missing or unknown metric
pub const INVALID_METRIC_MESSAGE: &str =
    "Invalid or missing \"metric\" parameter. Use one of: LCP, FID, CLS.";

/// Exact client-facing message for a missing or unknown timeframe
pub const INVALID_TIMEFRAME_MESSAGE: &str =
    "Invalid or missing \"timeframe\" parameter. Use one of: 24h, 7d, 30d.";

/// Errors surfaced by the analytics boundary and its sources
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    /// The offending input is kept for logging; the message never echoes it
    #[error("{}", INVALID_METRIC_MESSAGE)]
    InvalidMetric(String),

    #[error("{}", INVALID_TIMEFRAME_MESSAGE)]
    InvalidTimeframe(String),

    #[error("network or fetch error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to fetch analytics data. Server responded with {status}.")]
    Status { status: u16, body: String },

    #[error("failed to decode analytics payload: {0}")]
    Decode(String),

    #[error("invalid analytics endpoint: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl AnalyticsError {
    /// True for errors caused by the caller's input rather than the transport
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AnalyticsError::InvalidMetric(_) | AnalyticsError::InvalidTimeframe(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
