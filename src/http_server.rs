// HTTP API Server
// Validates metric requests, emulates service latency and serves analytics JSON.

use anyhow::Result;
use axum::{
    extract::{RawQuery, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use url::form_urlencoded;

use crate::{
    config::{AppConfig, CacheConfig},
    error::AnalyticsError,
    generator::AnalyticsGenerator,
    latency::LatencyProfile,
    observability::{get_metrics, record_request_rejected, record_request_served, traced},
    types::{MetricKind, Timeframe},
};

// Global server start time for uptime tracking
static SERVER_START_TIME: once_cell::sync::Lazy<Instant> = once_cell::sync::Lazy::new(Instant::now);

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    generator: Arc<AnalyticsGenerator>,
    latency: LatencyProfile,
    cache_control: String,
    enable_cors: bool,
}

impl AppState {
    pub fn new(generator: AnalyticsGenerator, latency: LatencyProfile, cache: &CacheConfig) -> Self {
        Self {
            generator: Arc::new(generator),
            latency,
            cache_control: cache.header_value(),
            enable_cors: true,
        }
    }

    pub fn from_config(config: &AppConfig, generator: AnalyticsGenerator) -> Self {
        Self {
            enable_cors: config.server.enable_cors,
            ..Self::new(generator, config.latency.profile(), &config.cache)
        }
    }
}

/// Raw query parameters of `GET /api/metrics`
#[derive(Debug, Default, PartialEq, Eq)]
pub struct MetricsParams {
    pub metric: Option<String>,
    pub timeframe: Option<String>,
}

impl MetricsParams {
    /// Collect the first `metric` and first `timeframe`; repeats and unknown keys are ignored
    pub fn from_query(query: Option<&str>) -> Self {
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
            match key.as_ref() {
                "metric" if params.metric.is_none() => params.metric = Some(value.into_owned()),
                "timeframe" if params.timeframe.is_none() => {
                    params.timeframe = Some(value.into_owned())
                }
                _ => {}
            }
        }
        params
    }

    /// Parse the metric first, then the timeframe; the first failure wins
    pub fn validate(&self) -> Result<(MetricKind, Timeframe), AnalyticsError> {
        let metric = self.metric.as_deref().unwrap_or_default().parse::<MetricKind>()?;
        let timeframe = self
            .timeframe
            .as_deref()
            .unwrap_or_default()
            .parse::<Timeframe>()?;
        Ok((metric, timeframe))
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Create HTTP server with all routes configured
pub fn create_server(state: AppState) -> Router {
    let enable_cors = state.enable_cors;
    let router = Router::new()
        .route("/health", get(health_check))
        .route("/stats", get(get_stats))
        .route("/api/metrics", get(get_analytics))
        .with_state(state);

    let router = if enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };
    router.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

/// Bind `config.bind_address()` and serve until the process exits
pub async fn start_server(config: &AppConfig, generator: AnalyticsGenerator) -> Result<()> {
    let listener = TcpListener::bind(config.bind_address()).await?;
    info!("webvitals HTTP server starting on {}", config.bind_address());

    serve_on(listener, AppState::from_config(config, generator)).await
}

/// Serve on an already bound listener
pub async fn serve_on(listener: TcpListener, state: AppState) -> Result<()> {
    once_cell::sync::Lazy::force(&SERVER_START_TIME);
    axum::serve(listener, create_server(state)).await?;
    Ok(())
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: SERVER_START_TIME.elapsed().as_secs(),
    })
}

/// Counter snapshot
async fn get_stats() -> Json<serde_json::Value> {
    Json(get_metrics())
}

/// `GET /api/metrics?metric=..&timeframe=..`
async fn get_analytics(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Response {
    let params = MetricsParams::from_query(query.as_deref());

    let (metric, timeframe) = match params.validate() {
        Ok(parsed) => parsed,
        Err(e) => {
            record_request_rejected();
            warn!(
                metric = ?params.metric,
                timeframe = ?params.timeframe,
                "Rejected metrics request: {}", e
            );
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response();
        }
    };

    let analytics = traced("get_metrics", async {
        state
            .latency
            .delay(state.generator.random_source().as_ref())
            .await;
        state.generator.generate(metric, timeframe)
    })
    .await;

    record_request_served();
    (
        [(header::CACHE_CONTROL, state.cache_control.clone())],
        Json(analytics),
    )
        .into_response()
}
