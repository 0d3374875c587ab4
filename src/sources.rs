// Analytics Sources
// The two independently constructed ways of obtaining analytics results: calling
// the generator in-process, or fetching from a running server over HTTP.

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, error};
use url::Url;

use crate::contracts::AnalyticsSource;
use crate::error::{AnalyticsError, Result};
use crate::generator::AnalyticsGenerator;
use crate::latency::LatencyProfile;
use crate::types::{AnalyticsResult, MetricKind, Timeframe};

/// Path of the metrics endpoint relative to the server root
pub const METRICS_PATH: &str = "/api/metrics";

/// Calls the generator directly, with the same artificial latency as the server
#[derive(Debug, Clone)]
pub struct LocalAnalyticsSource {
    generator: Arc<AnalyticsGenerator>,
    latency: LatencyProfile,
}

impl LocalAnalyticsSource {
    pub fn new(generator: AnalyticsGenerator, latency: LatencyProfile) -> Self {
        Self {
            generator: Arc::new(generator),
            latency,
        }
    }
}

#[async_trait]
impl AnalyticsSource for LocalAnalyticsSource {
    async fn fetch(&self, metric: MetricKind, timeframe: Timeframe) -> Result<AnalyticsResult> {
        debug!(%metric, %timeframe, "Generating analytics in-process");
        self.latency
            .delay(self.generator.random_source().as_ref())
            .await;
        Ok(self.generator.generate(metric, timeframe))
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

/// Fetches from `GET {base}/api/metrics`
#[derive(Debug, Clone)]
pub struct HttpAnalyticsSource {
    client: Client,
    base_url: Url,
}

impl HttpAnalyticsSource {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self::with_client(Client::new(), Url::parse(base_url)?))
    }

    pub fn with_client(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Full request URL for one metric and timeframe
    pub fn metrics_url(&self, metric: MetricKind, timeframe: Timeframe) -> Result<Url> {
        let mut url = self.base_url.join(METRICS_PATH)?;
        url.query_pairs_mut()
            .append_pair("metric", metric.as_str())
            .append_pair("timeframe", timeframe.as_str());
        Ok(url)
    }
}

#[async_trait]
impl AnalyticsSource for HttpAnalyticsSource {
    async fn fetch(&self, metric: MetricKind, timeframe: Timeframe) -> Result<AnalyticsResult> {
        let url = self.metrics_url(metric, timeframe)?;

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            error!(url = %url, "Network or fetch error: {}", e);
            AnalyticsError::Transport(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                status = status.as_u16(),
                body = %body,
                "API Error: {}", status
            );
            return Err(AnalyticsError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| AnalyticsError::Decode(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
