// Dashboard Loader
// Fetches the three summary cards and the active chart series from any
// analytics source. Individual failures degrade to empty slots.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::contracts::AnalyticsSource;
use crate::types::{AnalyticsResult, ChangeType, MetricKind, Timeframe};

/// Active metric and timeframe selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub metric: MetricKind,
    pub timeframe: Timeframe,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            metric: MetricKind::Lcp,
            timeframe: Timeframe::Last7Days,
        }
    }
}

/// How a comparison should be read for a given metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Regression,
    Improvement,
    Unchanged,
}

impl Sentiment {
    /// A rise is a regression for LCP and FID and an improvement for CLS
    pub fn of(metric: MetricKind, change_type: ChangeType) -> Self {
        match (change_type, metric.higher_is_worse()) {
            (ChangeType::Neutral, _) => Sentiment::Unchanged,
            (ChangeType::Increase, true) | (ChangeType::Decrease, false) => Sentiment::Regression,
            (ChangeType::Increase, false) | (ChangeType::Decrease, true) => Sentiment::Improvement,
        }
    }
}

/// Summary card for one metric; `result` is `None` when its fetch failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricCard {
    pub metric: MetricKind,
    pub result: Option<AnalyticsResult>,
}

impl MetricCard {
    pub fn sentiment(&self) -> Option<Sentiment> {
        self.result
            .as_ref()
            .map(|result| Sentiment::of(self.metric, result.comparison().change_type()))
    }
}

impl fmt::Display for MetricCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(result) = &self.result else {
            return write!(f, "{} (p75): -", self.metric);
        };

        write!(
            f,
            "{} (p75): {}",
            self.metric,
            self.metric.format_value(result.p75())
        )?;

        let comparison = result.comparison();
        let arrow = match comparison.change_type() {
            ChangeType::Increase => "▲",
            ChangeType::Decrease => "▼",
            ChangeType::Neutral => return write!(f, "  vs previous period: unchanged"),
        };
        write!(
            f,
            "  {} {:.1}% vs previous period ({:?})",
            arrow,
            comparison.change().abs(),
            Sentiment::of(self.metric, comparison.change_type())
        )
    }
}

/// Everything the dashboard shows for one filter selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub filters: FilterOptions,
    pub cards: Vec<MetricCard>,
    pub chart: Option<AnalyticsResult>,
}

impl DashboardSnapshot {
    pub fn card(&self, metric: MetricKind) -> Option<&MetricCard> {
        self.cards.iter().find(|card| card.metric == metric)
    }

    /// True when every card and the chart loaded
    pub fn is_complete(&self) -> bool {
        self.chart.is_some() && self.cards.iter().all(|card| card.result.is_some())
    }
}

/// Load all cards concurrently for the selected timeframe, then the active chart
///
/// Requests are independent and may complete in any order. The loader never
/// fails; a failed request leaves its slot empty and is logged.
pub async fn load_dashboard(source: &dyn AnalyticsSource, filters: FilterOptions) -> DashboardSnapshot {
    let card_requests = MetricKind::ALL
        .iter()
        .map(|metric| source.fetch(*metric, filters.timeframe));
    let responses = join_all(card_requests).await;

    let cards = MetricKind::ALL
        .iter()
        .zip(responses)
        .map(|(metric, response)| MetricCard {
            metric: *metric,
            result: response
                .map_err(|e| {
                    warn!(
                        source = source.name(),
                        "Failed to fetch data for {}: {}", metric, e
                    )
                })
                .ok(),
        })
        .collect();

    let chart = source
        .fetch(filters.metric, filters.timeframe)
        .await
        .map_err(|e| {
            warn!(
                source = source.name(),
                "Failed to fetch chart data for {}: {}", filters.metric, e
            )
        })
        .ok();

    DashboardSnapshot {
        filters,
        cards,
        chart,
    }
}
