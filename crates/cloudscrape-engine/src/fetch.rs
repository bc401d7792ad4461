//! Statistics fetch and newest-datapoint selection.

use chrono::{DateTime, Duration, Utc};
use cloudscrape_core::{DimensionSet, MetricRule};

use crate::api::{Datapoint, MetricStatisticsRequest};
use crate::error::ScrapeResult;
use crate::upstream::Upstream;

/// The time range queried for every dimension set of one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ScrapeWindow {
    /// `end = now - delay`, `start = end - range`.
    pub fn for_rule(rule: &MetricRule, now: DateTime<Utc>) -> Self {
        let end = now - Duration::seconds(i64::from(rule.delay_seconds));
        let start = end - Duration::seconds(i64::from(rule.range_seconds));
        Self { start, end }
    }
}

/// Fetch statistics for one dimension set and keep only the newest datapoint.
///
/// Returns `None` when CloudWatch has no datapoints in the window.
pub async fn fetch_newest(
    upstream: &Upstream<'_>,
    rule: &MetricRule,
    dimensions: &DimensionSet,
    window: ScrapeWindow,
) -> ScrapeResult<Option<Datapoint>> {
    let request = MetricStatisticsRequest {
        namespace: rule.namespace.clone(),
        metric_name: rule.metric_name.clone(),
        dimensions: dimensions.clone(),
        start_time: window.start,
        end_time: window.end,
        period_seconds: rule.period_seconds,
        statistics: rule.statistics.clone(),
        extended_statistics: rule.extended_statistics.clone(),
    };

    let datapoints = upstream.get_metric_statistics(&request).await?;
    Ok(newest_datapoint(datapoints))
}

/// The datapoint with the latest timestamp. On ties the earliest in input
/// order wins.
pub fn newest_datapoint(datapoints: Vec<Datapoint>) -> Option<Datapoint> {
    let mut newest: Option<Datapoint> = None;
    for dp in datapoints {
        if newest.as_ref().is_none_or(|n| dp.timestamp > n.timestamp) {
            newest = Some(dp);
        }
    }
    newest
}
