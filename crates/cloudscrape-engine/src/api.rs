//! The upstream metrics API consumed by the scraper.
//!
//! [`CloudWatchApi`] is the seam between the engine and the network: the
//! `cloudscrape-aws` crate implements it over HTTPS, tests implement it
//! with [`crate::testing::MockCloudWatch`].

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use cloudscrape_core::{DimensionSet, Statistic};

use crate::error::ScrapeResult;

/// Boxed future returned by [`CloudWatchApi`] calls.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = ScrapeResult<T>> + Send + 'a>>;

/// Asynchronous CloudWatch operations used by a scrape.
pub trait CloudWatchApi: Send + Sync {
    /// Fetch one page of metrics matching the request's name-only
    /// dimension filters.
    fn list_metrics<'a>(&'a self, request: &'a ListMetricsRequest) -> ApiFuture<'a, ListMetricsPage>;

    /// Fetch the statistics datapoints for one concrete dimension set.
    fn get_metric_statistics<'a>(
        &'a self,
        request: &'a MetricStatisticsRequest,
    ) -> ApiFuture<'a, Vec<Datapoint>>;
}

/// A `ListMetrics` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMetricsRequest {
    pub namespace: String,
    pub metric_name: String,
    /// Dimension names the metrics must carry; values are not constrained.
    pub dimension_names: Vec<String>,
    pub next_token: Option<String>,
}

/// One page of a `ListMetrics` response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListMetricsPage {
    /// The dimension combination of each returned metric, in response order.
    pub metrics: Vec<DimensionSet>,
    /// Present when more pages follow.
    pub next_token: Option<String>,
}

/// A `GetMetricStatistics` call bound to one dimension set.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricStatisticsRequest {
    pub namespace: String,
    pub metric_name: String,
    pub dimensions: DimensionSet,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub period_seconds: u32,
    pub statistics: Vec<Statistic>,
    pub extended_statistics: Vec<String>,
}

/// One aggregated statistics result.
///
/// Each standard statistic is present only when CloudWatch returned it.
#[derive(Debug, Clone, PartialEq)]
pub struct Datapoint {
    pub timestamp: DateTime<Utc>,
    pub unit: Option<String>,
    pub sum: Option<f64>,
    pub sample_count: Option<f64>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub average: Option<f64>,
    pub extended_statistics: BTreeMap<String, f64>,
}

impl Datapoint {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            unit: None,
            sum: None,
            sample_count: None,
            minimum: None,
            maximum: None,
            average: None,
            extended_statistics: BTreeMap::new(),
        }
    }

    /// The value of a standard statistic, if present.
    pub fn value(&self, statistic: Statistic) -> Option<f64> {
        match statistic {
            Statistic::Sum => self.sum,
            Statistic::SampleCount => self.sample_count,
            Statistic::Minimum => self.minimum,
            Statistic::Maximum => self.maximum,
            Statistic::Average => self.average,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_value(mut self, statistic: Statistic, value: f64) -> Self {
        let slot = match statistic {
            Statistic::Sum => &mut self.sum,
            Statistic::SampleCount => &mut self.sample_count,
            Statistic::Minimum => &mut self.minimum,
            Statistic::Maximum => &mut self.maximum,
            Statistic::Average => &mut self.average,
        };
        *slot = Some(value);
        self
    }

    pub fn with_extended(mut self, key: impl Into<String>, value: f64) -> Self {
        self.extended_statistics.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_reads_the_matching_field() {
        let dp = Datapoint::new(Utc::now())
            .with_value(Statistic::Sum, 1.0)
            .with_value(Statistic::Average, 5.0);

        assert_eq!(dp.value(Statistic::Sum), Some(1.0));
        assert_eq!(dp.value(Statistic::Average), Some(5.0));
        assert_eq!(dp.value(Statistic::Maximum), None);
    }
}
