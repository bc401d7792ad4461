//! A scripted in-memory [`CloudWatchApi`] for tests.
//!
//! List responses are split into pages whose continuation tokens are
//! `page-1`, `page-2`, ...; statistics responses are keyed by the exact
//! dimension set requested. Unscripted calls return empty results.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use cloudscrape_core::DimensionSet;

use crate::api::{
    ApiFuture, CloudWatchApi, Datapoint, ListMetricsPage, ListMetricsRequest, MetricStatisticsRequest,
};
use crate::error::ScrapeError;

type MetricKey = (String, String);

#[derive(Default)]
pub struct MockCloudWatch {
    pages: HashMap<MetricKey, Vec<Vec<DimensionSet>>>,
    datapoints: HashMap<(String, String, DimensionSet), Vec<Datapoint>>,
    failing_lists: HashSet<MetricKey>,
    failing_statistics: HashSet<MetricKey>,
    delays: HashMap<DimensionSet, Duration>,
    list_requests: Mutex<Vec<ListMetricsRequest>>,
    statistics_requests: Mutex<Vec<MetricStatisticsRequest>>,
}

fn key(namespace: &str, metric_name: &str) -> MetricKey {
    (namespace.to_string(), metric_name.to_string())
}

impl MockCloudWatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the `ListMetrics` pages for one metric, in order.
    pub fn with_list_pages(mut self, namespace: &str, metric_name: &str, pages: Vec<Vec<DimensionSet>>) -> Self {
        self.pages.insert(key(namespace, metric_name), pages);
        self
    }

    /// Script the datapoints returned for one dimension set.
    pub fn with_datapoints(
        mut self,
        namespace: &str,
        metric_name: &str,
        dimensions: DimensionSet,
        datapoints: Vec<Datapoint>,
    ) -> Self {
        self.datapoints.insert(
            (namespace.to_string(), metric_name.to_string(), dimensions),
            datapoints,
        );
        self
    }

    pub fn fail_list_metrics(mut self, namespace: &str, metric_name: &str) -> Self {
        self.failing_lists.insert(key(namespace, metric_name));
        self
    }

    pub fn fail_statistics(mut self, namespace: &str, metric_name: &str) -> Self {
        self.failing_statistics.insert(key(namespace, metric_name));
        self
    }

    /// Hold `GetMetricStatistics` responses for `dimensions` back by `delay`.
    pub fn with_statistics_delay(mut self, dimensions: DimensionSet, delay: Duration) -> Self {
        self.delays.insert(dimensions, delay);
        self
    }

    /// Every `ListMetrics` request received, in arrival order.
    pub fn list_requests(&self) -> Vec<ListMetricsRequest> {
        self.list_requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Every `GetMetricStatistics` request received, in arrival order.
    pub fn statistics_requests(&self) -> Vec<MetricStatisticsRequest> {
        self.statistics_requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn page(&self, request: &ListMetricsRequest) -> Result<ListMetricsPage, ScrapeError> {
        let k = key(&request.namespace, &request.metric_name);
        if self.failing_lists.contains(&k) {
            return Err(ScrapeError::upstream("ListMetrics", "injected failure"));
        }

        let Some(pages) = self.pages.get(&k) else {
            return Ok(ListMetricsPage::default());
        };
        let index = match &request.next_token {
            None => 0,
            Some(token) => token
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| ScrapeError::upstream("ListMetrics", format!("bad token {token}")))?,
        };

        let metrics = pages.get(index).cloned().unwrap_or_default();
        let next_token = (index + 1 < pages.len()).then(|| format!("page-{}", index + 1));
        Ok(ListMetricsPage { metrics, next_token })
    }

    fn statistics(&self, request: &MetricStatisticsRequest) -> Result<Vec<Datapoint>, ScrapeError> {
        if self
            .failing_statistics
            .contains(&key(&request.namespace, &request.metric_name))
        {
            return Err(ScrapeError::upstream("GetMetricStatistics", "injected failure"));
        }
        let k = (
            request.namespace.clone(),
            request.metric_name.clone(),
            request.dimensions.clone(),
        );
        Ok(self.datapoints.get(&k).cloned().unwrap_or_default())
    }
}

impl CloudWatchApi for MockCloudWatch {
    fn list_metrics<'a>(&'a self, request: &'a ListMetricsRequest) -> ApiFuture<'a, ListMetricsPage> {
        Box::pin(async move {
            self.list_requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(request.clone());
            self.page(request)
        })
    }

    fn get_metric_statistics<'a>(
        &'a self,
        request: &'a MetricStatisticsRequest,
    ) -> ApiFuture<'a, Vec<Datapoint>> {
        Box::pin(async move {
            self.statistics_requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(request.clone());
            if let Some(delay) = self.delays.get(&request.dimensions) {
                tokio::time::sleep(*delay).await;
            }
            self.statistics(request)
        })
    }
}
