//! Bounded access to the upstream API.
//!
//! Every CloudWatch call made during a scrape goes through [`Upstream`],
//! which holds a semaphore permit for the duration of the call and bumps
//! the process-wide request counter.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Semaphore;

use crate::api::{CloudWatchApi, Datapoint, ListMetricsPage, ListMetricsRequest, MetricStatisticsRequest};
use crate::error::{ScrapeError, ScrapeResult};

/// A client handle plus the pool that bounds its in-flight calls.
pub struct Upstream<'a> {
    client: &'a dyn CloudWatchApi,
    permits: &'a Semaphore,
    requests: &'a AtomicU64,
}

impl<'a> Upstream<'a> {
    pub fn new(client: &'a dyn CloudWatchApi, permits: &'a Semaphore, requests: &'a AtomicU64) -> Self {
        Self {
            client,
            permits,
            requests,
        }
    }

    pub async fn list_metrics(&self, request: &ListMetricsRequest) -> ScrapeResult<ListMetricsPage> {
        let _permit = self.permits.acquire().await.map_err(|_| ScrapeError::PoolClosed)?;
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.client.list_metrics(request).await
    }

    pub async fn get_metric_statistics(
        &self,
        request: &MetricStatisticsRequest,
    ) -> ScrapeResult<Vec<Datapoint>> {
        let _permit = self.permits.acquire().await.map_err(|_| ScrapeError::PoolClosed)?;
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.client.get_metric_statistics(request).await
    }
}
