//! [`CloudWatchApi`] on top of the AWS SDK client.

use aws_config::ConfigLoader;
use cloudscrape_engine::{
    ApiFuture, CloudWatchApi, Datapoint, ListMetricsPage, ListMetricsRequest, MetricStatisticsRequest,
};
use tracing::debug;

use crate::convert;
use crate::error::{ClientError, ClientResult};
use crate::settings::{ClientSettings, CredentialSource};

#[derive(Clone)]
pub struct CloudWatchClient {
    inner: aws_sdk_cloudwatch::Client,
}

impl CloudWatchClient {
    /// Client for `settings`. Nothing is fetched until the first call.
    pub async fn connect(settings: &ClientSettings) -> Self {
        Self::from_loader(settings.loader(), &settings.credential_source()).await
    }

    pub async fn from_loader(loader: ConfigLoader, credentials: &CredentialSource) -> Self {
        let base = loader.load().await;
        Self::from_conf(credentials.cloudwatch_config(&base).await)
    }

    pub fn from_conf(config: aws_sdk_cloudwatch::Config) -> Self {
        Self {
            inner: aws_sdk_cloudwatch::Client::from_conf(config),
        }
    }

    pub async fn list_metrics_page(&self, request: &ListMetricsRequest) -> ClientResult<ListMetricsPage> {
        let filters = convert::dimension_filters(&request.dimension_names)?;
        let output = self
            .inner
            .list_metrics()
            .namespace(&request.namespace)
            .metric_name(&request.metric_name)
            .set_dimensions((!filters.is_empty()).then_some(filters))
            .set_next_token(request.next_token.clone())
            .send()
            .await
            .map_err(ClientError::request)?;

        debug!(
            namespace = %request.namespace,
            metric = %request.metric_name,
            metrics = output.metrics().len(),
            "ListMetrics"
        );
        Ok(convert::list_page(output.metrics(), output.next_token()))
    }

    pub async fn metric_statistics(&self, request: &MetricStatisticsRequest) -> ClientResult<Vec<Datapoint>> {
        let period =
            i32::try_from(request.period_seconds).map_err(|_| ClientError::InvalidPeriod(request.period_seconds))?;
        let dimensions = convert::dimensions(&request.dimensions)?;
        let statistics = convert::statistics(&request.statistics);

        let output = self
            .inner
            .get_metric_statistics()
            .namespace(&request.namespace)
            .metric_name(&request.metric_name)
            .set_dimensions((!dimensions.is_empty()).then_some(dimensions))
            .start_time(convert::to_aws_time(request.start_time))
            .end_time(convert::to_aws_time(request.end_time))
            .period(period)
            .set_statistics((!statistics.is_empty()).then_some(statistics))
            .set_extended_statistics(
                (!request.extended_statistics.is_empty()).then(|| request.extended_statistics.clone()),
            )
            .send()
            .await
            .map_err(ClientError::request)?;

        debug!(
            namespace = %request.namespace,
            metric = %request.metric_name,
            datapoints = output.datapoints().len(),
            "GetMetricStatistics"
        );
        Ok(output.datapoints().iter().filter_map(convert::datapoint).collect())
    }
}

impl CloudWatchApi for CloudWatchClient {
    fn list_metrics<'a>(&'a self, request: &'a ListMetricsRequest) -> ApiFuture<'a, ListMetricsPage> {
        Box::pin(async move {
            self.list_metrics_page(request)
                .await
                .map_err(|e| e.into_scrape("ListMetrics"))
        })
    }

    fn get_metric_statistics<'a>(
        &'a self,
        request: &'a MetricStatisticsRequest,
    ) -> ApiFuture<'a, Vec<Datapoint>> {
        Box::pin(async move {
            self.metric_statistics(request)
                .await
                .map_err(|e| e.into_scrape("GetMetricStatistics"))
        })
    }
}
