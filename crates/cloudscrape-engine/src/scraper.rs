//! Scrape orchestration across rules and dimension sets.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use cloudscrape_core::MetricRule;
use futures_util::future::try_join_all;

use crate::collector::ActiveConfig;
use crate::discovery::discover;
use crate::error::ScrapeResult;
use crate::fetch::{ScrapeWindow, fetch_newest};
use crate::samples::{MetricFamily, SampleAggregator};
use crate::upstream::Upstream;

/// Runs scrapes and counts the upstream calls they make.
///
/// The counter outlives configuration reloads.
#[derive(Debug, Default)]
pub struct Scraper {
    requests: AtomicU64,
}

impl Scraper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total CloudWatch calls issued by this scraper.
    pub fn requests_total(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Scrape every rule of a snapshot.
    ///
    /// Rules run concurrently and their families are concatenated in rule
    /// order. Any failure fails the whole scrape.
    pub async fn scrape(&self, active: &ActiveConfig, now: DateTime<Utc>) -> ScrapeResult<Vec<MetricFamily>> {
        let upstream = Upstream::new(active.client.as_ref(), &active.permits, &self.requests);

        let per_rule = try_join_all(
            active
                .rules
                .iter()
                .map(|rule| scrape_rule(&upstream, rule, now)),
        )
        .await?;

        Ok(per_rule.into_iter().flatten().collect())
    }
}

async fn scrape_rule(
    upstream: &Upstream<'_>,
    rule: &MetricRule,
    now: DateTime<Utc>,
) -> ScrapeResult<Vec<MetricFamily>> {
    let dimension_sets = discover(upstream, rule).await?;
    let window = ScrapeWindow::for_rule(rule, now);

    // Joined results keep discovery order, not completion order.
    let datapoints = try_join_all(
        dimension_sets
            .iter()
            .map(|set| fetch_newest(upstream, rule, set, window)),
    )
    .await?;

    let mut aggregator = SampleAggregator::new(rule);
    for (set, datapoint) in dimension_sets.iter().zip(datapoints) {
        if let Some(datapoint) = datapoint {
            aggregator.add(set, &datapoint);
        }
    }
    Ok(aggregator.into_families())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cloudscrape_core::{DimensionSet, Statistic};

    use super::*;
    use crate::api::Datapoint;
    use crate::testing::MockCloudWatch;

    #[tokio::test]
    async fn families_follow_rule_order() {
        let mock = MockCloudWatch::new()
            .with_datapoints(
                "AWS/SQS",
                "NumberOfMessagesSent",
                DimensionSet::empty(),
                vec![Datapoint::new(Utc::now()).with_value(Statistic::Sum, 1.0)],
            )
            .with_datapoints(
                "AWS/ELB",
                "RequestCount",
                DimensionSet::empty(),
                vec![Datapoint::new(Utc::now()).with_value(Statistic::Sum, 2.0)],
            );

        let rules = vec![
            MetricRule::new("AWS/SQS", "NumberOfMessagesSent"),
            MetricRule::new("AWS/ELB", "RequestCount"),
        ];
        let active = ActiveConfig::new(rules, Arc::new(mock), 4);
        let scraper = Scraper::new();

        let families = scraper.scrape(&active, Utc::now()).await.unwrap();
        let names: Vec<_> = families.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            ["aws_sqs_number_of_messages_sent_sum", "aws_elb_request_count_sum"]
        );
        assert_eq!(scraper.requests_total(), 2);
    }
}
