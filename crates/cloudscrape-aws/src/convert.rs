//! Mapping between SDK shapes and engine types.

use aws_sdk_cloudwatch::primitives::DateTime as AwsDateTime;
use aws_sdk_cloudwatch::types::{
    Datapoint as AwsDatapoint, Dimension as AwsDimension, DimensionFilter, Metric, Statistic as AwsStatistic,
};
use chrono::{DateTime, Utc};
use cloudscrape_core::{Dimension, DimensionSet, Statistic};
use cloudscrape_engine::{Datapoint, ListMetricsPage};

use crate::error::ClientResult;

/// Name-only filters: any value of each listed dimension matches.
pub fn dimension_filters(names: &[String]) -> ClientResult<Vec<DimensionFilter>> {
    names
        .iter()
        .map(|name| Ok(DimensionFilter::builder().name(name).build()))
        .collect()
}

pub fn dimensions(set: &DimensionSet) -> ClientResult<Vec<AwsDimension>> {
    set.iter()
        .map(|d| {
            Ok(AwsDimension::builder()
                .name(&d.name)
                .value(&d.value)
                .build())
        })
        .collect()
}

pub fn statistics(statistics: &[Statistic]) -> Vec<AwsStatistic> {
    statistics.iter().map(|s| AwsStatistic::from(s.as_str())).collect()
}

pub fn to_aws_time(time: DateTime<Utc>) -> AwsDateTime {
    AwsDateTime::from_secs(time.timestamp())
}

pub fn from_aws_time(time: &AwsDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(time.secs(), time.subsec_nanos())
}

pub fn list_page(metrics: &[Metric], next_token: Option<&str>) -> ListMetricsPage {
    ListMetricsPage {
        metrics: metrics
            .iter()
            .map(|m| {
                m.dimensions()
                    .iter()
                    .map(|d| Dimension::new(d.name(), d.value()))
                    .collect::<DimensionSet>()
            })
            .collect(),
        next_token: next_token.filter(|t| !t.is_empty()).map(str::to_string),
    }
}

/// `None` for datapoints without a usable timestamp.
pub fn datapoint(dp: &AwsDatapoint) -> Option<Datapoint> {
    let timestamp = from_aws_time(dp.timestamp()?)?;
    Some(Datapoint {
        timestamp,
        unit: dp.unit().map(|u| u.as_str().to_string()),
        sum: dp.sum(),
        sample_count: dp.sample_count(),
        minimum: dp.minimum(),
        maximum: dp.maximum(),
        average: dp.average(),
        extended_statistics: dp
            .extended_statistics()
            .map(|stats| stats.iter().map(|(k, v)| (k.clone(), *v)).collect())
            .unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use aws_sdk_cloudwatch::types::StandardUnit;
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn filters_carry_names_only() {
        let filters = dimension_filters(&["LoadBalancerName".to_string()]).unwrap();
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].name(), "LoadBalancerName");
        assert_eq!(filters[0].value(), None);
    }

    #[test]
    fn dimensions_keep_order() {
        let set = DimensionSet::from(vec![
            Dimension::new("AvailabilityZone", "a"),
            Dimension::new("LoadBalancerName", "myLB"),
        ]);
        let dims = dimensions(&set).unwrap();
        let pairs: Vec<_> = dims.iter().map(|d| (d.name(), d.value())).collect();
        assert_eq!(pairs, [("AvailabilityZone", "a"), ("LoadBalancerName", "myLB")]);
    }

    #[test]
    fn statistics_use_wire_names() {
        let stats = statistics(&[Statistic::SampleCount, Statistic::Average]);
        assert_eq!(stats, [AwsStatistic::SampleCount, AwsStatistic::Average]);
    }

    #[test]
    fn times_use_epoch_seconds() {
        let time = Utc.timestamp_opt(1_700_000_000, 0).single().unwrap();
        let aws = to_aws_time(time);
        assert_eq!(aws.secs(), 1_700_000_000);
        assert_eq!(from_aws_time(&aws), Some(time));
    }

    #[test]
    fn list_page_maps_dimensions_and_drops_empty_token() {
        let metric = Metric::builder()
            .namespace("AWS/ELB")
            .metric_name("RequestCount")
            .dimensions(
                AwsDimension::builder()
                    .name("LoadBalancerName")
                    .value("myLB")
                    .build()
                    .unwrap(),
            )
            .build();

        let page = list_page(&[metric.clone()], Some("more"));
        assert_eq!(
            page.metrics,
            vec![DimensionSet::from(vec![Dimension::new("LoadBalancerName", "myLB")])]
        );
        assert_eq!(page.next_token.as_deref(), Some("more"));

        assert!(list_page(&[metric], Some("")).next_token.is_none());
    }

    #[test]
    fn datapoint_fields_are_copied() {
        let dp = AwsDatapoint::builder()
            .timestamp(AwsDateTime::from_secs(1_700_000_000))
            .unit(StandardUnit::Seconds)
            .average(0.25)
            .extended_statistics("p99", 1.5)
            .build();

        let dp = datapoint(&dp).unwrap();
        assert_eq!(dp.timestamp.timestamp(), 1_700_000_000);
        assert_eq!(dp.unit.as_deref(), Some("Seconds"));
        assert_eq!(dp.average, Some(0.25));
        assert_eq!(dp.sum, None);
        assert_eq!(dp.extended_statistics.get("p99"), Some(&1.5));
    }

    #[test]
    fn datapoint_without_timestamp_is_skipped() {
        let dp = AwsDatapoint::builder().sum(3.0).build();
        assert!(datapoint(&dp).is_none());
    }
}
