//! Sample assembly: folds (dimension set, datapoint) pairs for one rule
//! into metric families.

use cloudscrape_core::{DimensionSet, MetricRule, Statistic, base_name, job_name, safe_name, to_snake_case};

use crate::api::Datapoint;

/// Prometheus metric type of an emitted family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gauge => "gauge",
            Self::Counter => "counter",
        }
    }
}

/// One labelled value.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub name: String,
    pub label_names: Vec<String>,
    pub label_values: Vec<String>,
    pub value: f64,
    /// Milliseconds since the epoch; `None` lets the scraper stamp it.
    pub timestamp_ms: Option<i64>,
}

impl Sample {
    pub fn unlabelled(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            label_names: Vec::new(),
            label_values: Vec::new(),
            value,
            timestamp_ms: None,
        }
    }
}

/// A named, typed, documented group of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricFamily {
    pub name: String,
    pub kind: MetricKind,
    pub help: String,
    pub samples: Vec<Sample>,
}

impl MetricFamily {
    pub fn gauge(name: impl Into<String>, help: impl Into<String>, samples: Vec<Sample>) -> Self {
        Self {
            name: name.into(),
            kind: MetricKind::Gauge,
            help: help.into(),
            samples,
        }
    }
}

/// Per-rule sample buckets, one per statistic kind.
///
/// Standard kinds keep a fixed order; extended kinds are ordered by first
/// appearance. Within a bucket samples keep insertion order.
pub struct SampleAggregator<'r> {
    rule: &'r MetricRule,
    base_name: String,
    job: String,
    standard: [Vec<Sample>; 5],
    extended: Vec<(String, Vec<Sample>)>,
    unit: Option<String>,
}

impl<'r> SampleAggregator<'r> {
    pub fn new(rule: &'r MetricRule) -> Self {
        Self {
            rule,
            base_name: base_name(rule),
            job: job_name(&rule.namespace),
            standard: Default::default(),
            extended: Vec::new(),
            unit: None,
        }
    }

    pub fn add(&mut self, dimensions: &DimensionSet, datapoint: &Datapoint) {
        let mut label_names = Vec::with_capacity(dimensions.len() + 2);
        let mut label_values = Vec::with_capacity(dimensions.len() + 2);
        label_names.push("job".to_string());
        label_values.push(self.job.clone());
        label_names.push("instance".to_string());
        label_values.push(String::new());
        for d in dimensions {
            label_names.push(safe_name(&to_snake_case(&d.name)));
            label_values.push(d.value.clone());
        }

        let timestamp_ms = self
            .rule
            .cloudwatch_timestamp
            .then(|| datapoint.timestamp.timestamp_millis());

        let sample = |name: String, value: f64| Sample {
            name,
            label_names: label_names.clone(),
            label_values: label_values.clone(),
            value,
            timestamp_ms,
        };

        for (slot, statistic) in Statistic::DEFAULTS.into_iter().enumerate() {
            if let Some(value) = datapoint.value(statistic) {
                let name = format!("{}_{}", self.base_name, statistic.suffix());
                self.standard[slot].push(sample(name, value));
            }
        }

        for (key, value) in &datapoint.extended_statistics {
            let name = format!("{}_{}", self.base_name, safe_name(&to_snake_case(key)));
            let s = sample(name, *value);
            match self.extended.iter_mut().find(|(k, _)| k == key) {
                Some((_, bucket)) => bucket.push(s),
                None => self.extended.push((key.clone(), vec![s])),
            }
        }

        if datapoint.unit.is_some() {
            self.unit = datapoint.unit.clone();
        }
    }

    /// Emit one gauge family per non-empty bucket.
    pub fn into_families(self) -> Vec<MetricFamily> {
        let mut families = Vec::new();

        for (statistic, samples) in Statistic::DEFAULTS.into_iter().zip(self.standard.iter()) {
            if samples.is_empty() {
                continue;
            }
            families.push(MetricFamily::gauge(
                format!("{}_{}", self.base_name, statistic.suffix()),
                self.help(statistic.as_str()),
                samples.clone(),
            ));
        }

        for (key, samples) in &self.extended {
            families.push(MetricFamily::gauge(
                format!("{}_{}", self.base_name, safe_name(&to_snake_case(key))),
                self.help(key),
                samples.clone(),
            ));
        }

        families
    }

    fn help(&self, statistic: &str) -> String {
        if let Some(help) = &self.rule.help {
            return help.clone();
        }
        format!(
            "CloudWatch metric {} {} Dimensions: [{}] Statistic: {} Unit: {}",
            self.rule.namespace,
            self.rule.metric_name,
            self.rule.dimension_names().join(", "),
            statistic,
            self.unit.as_deref().unwrap_or("None"),
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use cloudscrape_core::Dimension;

    use super::*;

    fn elb_rule() -> MetricRule {
        MetricRule::new("AWS/ELB", "RequestCount").with_dimensions(["AvailabilityZone", "LoadBalancerName"])
    }

    fn dims(zone: &str, lb: &str) -> DimensionSet {
        DimensionSet::from(vec![
            Dimension::new("AvailabilityZone", zone),
            Dimension::new("LoadBalancerName", lb),
        ])
    }

    #[test]
    fn labels_are_job_instance_then_dimensions() {
        let rule = elb_rule();
        let mut agg = SampleAggregator::new(&rule);
        let dp = Datapoint::new(Utc::now()).with_value(Statistic::Average, 2.0);
        agg.add(&dims("a", "myLB"), &dp);

        let families = agg.into_families();
        assert_eq!(families.len(), 1);
        let sample = &families[0].samples[0];
        assert_eq!(sample.name, "aws_elb_request_count_average");
        assert_eq!(
            sample.label_names,
            ["job", "instance", "availability_zone", "load_balancer_name"]
        );
        assert_eq!(sample.label_values, ["aws_elb", "", "a", "myLB"]);
        assert_eq!(sample.timestamp_ms, None);
    }

    #[test]
    fn absent_statistics_emit_no_family() {
        let rule = elb_rule();
        let mut agg = SampleAggregator::new(&rule);
        let dp = Datapoint::new(Utc::now())
            .with_value(Statistic::Sum, 1.0)
            .with_value(Statistic::Maximum, 4.0);
        agg.add(&dims("a", "myLB"), &dp);

        let names: Vec<_> = agg.into_families().into_iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            ["aws_elb_request_count_sum", "aws_elb_request_count_maximum"]
        );
    }

    #[test]
    fn extended_keys_are_sanitized_in_first_seen_order() {
        let rule = elb_rule();
        let mut agg = SampleAggregator::new(&rule);
        agg.add(
            &dims("a", "x"),
            &Datapoint::new(Utc::now()).with_extended("p99.99", 9.0),
        );
        agg.add(
            &dims("b", "y"),
            &Datapoint::new(Utc::now())
                .with_extended("p95", 5.0)
                .with_extended("p99.99", 8.0),
        );

        let families = agg.into_families();
        let names: Vec<_> = families.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            ["aws_elb_request_count_p99_99", "aws_elb_request_count_p95"]
        );
        assert_eq!(families[0].samples.len(), 2);
    }

    #[test]
    fn generated_help_includes_unit() {
        let rule = elb_rule();
        let mut agg = SampleAggregator::new(&rule);
        agg.add(
            &dims("a", "x"),
            &Datapoint::new(Utc::now())
                .with_unit("Count")
                .with_value(Statistic::Sum, 1.0),
        );

        let families = agg.into_families();
        assert_eq!(
            families[0].help,
            "CloudWatch metric AWS/ELB RequestCount Dimensions: [AvailabilityZone, LoadBalancerName] Statistic: Sum Unit: Count"
        );
    }

    #[test]
    fn help_override_and_missing_unit() {
        let mut rule = MetricRule::new("AWS/SQS", "NumberOfMessagesSent");
        let mut agg = SampleAggregator::new(&rule);
        agg.add(
            &DimensionSet::empty(),
            &Datapoint::new(Utc::now()).with_value(Statistic::Sum, 1.0),
        );
        assert_eq!(
            agg.into_families()[0].help,
            "CloudWatch metric AWS/SQS NumberOfMessagesSent Dimensions: [] Statistic: Sum Unit: None"
        );

        rule.help = Some("Messages sent".to_string());
        let mut agg = SampleAggregator::new(&rule);
        agg.add(
            &DimensionSet::empty(),
            &Datapoint::new(Utc::now()).with_value(Statistic::Sum, 1.0),
        );
        assert_eq!(agg.into_families()[0].help, "Messages sent");
    }

    #[test]
    fn timestamp_propagates_when_enabled() {
        let mut rule = elb_rule();
        rule.cloudwatch_timestamp = true;
        let ts = Utc.timestamp_opt(1_700_000_000, 0).single().unwrap();

        let mut agg = SampleAggregator::new(&rule);
        agg.add(
            &dims("a", "x"),
            &Datapoint::new(ts).with_value(Statistic::Sum, 1.0),
        );

        let families = agg.into_families();
        assert_eq!(families[0].samples[0].timestamp_ms, Some(1_700_000_000_000));
    }
}
