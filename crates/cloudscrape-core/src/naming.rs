//! Prometheus name derivation for CloudWatch namespaces, metrics and dimensions.

use crate::rules::MetricRule;

const DYNAMODB_NAMESPACE: &str = "AWS/DynamoDB";
const GSI_DIMENSION: &str = "GlobalSecondaryIndexName";

/// DynamoDB metrics that report per-table totals when queried without the
/// index dimension, so the per-index series needs a distinct name.
const DYNAMODB_INDEX_METRICS: [&str; 6] = [
    "ConsumedReadCapacityUnits",
    "ConsumedWriteCapacityUnits",
    "ProvisionedReadCapacityUnits",
    "ProvisionedWriteCapacityUnits",
    "ReadThrottleEvents",
    "WriteThrottleEvents",
];

/// `RequestCount` → `request_count`.
///
/// An underscore goes between a lowercase letter or digit and a following
/// uppercase letter; the result is lowercased.
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev: Option<char> = None;
    for c in s.chars() {
        if c.is_ascii_uppercase()
            && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit())
        {
            out.push('_');
        }
        out.push(c);
        prev = Some(c);
    }
    out.to_lowercase()
}

/// Replace characters outside `[A-Za-z0-9:_]` with `_` and collapse runs of `_`.
pub fn safe_name(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        let c = if c.is_ascii_alphanumeric() || c == ':' || c == '_' {
            c
        } else {
            '_'
        };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    out
}

/// Metric name prefix shared by every family a rule produces.
pub fn base_name(rule: &MetricRule) -> String {
    let mut name = safe_name(&format!(
        "{}_{}",
        rule.namespace.to_lowercase(),
        to_snake_case(&rule.metric_name)
    ));

    if rule.namespace == DYNAMODB_NAMESPACE
        && rule.dimension_names().iter().any(|d| d == GSI_DIMENSION)
        && DYNAMODB_INDEX_METRICS.contains(&rule.metric_name.as_str())
    {
        name.push_str("_index");
    }
    name
}

/// The `job` label value for a namespace, e.g. `AWS/ELB` → `aws_elb`.
pub fn job_name(namespace: &str) -> String {
    safe_name(&namespace.to_lowercase())
}
