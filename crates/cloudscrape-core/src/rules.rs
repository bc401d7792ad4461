//! Metric rules — validated, immutable descriptions of what to scrape.
//!
//! [`build_rules`] turns the raw `[[metrics]]` tables into [`MetricRule`]s,
//! resolving timing defaults (rule → file-wide → built-in) and rejecting
//! contradictory options.

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;

use crate::config::{ExporterConfig, RuleConfig};
use crate::error::{ConfigError, ConfigResult};
use crate::types::DimensionSet;

pub const DEFAULT_PERIOD_SECONDS: u32 = 60;
pub const DEFAULT_RANGE_SECONDS: u32 = 600;
pub const DEFAULT_DELAY_SECONDS: u32 = 600;

/// One of CloudWatch's fixed aggregate statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statistic {
    Sum,
    SampleCount,
    Minimum,
    Maximum,
    Average,
}

impl Statistic {
    /// Requested when a rule names neither standard nor extended statistics.
    pub const DEFAULTS: [Statistic; 5] = [
        Statistic::Sum,
        Statistic::SampleCount,
        Statistic::Minimum,
        Statistic::Maximum,
        Statistic::Average,
    ];

    /// The CloudWatch API name of this statistic.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sum => "Sum",
            Self::SampleCount => "SampleCount",
            Self::Minimum => "Minimum",
            Self::Maximum => "Maximum",
            Self::Average => "Average",
        }
    }

    /// Suffix appended to a rule's base name for this statistic.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::SampleCount => "sample_count",
            Self::Minimum => "minimum",
            Self::Maximum => "maximum",
            Self::Average => "average",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::DEFAULTS.into_iter().find(|s| s.as_str() == name)
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which discovered dimension combinations a rule keeps.
///
/// Only dimensions named in the map are constrained; a candidate passes
/// when every constrained dimension it carries is allowed.
#[derive(Debug, Clone, Default)]
pub enum DimensionSelect {
    #[default]
    All,
    /// Dimension name → allowed literal values.
    ByValue(BTreeMap<String, Vec<String>>),
    /// Dimension name → patterns, any of which must match the whole value.
    ByRegex(BTreeMap<String, Vec<Regex>>),
}

impl DimensionSelect {
    pub fn matches(&self, dimensions: &DimensionSet) -> bool {
        match self {
            Self::All => true,
            Self::ByValue(allowed) => dimensions.iter().all(|d| {
                allowed
                    .get(&d.name)
                    .is_none_or(|values| values.iter().any(|v| *v == d.value))
            }),
            Self::ByRegex(allowed) => dimensions.iter().all(|d| {
                allowed
                    .get(&d.name)
                    .is_none_or(|patterns| patterns.iter().any(|re| re.is_match(&d.value)))
            }),
        }
    }
}

/// A validated metric rule.
#[derive(Debug, Clone)]
pub struct MetricRule {
    pub namespace: String,
    pub metric_name: String,
    /// Dimension names to discover. `None` means a single query without
    /// any dimension breakdown.
    pub dimensions: Option<Vec<String>>,
    pub select: DimensionSelect,
    pub statistics: Vec<Statistic>,
    pub extended_statistics: Vec<String>,
    pub period_seconds: u32,
    pub range_seconds: u32,
    pub delay_seconds: u32,
    pub help: Option<String>,
    /// Attach the CloudWatch datapoint timestamp to emitted samples.
    pub cloudwatch_timestamp: bool,
}

impl MetricRule {
    /// A rule with built-in defaults, mostly useful for tests and tooling.
    pub fn new(namespace: impl Into<String>, metric_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            metric_name: metric_name.into(),
            dimensions: None,
            select: DimensionSelect::All,
            statistics: Statistic::DEFAULTS.to_vec(),
            extended_statistics: Vec::new(),
            period_seconds: DEFAULT_PERIOD_SECONDS,
            range_seconds: DEFAULT_RANGE_SECONDS,
            delay_seconds: DEFAULT_DELAY_SECONDS,
            help: None,
            cloudwatch_timestamp: false,
        }
    }

    pub fn with_dimensions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dimensions = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_select(mut self, select: DimensionSelect) -> Self {
        self.select = select;
        self
    }

    pub fn with_statistics(mut self, statistics: Vec<Statistic>) -> Self {
        self.statistics = statistics;
        self
    }

    pub fn with_extended_statistics<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extended_statistics = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn dimension_names(&self) -> &[String] {
        self.dimensions.as_deref().unwrap_or_default()
    }
}

/// File-wide timing defaults, each falling back to the built-in value.
struct Defaults {
    period: u32,
    range: u32,
    delay: u32,
}

impl Defaults {
    fn from_config(config: &ExporterConfig) -> Self {
        Self {
            period: config.period_seconds.unwrap_or(DEFAULT_PERIOD_SECONDS),
            range: config.range_seconds.unwrap_or(DEFAULT_RANGE_SECONDS),
            delay: config.delay_seconds.unwrap_or(DEFAULT_DELAY_SECONDS),
        }
    }
}

/// Validate the `metrics` list and build the ordered rule set.
pub fn build_rules(config: &ExporterConfig) -> ConfigResult<Vec<MetricRule>> {
    let defaults = Defaults::from_config(config);
    let metrics = config.metrics.as_ref().ok_or(ConfigError::MissingMetrics)?;

    metrics
        .iter()
        .enumerate()
        .map(|(index, raw)| build_rule(index, raw, &defaults))
        .collect()
}

fn build_rule(index: usize, raw: &RuleConfig, defaults: &Defaults) -> ConfigResult<MetricRule> {
    let (Some(namespace), Some(metric_name)) = (&raw.aws_namespace, &raw.aws_metric_name) else {
        return Err(ConfigError::MissingRuleField { index });
    };

    let select = match (&raw.aws_dimension_select, &raw.aws_dimension_select_regex) {
        (Some(_), Some(_)) => return Err(ConfigError::ConflictingDimensionSelect { index }),
        (Some(values), None) => DimensionSelect::ByValue(values.clone()),
        (None, Some(patterns)) => DimensionSelect::ByRegex(compile_patterns(index, patterns)?),
        (None, None) => DimensionSelect::All,
    };

    let statistics = match (&raw.aws_statistics, &raw.aws_extended_statistics) {
        (Some(names), _) => names
            .iter()
            .map(|name| {
                Statistic::parse(name).ok_or_else(|| ConfigError::UnknownStatistic {
                    index,
                    name: name.clone(),
                })
            })
            .collect::<ConfigResult<Vec<_>>>()?,
        // Extended-only rules request no standard statistics.
        (None, Some(_)) => Vec::new(),
        (None, None) => Statistic::DEFAULTS.to_vec(),
    };

    Ok(MetricRule {
        namespace: namespace.clone(),
        metric_name: metric_name.clone(),
        dimensions: raw.aws_dimensions.clone(),
        select,
        statistics,
        extended_statistics: raw.aws_extended_statistics.clone().unwrap_or_default(),
        period_seconds: raw.period_seconds.unwrap_or(defaults.period),
        range_seconds: raw.range_seconds.unwrap_or(defaults.range),
        delay_seconds: raw.delay_seconds.unwrap_or(defaults.delay),
        help: raw.help.clone(),
        cloudwatch_timestamp: raw.cloudwatch_timestamp,
    })
}

fn compile_patterns(
    index: usize,
    patterns: &BTreeMap<String, Vec<String>>,
) -> ConfigResult<BTreeMap<String, Vec<Regex>>> {
    patterns
        .iter()
        .map(|(dimension, list)| {
            let compiled = list
                .iter()
                .map(|pattern| {
                    Regex::new(&format!("^(?:{pattern})$")).map_err(|source| {
                        ConfigError::InvalidRegex {
                            index,
                            dimension: dimension.clone(),
                            pattern: pattern.clone(),
                            source,
                        }
                    })
                })
                .collect::<ConfigResult<Vec<_>>>()?;
            Ok((dimension.clone(), compiled))
        })
        .collect()
}
