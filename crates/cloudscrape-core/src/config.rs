//! exporter.toml configuration parser.
//!
//! Every field is optional at this layer so that validation can report
//! missing keys as [`ConfigError`]s instead of opaque parse failures.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ConfigError, ConfigResult};

/// Default number of concurrent CloudWatch API calls.
pub const DEFAULT_THREAD_POOL_SIZE: usize = 50;

/// Largest accepted `thread_pool_size`.
pub const MAX_THREAD_POOL_SIZE: usize = 4096;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExporterConfig {
    pub region: Option<String>,
    /// IAM role to assume for every CloudWatch call.
    pub role_arn: Option<String>,
    pub period_seconds: Option<u32>,
    pub range_seconds: Option<u32>,
    pub delay_seconds: Option<u32>,
    pub thread_pool_size: Option<usize>,
    pub metrics: Option<Vec<RuleConfig>>,
}

/// One `[[metrics]]` table, as written by the user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    pub aws_namespace: Option<String>,
    pub aws_metric_name: Option<String>,
    pub aws_dimensions: Option<Vec<String>>,
    pub aws_dimension_select: Option<BTreeMap<String, Vec<String>>>,
    pub aws_dimension_select_regex: Option<BTreeMap<String, Vec<String>>>,
    pub aws_statistics: Option<Vec<String>>,
    pub aws_extended_statistics: Option<Vec<String>>,
    pub period_seconds: Option<u32>,
    pub range_seconds: Option<u32>,
    pub delay_seconds: Option<u32>,
    pub help: Option<String>,
    #[serde(default)]
    pub cloudwatch_timestamp: bool,
}

impl ExporterConfig {
    pub fn parse(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// The AWS region to query. Required.
    pub fn region(&self) -> ConfigResult<&str> {
        self.region.as_deref().ok_or(ConfigError::MissingRegion)
    }

    /// Upper bound on in-flight CloudWatch requests.
    pub fn thread_pool_size(&self) -> ConfigResult<usize> {
        match self.thread_pool_size {
            Some(n) if (1..=MAX_THREAD_POOL_SIZE).contains(&n) => Ok(n),
            Some(_) => Err(ConfigError::InvalidPoolSize),
            None => Ok(DEFAULT_THREAD_POOL_SIZE),
        }
    }
}
