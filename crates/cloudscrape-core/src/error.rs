//! Error types for configuration loading and rule validation.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that make a configuration (re)load fail.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("must provide region")]
    MissingRegion,

    #[error("must provide metrics")]
    MissingMetrics,

    #[error("metric rule {index}: must provide aws_namespace and aws_metric_name")]
    MissingRuleField { index: usize },

    #[error(
        "metric rule {index}: must not provide aws_dimension_select and aws_dimension_select_regex at the same time"
    )]
    ConflictingDimensionSelect { index: usize },

    #[error("metric rule {index}: unknown statistic {name:?}")]
    UnknownStatistic { index: usize, name: String },

    #[error("metric rule {index}: invalid regex {pattern:?} for dimension {dimension}: {source}")]
    InvalidRegex {
        index: usize,
        dimension: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("thread_pool_size must be between 1 and {}", crate::config::MAX_THREAD_POOL_SIZE)]
    InvalidPoolSize,
}
