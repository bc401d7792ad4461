//! cloudscrape-core — configuration and rule model for cloudscrape.
//!
//! Parses the exporter's TOML configuration, validates it into an ordered
//! list of [`MetricRule`]s, and provides the naming helpers that map
//! CloudWatch namespaces, metric names and dimensions onto Prometheus
//! metric and label names.
//!
//! # Architecture
//!
//! ```text
//! exporter.toml
//!   └── ExporterConfig::parse()       raw serde view, every field optional
//!         └── build_rules()           defaults + validation → Vec<MetricRule>
//!
//! naming
//!   ├── to_snake_case() / safe_name()
//!   └── base_name(rule)               e.g. aws_elb_request_count
//! ```

pub mod config;
pub mod error;
pub mod naming;
pub mod rules;
pub mod types;

pub use config::{ExporterConfig, RuleConfig};
pub use error::{ConfigError, ConfigResult};
pub use naming::{base_name, job_name, safe_name, to_snake_case};
pub use rules::{DimensionSelect, MetricRule, Statistic, build_rules};
pub use types::{Dimension, DimensionSet};
