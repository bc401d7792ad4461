//! cloudscrape-aws — CloudWatch client for the scrape engine.
//!
//! Wraps the AWS SDK CloudWatch client and implements
//! [`cloudscrape_engine::CloudWatchApi`].
//!
//! # Architecture
//!
//! ```text
//! CloudWatchClient
//!   ├── ClientSettings      region, optional role_arn, optional endpoint override
//!   │     └── aws-config    default provider chain (env, profile, web identity, ECS, IMDS)
//!   │           └── STS     AssumeRole when role_arn is set
//!   ├── convert             SDK shapes <-> engine types
//!   └── aws-sdk-cloudwatch  ListMetrics / GetMetricStatistics
//! ```

pub mod client;
pub mod convert;
pub mod error;
pub mod settings;

pub use client::CloudWatchClient;
pub use error::{ClientError, ClientResult};
pub use settings::{ASSUME_ROLE_SESSION_NAME, ClientSettings, CredentialSource};
