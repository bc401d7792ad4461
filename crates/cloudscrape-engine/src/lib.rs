//! cloudscrape-engine — turns metric rules into Prometheus metric families.
//!
//! Each scrape is a single stateless pass over the active rule set:
//! discover the dimension combinations of every rule, fetch the newest
//! statistics datapoint for each combination, and fold the results into
//! gauge families named after the rule.
//!
//! # Architecture
//!
//! ```text
//! Collector
//!   ├── ArcSwap<ActiveConfig>        rules + client, swapped on reload
//!   └── collect()
//!         └── Scraper::scrape()      rules in parallel
//!               ├── discover()       paginated ListMetrics + selection
//!               ├── fetch_newest()   GetMetricStatistics per DimensionSet, in parallel
//!               └── SampleAggregator → Vec<MetricFamily>
//!
//! Prometheus exposition
//!   └── render_prometheus() → text/plain for /metrics
//! ```
//!
//! Upstream calls go through [`Upstream`], which bounds the number of
//! in-flight requests with a semaphore and counts every call made.

pub mod api;
pub mod collector;
pub mod discovery;
pub mod error;
pub mod fetch;
pub mod prometheus;
pub mod samples;
pub mod scraper;
pub mod testing;
pub mod upstream;

pub use api::{ApiFuture, CloudWatchApi, Datapoint, ListMetricsPage, ListMetricsRequest, MetricStatisticsRequest};
pub use collector::{ActiveConfig, Collector};
pub use discovery::discover;
pub use error::{ScrapeError, ScrapeResult};
pub use fetch::{ScrapeWindow, fetch_newest, newest_datapoint};
pub use prometheus::render_prometheus;
pub use samples::{MetricFamily, MetricKind, Sample, SampleAggregator};
pub use scraper::Scraper;
pub use upstream::Upstream;
