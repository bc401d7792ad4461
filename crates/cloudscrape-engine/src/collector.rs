//! The active configuration snapshot and the per-request collection entry
//! point used by the exposition layer.

use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use chrono::Utc;
use cloudscrape_core::MetricRule;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::api::CloudWatchApi;
use crate::samples::{MetricFamily, MetricKind, Sample};
use crate::scraper::Scraper;

pub const SCRAPE_DURATION_METRIC: &str = "cloudwatch_exporter_scrape_duration_seconds";
pub const SCRAPE_ERROR_METRIC: &str = "cloudwatch_exporter_scrape_error";
pub const REQUESTS_METRIC: &str = "cloudwatch_requests_total";

/// Rules plus the client and request pool they are scraped with.
///
/// Replaced as a whole on reload; never mutated in place.
pub struct ActiveConfig {
    pub rules: Vec<MetricRule>,
    pub client: Arc<dyn CloudWatchApi>,
    /// Bounds in-flight CloudWatch calls across one scrape.
    pub permits: Semaphore,
}

impl ActiveConfig {
    pub fn new(rules: Vec<MetricRule>, client: Arc<dyn CloudWatchApi>, pool_size: usize) -> Self {
        Self {
            rules,
            client,
            permits: Semaphore::new(pool_size.clamp(1, Semaphore::MAX_PERMITS)),
        }
    }
}

/// Owns the current snapshot and turns scrapes into metric families.
pub struct Collector {
    active: ArcSwap<ActiveConfig>,
    scraper: Scraper,
}

impl Collector {
    pub fn new(active: ActiveConfig) -> Self {
        Self {
            active: ArcSwap::from_pointee(active),
            scraper: Scraper::new(),
        }
    }

    /// Install a new snapshot. Scrapes already running keep the old one.
    pub fn swap(&self, active: ActiveConfig) {
        debug!(rules = active.rules.len(), "swapping active configuration");
        self.active.store(Arc::new(active));
    }

    pub fn active(&self) -> Arc<ActiveConfig> {
        self.active.load_full()
    }

    /// Run one scrape and append the duration and error gauges.
    ///
    /// A failed scrape contributes no families of its own.
    pub async fn collect(&self) -> Vec<MetricFamily> {
        let snapshot = self.active();
        let started = Instant::now();

        let (mut families, failed) = match self.scraper.scrape(&snapshot, Utc::now()).await {
            Ok(families) => (families, false),
            Err(e) => {
                warn!(error = %e, "CloudWatch scrape failed");
                (Vec::new(), true)
            }
        };

        let elapsed = started.elapsed().as_secs_f64();
        families.push(MetricFamily::gauge(
            SCRAPE_DURATION_METRIC,
            "Time this CloudWatch scrape took, in seconds.",
            vec![Sample::unlabelled(SCRAPE_DURATION_METRIC, elapsed)],
        ));
        families.push(MetricFamily::gauge(
            SCRAPE_ERROR_METRIC,
            "Non-zero if this scrape failed.",
            vec![Sample::unlabelled(
                SCRAPE_ERROR_METRIC,
                if failed { 1.0 } else { 0.0 },
            )],
        ));
        families
    }

    /// The upstream request counter as a family.
    pub fn requests_family(&self) -> MetricFamily {
        MetricFamily {
            name: REQUESTS_METRIC.to_string(),
            kind: MetricKind::Counter,
            help: "API requests made to CloudWatch".to_string(),
            samples: vec![Sample::unlabelled(
                REQUESTS_METRIC,
                self.scraper.requests_total() as f64,
            )],
        }
    }
}
