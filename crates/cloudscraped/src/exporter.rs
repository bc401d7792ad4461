//! Configuration loading, reload and metric rendering.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Context;
use cloudscrape_aws::{ClientSettings, CloudWatchClient};
use cloudscrape_core::{ConfigError, ConfigResult, ExporterConfig, build_rules};
use cloudscrape_engine::{ActiveConfig, CloudWatchApi, Collector, render_prometheus};
use tracing::{info, warn};

pub type ClientFuture = Pin<Box<dyn Future<Output = anyhow::Result<Arc<dyn CloudWatchApi>>> + Send>>;

/// Builds the upstream client for a freshly loaded configuration.
pub type ClientFactory = Arc<dyn Fn(ClientSettings) -> ClientFuture + Send + Sync>;

/// SDK clients using the default credential chain, or `role_arn` when set.
pub fn aws_client_factory() -> ClientFactory {
    Arc::new(|settings: ClientSettings| -> ClientFuture {
        Box::pin(async move {
            let client = CloudWatchClient::connect(&settings).await;
            anyhow::Ok(Arc::new(client) as Arc<dyn CloudWatchApi>)
        })
    })
}

pub fn client_settings(config: &ExporterConfig) -> ConfigResult<ClientSettings> {
    let settings = ClientSettings::new(config.region()?);
    Ok(match &config.role_arn {
        Some(role_arn) => settings.with_role_arn(role_arn.clone()),
        None => settings,
    })
}

pub async fn read_config(path: &Path) -> ConfigResult<ExporterConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    ExporterConfig::parse(&content)
}

/// Read, validate and assemble a complete snapshot from `path`.
pub async fn load_active(path: &Path, factory: &ClientFactory) -> anyhow::Result<ActiveConfig> {
    let config = read_config(path).await?;
    let settings = client_settings(&config)?;
    let rules = build_rules(&config)?;
    let pool_size = config.thread_pool_size()?;
    let assume_role = settings.role_arn.is_some();
    let client = factory(settings).await.context("creating CloudWatch client")?;

    info!(path = %path.display(), rules = rules.len(), pool_size, assume_role, "configuration loaded");
    Ok(ActiveConfig::new(rules, client, pool_size))
}

pub struct Exporter {
    config_path: PathBuf,
    factory: ClientFactory,
    collector: Collector,
}

impl Exporter {
    pub async fn load(config_path: impl Into<PathBuf>, factory: ClientFactory) -> anyhow::Result<Self> {
        let config_path = config_path.into();
        let active = load_active(&config_path, &factory).await?;
        Ok(Self {
            config_path,
            factory,
            collector: Collector::new(active),
        })
    }

    /// Re-read the config file. On failure the current snapshot stays active.
    pub async fn reload(&self) -> anyhow::Result<()> {
        match load_active(&self.config_path, &self.factory).await {
            Ok(active) => {
                self.collector.swap(active);
                info!("configuration reloaded");
                Ok(())
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "configuration reload failed, keeping previous");
                Err(e)
            }
        }
    }

    pub fn collector(&self) -> &Collector {
        &self.collector
    }

    /// Scrape once and render the exposition body.
    pub async fn render_metrics(&self) -> String {
        let mut families = self.collector.collect().await;
        families.push(self.collector.requests_family());
        render_prometheus(&families)
    }
}

/// Reload on every SIGHUP until shutdown.
#[cfg(unix)]
pub async fn reload_on_sighup(
    exporter: Arc<Exporter>,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangup = signal(SignalKind::hangup())?;
    loop {
        tokio::select! {
            received = hangup.recv() => {
                if received.is_none() {
                    break;
                }
                info!("SIGHUP received");
                // Failures are logged by reload and the old snapshot stays.
                let _ = exporter.reload().await;
            }
            _ = shutdown.changed() => break,
        }
    }
    Ok(())
}
