//! cloudscraped — CloudWatch to Prometheus exporter daemon.
//!
//! # Usage
//!
//! ```text
//! cloudscraped 9106 /etc/cloudscrape/exporter.toml --listen-address 127.0.0.1
//! ```

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use cloudscraped::{Exporter, aws_client_factory, build_router};
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info,cloudscraped=debug,cloudscrape=debug";

#[derive(Parser)]
#[command(name = "cloudscraped", about = "CloudWatch to Prometheus exporter")]
struct Cli {
    /// Port to serve metrics on.
    port: u16,

    /// Path to the TOML configuration file.
    config: PathBuf,

    /// Address to bind.
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    listen_address: IpAddr,

    /// Emit logs as JSON.
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    if cli.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let exporter = Arc::new(Exporter::load(&cli.config, aws_client_factory()).await?);

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── SIGHUP reload ──────────────────────────────────────────

    #[cfg(unix)]
    let sighup_handle = {
        let exporter = exporter.clone();
        tokio::spawn(async move {
            if let Err(e) = cloudscraped::exporter::reload_on_sighup(exporter, shutdown_rx).await {
                error!(error = %e, "SIGHUP handler unavailable");
            }
        })
    };
    #[cfg(not(unix))]
    drop(shutdown_rx);

    // ── HTTP server ────────────────────────────────────────────

    let router = build_router(exporter);
    let addr = SocketAddr::new(cli.listen_address, cli.port);
    info!(%addr, config = %cli.config.display(), "exporter starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for CTRL+C");
            }
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        })
        .await?;

    #[cfg(unix)]
    let _ = sighup_handle.await;

    info!("exporter stopped");
    Ok(())
}
