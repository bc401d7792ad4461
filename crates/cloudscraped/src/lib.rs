//! cloudscraped — HTTP surface and reload handling for the exporter.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/` | Home page |
//! | GET | `/metrics` | Run a scrape, Prometheus exposition |
//! | POST | `/-/reload` | Re-read the config file |
//!
//! # Architecture
//!
//! ```text
//! Exporter
//!   ├── config path + ClientFactory   rebuilt on every reload
//!   └── Collector                     ArcSwap<ActiveConfig>
//!
//! reload triggers: POST /-/reload, SIGHUP
//! ```

pub mod exporter;
pub mod server;

pub use exporter::{
    ClientFactory, ClientFuture, Exporter, aws_client_factory, client_settings, load_active, read_config,
};
pub use server::build_router;
