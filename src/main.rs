//! WebDAV timestamp-fixing reverse proxy.
//!
//! Sits between a WebDAV media player and a media-indexing backend. Most
//! traffic streams straight through; PROPFIND multi-status responses get
//! their `<d:getlastmodified>` values rewritten to RFC1123 GMT on the way
//! back so the player can parse them.
//!
//! ```text
//!     Client ──▶ listener ──▶ [basic auth?] ──▶ forward ──▶ Indexer
//!     Client ◀── rewrite (PROPFIND+xml+207 only) ◀── response
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use webdav_timefix::config;
use webdav_timefix::http::HttpServer;
use webdav_timefix::lifecycle::Shutdown;
use webdav_timefix::observability::metrics;

#[derive(Parser)]
#[command(name = "webdav-timefix", about = "WebDAV timestamp-fixing reverse proxy")]
struct Args {
    /// Path to the TOML config file. Optional: UPSTREAM_URL, PROXY_USERNAME,
    /// PROXY_PASSWORD and BIND_ADDRESS override it either way.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = config::load_config(args.config.as_deref())?;

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "webdav_timefix={},tower_http=warn",
                    config.observability.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        upstream = %config.upstream.url,
        auth_enabled = config.auth.credentials().is_some(),
        request_timeout_secs = config.timeouts.request_secs,
        "webdav-timefix starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
