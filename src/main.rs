//! winctl
//!
//! A session daemon exposing window enumeration, inspection, and control
//! over D-Bus, speaking the org.gnome.Shell.Extensions.Windows interface.
//! The compositor is driven through a pluggable port: EWMH/X11 in
//! production, an in-memory table for dry runs.

mod compositor;
mod config;
mod dbus;
mod error;
mod shared;
mod wm;

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use compositor::{CompositorPort, HeadlessPort, X11Port};
use config::{Backend, Config};
use dbus::DbusManager;
use wm::WindowService;

#[tokio::main]
async fn main() -> Result<()> {
    let mut config = Config::load()?;
    init_tracing(&config.log_filter);

    info!("Starting winctl v{}", env!("CARGO_PKG_VERSION"));

    if std::env::args().any(|a| a == "--headless") {
        config.backend = Backend::Headless;
    }

    let port: Arc<dyn CompositorPort> = match config.backend {
        Backend::X11 => Arc::new(X11Port::connect()?),
        Backend::Headless => {
            info!("Headless backend selected; serving an empty window table");
            Arc::new(HeadlessPort::new())
        }
    };

    let service = WindowService::new(port);
    let endpoint = DbusManager::serve(service, &config.bus_name).await?;

    wait_for_shutdown().await;

    // Release the bus endpoint on the way out, signal-driven exits included
    if let Err(e) = endpoint.shutdown().await {
        error!("Bus teardown failed: {e:#}");
    }

    info!("winctl stopped");
    Ok(())
}

/// Block until SIGINT or SIGTERM
async fn wait_for_shutdown() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to install SIGTERM handler: {}", e);
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("Received SIGINT, shutting down"),
        _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .init();
}
