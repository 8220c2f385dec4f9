//! D-Bus integration
//!
//! Owns the session-bus endpoint lifecycle: connect, serve the window-calls
//! object, claim the well-known name, and release both again on shutdown so
//! a restarted daemon can take over cleanly.

use anyhow::{Context, Result};
use tracing::info;
use zbus::Connection;

use crate::wm::WindowService;

pub mod windows;

use windows::WindowCalls;

/// Object path the interface is served at
pub const OBJECT_PATH: &str = "/org/gnome/Shell/Extensions/Windows";

/// Default well-known bus name
pub const BUS_NAME: &str = "org.gnome.Shell.Extensions.Windows";

pub struct DbusManager {
    conn: Connection,
    bus_name: String,
}

impl DbusManager {
    /// Connect to the session bus, export the service, and claim the name
    pub async fn serve(service: WindowService, bus_name: &str) -> Result<Self> {
        let conn = Connection::session()
            .await
            .context("Failed to connect to D-Bus session bus")?;

        conn.object_server()
            .at(OBJECT_PATH, WindowCalls::new(service))
            .await
            .context("Failed to export window-calls object")?;

        conn.request_name(bus_name)
            .await
            .with_context(|| format!("Failed to acquire bus name {bus_name}"))?;

        info!("Serving {} at {}", bus_name, OBJECT_PATH);

        Ok(Self {
            conn,
            bus_name: bus_name.to_string(),
        })
    }

    /// Release the name and unexport the object. Must run on every exit
    /// path; a stale name grab blocks the next instance.
    pub async fn shutdown(&self) -> Result<()> {
        self.conn
            .release_name(self.bus_name.as_str())
            .await
            .context("Failed to release bus name")?;
        self.conn
            .object_server()
            .remove::<WindowCalls, _>(OBJECT_PATH)
            .await
            .context("Failed to unexport window-calls object")?;
        info!("Released {} and unexported {}", self.bus_name, OBJECT_PATH);
        Ok(())
    }
}
