//! The org.gnome.Shell.Extensions.Windows interface
//!
//! One method per operation, typed exactly as the published XML: window ids
//! are `u`, geometry is `i`/`u`, and `List`/`Details` return JSON strings.
//! All business logic lives in `WindowService`; this layer only translates
//! arguments in and results or faults out.

use tracing::warn;
use zbus::{fdo, interface};

use crate::error::WindowError;
use crate::wm::WindowService;

pub struct WindowCalls {
    service: WindowService,
}

impl WindowCalls {
    pub fn new(service: WindowService) -> Self {
        Self { service }
    }
}

/// Collapse the domain error into the wire fault. Missing window and failed
/// precondition intentionally surface as the same "Not found" fault; the
/// log line is where the two differ.
fn to_fdo(err: WindowError) -> fdo::Error {
    match err {
        WindowError::NotFound(_) | WindowError::BadState(_) => {
            warn!("{err}");
            fdo::Error::Failed("Not found".to_string())
        }
        WindowError::Compositor(e) => {
            warn!("compositor failure: {e:#}");
            fdo::Error::Failed(format!("Compositor error: {e}"))
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> fdo::Result<String> {
    serde_json::to_string(value).map_err(|e| fdo::Error::Failed(format!("Encoding error: {e}")))
}

#[interface(name = "org.gnome.Shell.Extensions.Windows")]
impl WindowCalls {
    fn list(&self) -> fdo::Result<String> {
        let summaries = self.service.inspector.list().map_err(to_fdo)?;
        to_json(&summaries)
    }

    fn details(&self, winid: u32) -> fdo::Result<String> {
        let details = self.service.inspector.details(winid).map_err(to_fdo)?;
        to_json(&details)
    }

    fn get_title(&self, winid: u32) -> fdo::Result<String> {
        self.service.inspector.title(winid).map_err(to_fdo)
    }

    fn move_to_workspace(&self, winid: u32, workspace_num: u32) -> fdo::Result<()> {
        self.service
            .mutator
            .move_to_workspace(winid, workspace_num)
            .map_err(to_fdo)
    }

    fn move_resize(&self, winid: u32, x: i32, y: i32, width: u32, height: u32) -> fdo::Result<()> {
        self.service
            .mutator
            .move_resize(winid, x, y, width, height)
            .map_err(to_fdo)
    }

    fn resize(&self, winid: u32, width: u32, height: u32) -> fdo::Result<()> {
        self.service.mutator.resize(winid, width, height).map_err(to_fdo)
    }

    #[zbus(name = "Move")]
    fn move_window(&self, winid: u32, x: i32, y: i32) -> fdo::Result<()> {
        self.service.mutator.move_to(winid, x, y).map_err(to_fdo)
    }

    fn maximize(&self, winid: u32) -> fdo::Result<()> {
        self.service.mutator.maximize(winid).map_err(to_fdo)
    }

    fn minimize(&self, winid: u32) -> fdo::Result<()> {
        self.service.mutator.minimize(winid).map_err(to_fdo)
    }

    fn unmaximize(&self, winid: u32) -> fdo::Result<()> {
        self.service.mutator.unmaximize(winid).map_err(to_fdo)
    }

    fn unminimize(&self, winid: u32) -> fdo::Result<()> {
        self.service.mutator.unminimize(winid).map_err(to_fdo)
    }

    fn activate(&self, winid: u32) -> fdo::Result<()> {
        self.service.mutator.activate(winid).map_err(to_fdo)
    }

    fn close(&self, winid: u32) -> fdo::Result<()> {
        self.service.mutator.close(winid).map_err(to_fdo)
    }

    fn raise(&self, winid: u32) -> fdo::Result<()> {
        self.service.mutator.raise(winid).map_err(to_fdo)
    }

    fn stick(&self, winid: u32) -> fdo::Result<()> {
        self.service.mutator.stick(winid).map_err(to_fdo)
    }

    fn unstick(&self, winid: u32) -> fdo::Result<()> {
        self.service.mutator.unstick(winid).map_err(to_fdo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_window_and_bad_state_share_one_fault() {
        let not_found = to_fdo(WindowError::NotFound(7));
        let bad_state = to_fdo(WindowError::BadState(7));
        assert_eq!(
            not_found.to_string(),
            bad_state.to_string(),
            "wire contract conflates the two"
        );
        assert!(matches!(not_found, fdo::Error::Failed(msg) if msg == "Not found"));
    }

    #[test]
    fn compositor_errors_are_distinguishable() {
        let err = to_fdo(WindowError::Compositor(anyhow::anyhow!("connection reset")));
        assert!(matches!(err, fdo::Error::Failed(msg) if msg.contains("connection reset")));
    }
}
