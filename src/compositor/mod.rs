//! Compositor port
//!
//! The seam between the window-control service and whatever actually owns
//! the windows. The service never creates or destroys a window; it reads
//! fresh snapshots through this trait and issues fire-and-forget commands
//! keyed by window id. Commands aimed at a window that vanished in between
//! are expected to be silently absorbed by the backend.

use anyhow::Result;

use crate::shared::{Geometry, Rect, WindowSnapshot};

pub mod headless;
pub mod x11;

pub use headless::HeadlessPort;
pub use x11::X11Port;

pub trait CompositorPort: Send + Sync {
    /// Enumerate the current live window set, in the compositor's own order
    fn windows(&self) -> Result<Vec<WindowSnapshot>>;

    /// Index of the workspace currently shown to the user
    fn active_workspace(&self) -> Result<u32>;

    /// Monitor currently under the pointer (caller context, not any window's)
    fn current_monitor(&self) -> Result<u32>;

    /// Usable area of one monitor, excluding panels and docks
    fn work_area(&self, monitor: u32) -> Result<Rect>;

    /// Usable area spanning all monitors
    fn work_area_all_monitors(&self) -> Result<Rect>;

    /// Name of the display this backend is attached to
    fn display_name(&self) -> String;

    // -- commands ------------------------------------------------------

    /// Set frame position and size in one request
    fn move_resize_frame(&self, id: u32, geometry: Geometry) -> Result<()>;

    /// Reassign the window's workspace without switching the active view
    fn set_workspace(&self, id: u32, index: u32) -> Result<()>;

    /// Maximize on both axes
    fn maximize(&self, id: u32) -> Result<()>;

    /// Restore from maximized state (both axes)
    fn unmaximize(&self, id: u32) -> Result<()>;

    fn minimize(&self, id: u32) -> Result<()>;

    fn unminimize(&self, id: u32) -> Result<()>;

    /// Raise in stacking order without focusing
    fn raise(&self, id: u32) -> Result<()>;

    /// Raise and focus
    fn activate(&self, id: u32) -> Result<()>;

    /// Pin to / unpin from all workspaces
    fn set_sticky(&self, id: u32, sticky: bool) -> Result<()>;

    /// Force-terminate the window's owning client. Not a graceful close
    /// request: unsaved state is gone.
    fn kill(&self, id: u32) -> Result<()>;
}
