//! Window inspector
//!
//! Assembles the two response records: the per-window summary used by
//! `List` and the richer detail record used by `Details`. Field names and
//! order are the wire contract; clients parse these JSON objects by name.

use std::sync::Arc;

use serde::Serialize;

use crate::compositor::CompositorPort;
use crate::error::Result;
use crate::shared::{Rect, WindowSnapshot};

use super::registry;

/// One `List` entry
#[derive(Debug, Serialize)]
pub struct WindowSummary {
    pub gtk_app_id: Option<String>,
    pub gtk_bus_name: Option<String>,
    pub gtk_obj_path: Option<String>,
    pub wm_class: Option<String>,
    pub wm_class_instance: Option<String>,
    pub pid: i32,
    pub id: u32,
    pub frame_type: u32,
    pub window_type: u32,
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
    pub focus: bool,
    pub in_current_workspace: bool,
}

impl WindowSummary {
    fn assemble(w: &WindowSnapshot, active_workspace: u32) -> Self {
        Self {
            gtk_app_id: w.gtk_app_id.clone(),
            gtk_bus_name: w.gtk_bus_name.clone(),
            gtk_obj_path: w.gtk_obj_path.clone(),
            wm_class: w.wm_class.clone(),
            wm_class_instance: w.wm_class_instance.clone(),
            pid: w.pid,
            id: w.id,
            frame_type: w.frame_type,
            window_type: w.window_type,
            width: w.geometry.width,
            height: w.geometry.height,
            x: w.geometry.x,
            y: w.geometry.y,
            focus: w.focused,
            in_current_workspace: w.on_workspace(active_workspace),
        }
    }
}

/// The `Details` record
#[derive(Debug, Serialize)]
pub struct WindowDetails {
    pub wm_class: Option<String>,
    pub wm_class_instance: Option<String>,
    pub pid: i32,
    pub id: u32,
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
    pub focus: bool,
    pub in_current_workspace: bool,
    pub moveable: bool,
    pub resizeable: bool,
    pub canclose: bool,
    pub canmaximize: bool,
    /// Flag encoding: 0 = none, 1 = horizontal, 2 = vertical, 3 = both
    pub maximized: u32,
    pub canminimize: bool,
    pub canshade: bool,
    pub display: String,
    pub frame_bounds: Rect,
    pub frame_type: u32,
    pub window_type: u32,
    pub layer: u32,
    pub monitor: u32,
    pub role: Option<String>,
    /// Work area of the target window's monitor
    pub area: Rect,
    /// Work area spanning all monitors
    pub area_all: Rect,
    /// Work area of the monitor under the pointer at call time. This is
    /// caller context, not the target window's monitor.
    pub area_cust: Rect,
}

#[derive(Clone)]
pub struct Inspector {
    port: Arc<dyn CompositorPort>,
}

impl Inspector {
    pub fn new(port: Arc<dyn CompositorPort>) -> Self {
        Self { port }
    }

    /// One summary per live window, in the compositor's enumeration order
    pub fn list(&self) -> Result<Vec<WindowSummary>> {
        let active_workspace = self.port.active_workspace()?;
        let windows = self.port.windows()?;
        Ok(windows
            .iter()
            .map(|w| WindowSummary::assemble(w, active_workspace))
            .collect())
    }

    pub fn details(&self, id: u32) -> Result<WindowDetails> {
        let windows = self.port.windows()?;
        let w = registry::resolve(&windows, id)?;
        let active_workspace = self.port.active_workspace()?;
        // Resolved once per call, deliberately independent of the target
        let pointer_monitor = self.port.current_monitor()?;

        Ok(WindowDetails {
            wm_class: w.wm_class.clone(),
            wm_class_instance: w.wm_class_instance.clone(),
            pid: w.pid,
            id: w.id,
            width: w.geometry.width,
            height: w.geometry.height,
            x: w.geometry.x,
            y: w.geometry.y,
            focus: w.focused,
            in_current_workspace: w.on_workspace(active_workspace),
            moveable: w.capabilities.movable,
            resizeable: w.capabilities.resizable,
            canclose: w.capabilities.closable,
            canmaximize: w.capabilities.can_maximize,
            maximized: w.maximized.flags(),
            canminimize: w.capabilities.can_minimize,
            canshade: w.capabilities.can_shade,
            display: self.port.display_name(),
            frame_bounds: w.geometry.into(),
            frame_type: w.frame_type,
            window_type: w.window_type,
            layer: w.layer,
            monitor: w.monitor,
            role: w.role.clone(),
            area: self.port.work_area(w.monitor)?,
            area_all: self.port.work_area_all_monitors()?,
            area_cust: self.port.work_area(pointer_monitor)?,
        })
    }

    pub fn title(&self, id: u32) -> Result<String> {
        let windows = self.port.windows()?;
        Ok(registry::resolve(&windows, id)?.title.clone())
    }
}
