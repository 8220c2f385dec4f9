//! Shared window state types
//!
//! The unified `WindowSnapshot` structure is what a compositor backend
//! reports for one live window in a single enumeration pass. Everything the
//! inspector and mutator need is read from it; nothing is cached between
//! calls.

use serde::Serialize;

/// Window frame geometry (decoration-inclusive coordinates)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

/// A screen rectangle (work areas, frame bounds) as it appears in responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Intersection with another rect; empty intersections collapse to a
    /// zero-sized rect at this rect's origin.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.width as i32).min(other.x + other.width as i32);
        let y2 = (self.y + self.height as i32).min(other.y + other.height as i32);
        if x2 <= x1 || y2 <= y1 {
            return Rect::new(self.x, self.y, 0, 0);
        }
        Rect::new(x1, y1, (x2 - x1) as u32, (y2 - y1) as u32)
    }
}

impl From<Geometry> for Rect {
    fn from(g: Geometry) -> Self {
        Rect::new(g.x, g.y, g.width, g.height)
    }
}

/// Per-axis maximization flags (EWMH keeps horizontal and vertical separate)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaximizeState {
    pub horizontal: bool,
    pub vertical: bool,
}

impl MaximizeState {
    pub const BOTH: MaximizeState = MaximizeState { horizontal: true, vertical: true };

    /// True if maximized on either axis
    pub fn any(&self) -> bool {
        self.horizontal || self.vertical
    }

    /// Flag encoding used in detail responses: 1 = horizontal, 2 = vertical
    pub fn flags(&self) -> u32 {
        (self.horizontal as u32) | ((self.vertical as u32) << 1)
    }
}

/// What the window manager allows clients to do with a window
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
    pub movable: bool,
    pub resizable: bool,
    pub closable: bool,
    pub can_maximize: bool,
    pub can_minimize: bool,
    pub can_shade: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        // Windows without an allowed-actions hint are fully manageable
        Self {
            movable: true,
            resizable: true,
            closable: true,
            can_maximize: true,
            can_minimize: true,
            can_shade: true,
        }
    }
}

/// Window type codes, matching the compositor's window-type enumeration
pub mod window_type {
    pub const NORMAL: u32 = 0;
    pub const DESKTOP: u32 = 1;
    pub const DOCK: u32 = 2;
    pub const DIALOG: u32 = 3;
    pub const MODAL_DIALOG: u32 = 4;
    pub const TOOLBAR: u32 = 5;
    pub const MENU: u32 = 6;
    pub const UTILITY: u32 = 7;
    pub const SPLASHSCREEN: u32 = 8;
    pub const DROPDOWN_MENU: u32 = 9;
    pub const POPUP_MENU: u32 = 10;
    pub const TOOLTIP: u32 = 11;
    pub const NOTIFICATION: u32 = 12;
    pub const COMBO: u32 = 13;
    pub const DND: u32 = 14;
}

/// Frame type codes (NORMAL, DIALOG, UTILITY, MENU)
pub mod frame_type {
    pub const NORMAL: u32 = 0;
    pub const DIALOG: u32 = 1;
    pub const UTILITY: u32 = 3;
    pub const MENU: u32 = 4;
}

/// Stacking layer codes (desktop, below, normal, above/dock)
pub mod layer {
    pub const DESKTOP: u32 = 0;
    pub const BOTTOM: u32 = 1;
    pub const NORMAL: u32 = 2;
    pub const TOP: u32 = 4;
}

/// One live window's full attribute set as reported by the compositor.
///
/// `workspace` is `None` when the window is pinned to all workspaces.
#[derive(Debug, Clone)]
pub struct WindowSnapshot {
    pub id: u32,
    pub title: String,
    pub geometry: Geometry,
    pub minimized: bool,
    pub maximized: MaximizeState,
    pub workspace: Option<u32>,
    pub sticky: bool,
    pub focused: bool,
    pub layer: u32,
    pub monitor: u32,
    pub window_type: u32,
    pub frame_type: u32,
    pub pid: i32,
    pub wm_class: Option<String>,
    pub wm_class_instance: Option<String>,
    pub role: Option<String>,
    pub gtk_app_id: Option<String>,
    pub gtk_bus_name: Option<String>,
    pub gtk_obj_path: Option<String>,
    pub capabilities: Capabilities,
}

impl WindowSnapshot {
    /// A plain normal-state window; callers override fields as needed
    pub fn new(id: u32, title: &str, geometry: Geometry) -> Self {
        Self {
            id,
            title: title.to_string(),
            geometry,
            minimized: false,
            maximized: MaximizeState::default(),
            workspace: Some(0),
            sticky: false,
            focused: false,
            layer: layer::NORMAL,
            monitor: 0,
            window_type: window_type::NORMAL,
            frame_type: frame_type::NORMAL,
            pid: 0,
            wm_class: None,
            wm_class_instance: None,
            role: None,
            gtk_app_id: None,
            gtk_bus_name: None,
            gtk_obj_path: None,
            capabilities: Capabilities::default(),
        }
    }

    /// Whether the window shows on the given workspace
    pub fn on_workspace(&self, index: u32) -> bool {
        self.sticky || self.workspace.is_none() || self.workspace == Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maximize_flags_encode_both_axes() {
        assert_eq!(MaximizeState::default().flags(), 0);
        assert_eq!(MaximizeState { horizontal: true, vertical: false }.flags(), 1);
        assert_eq!(MaximizeState { horizontal: false, vertical: true }.flags(), 2);
        assert_eq!(MaximizeState::BOTH.flags(), 3);
        assert!(MaximizeState { horizontal: true, vertical: false }.any());
        assert!(!MaximizeState::default().any());
    }

    #[test]
    fn rect_intersection() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(50, 50, 100, 100);
        assert_eq!(a.intersect(&b), Rect::new(50, 50, 50, 50));

        let disjoint = Rect::new(500, 500, 10, 10);
        assert_eq!(a.intersect(&disjoint).width, 0);
    }

    #[test]
    fn sticky_windows_are_on_every_workspace() {
        let mut w = WindowSnapshot::new(1, "term", Geometry::new(0, 0, 640, 480));
        w.workspace = Some(1);
        assert!(!w.on_workspace(0));
        w.sticky = true;
        assert!(w.on_workspace(0));
        assert!(w.on_workspace(7));
    }
}
