//! Headless compositor backend
//!
//! An in-memory window table implementing the full port contract. Used for
//! dry runs (`backend = "headless"`) and for deterministic tests: state
//! transitions follow what a well-behaved compositor does, without an X
//! server in the loop. Stacking order is the vector order, bottom first.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{anyhow, Result};

use crate::shared::{Geometry, MaximizeState, Rect, WindowSnapshot};

use super::CompositorPort;

struct HeadlessState {
    windows: Vec<WindowSnapshot>,
    active_workspace: u32,
    pointer_monitor: u32,
    work_areas: Vec<Rect>,
    /// Pre-maximize rects, put back on unmaximize like a real WM does
    saved_rects: HashMap<u32, Geometry>,
}

pub struct HeadlessPort {
    state: Mutex<HeadlessState>,
}

impl HeadlessPort {
    /// Single 1920x1080 monitor with a 20px panel strut, empty window table
    pub fn new() -> Self {
        Self {
            state: Mutex::new(HeadlessState {
                windows: Vec::new(),
                active_workspace: 0,
                pointer_monitor: 0,
                work_areas: vec![Rect::new(0, 20, 1920, 1060)],
                saved_rects: HashMap::new(),
            }),
        }
    }

    /// Add a window to the table (test/dry-run seeding)
    pub fn insert(&self, window: WindowSnapshot) {
        self.state.lock().unwrap().windows.push(window);
    }

    /// Current state of one window, if it still exists
    pub fn window(&self, id: u32) -> Option<WindowSnapshot> {
        let state = self.state.lock().unwrap();
        state.windows.iter().find(|w| w.id == id).cloned()
    }

    pub fn set_active_workspace(&self, index: u32) {
        self.state.lock().unwrap().active_workspace = index;
    }

    pub fn set_pointer_monitor(&self, monitor: u32) {
        self.state.lock().unwrap().pointer_monitor = monitor;
    }

    pub fn set_work_areas(&self, areas: Vec<Rect>) {
        self.state.lock().unwrap().work_areas = areas;
    }

    /// Ids in stacking order, bottom first
    pub fn stacking_order(&self) -> Vec<u32> {
        let state = self.state.lock().unwrap();
        state.windows.iter().map(|w| w.id).collect()
    }

    fn with_window<F>(&self, id: u32, f: F) -> Result<()>
    where
        F: FnOnce(&mut WindowSnapshot),
    {
        let mut state = self.state.lock().unwrap();
        // Commands aimed at a vanished window are absorbed, like a real
        // compositor dropping a request for an unknown client.
        if let Some(w) = state.windows.iter_mut().find(|w| w.id == id) {
            f(w);
        }
        Ok(())
    }

    fn raise_internal(state: &mut HeadlessState, id: u32) {
        if let Some(pos) = state.windows.iter().position(|w| w.id == id) {
            let w = state.windows.remove(pos);
            state.windows.push(w);
        }
    }
}

impl Default for HeadlessPort {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositorPort for HeadlessPort {
    fn windows(&self) -> Result<Vec<WindowSnapshot>> {
        Ok(self.state.lock().unwrap().windows.clone())
    }

    fn active_workspace(&self) -> Result<u32> {
        Ok(self.state.lock().unwrap().active_workspace)
    }

    fn current_monitor(&self) -> Result<u32> {
        Ok(self.state.lock().unwrap().pointer_monitor)
    }

    fn work_area(&self, monitor: u32) -> Result<Rect> {
        let state = self.state.lock().unwrap();
        state
            .work_areas
            .get(monitor as usize)
            .copied()
            .ok_or_else(|| anyhow!("no monitor {monitor}"))
    }

    fn work_area_all_monitors(&self) -> Result<Rect> {
        let state = self.state.lock().unwrap();
        let Some(mut all) = state.work_areas.first().copied() else {
            return Ok(Rect::new(0, 0, 0, 0));
        };
        for area in &state.work_areas[1..] {
            let x1 = all.x.min(area.x);
            let y1 = all.y.min(area.y);
            let x2 = (all.x + all.width as i32).max(area.x + area.width as i32);
            let y2 = (all.y + all.height as i32).max(area.y + area.height as i32);
            all = Rect::new(x1, y1, (x2 - x1) as u32, (y2 - y1) as u32);
        }
        Ok(all)
    }

    fn display_name(&self) -> String {
        "headless".to_string()
    }

    fn move_resize_frame(&self, id: u32, geometry: Geometry) -> Result<()> {
        self.with_window(id, |w| w.geometry = geometry)
    }

    fn set_workspace(&self, id: u32, index: u32) -> Result<()> {
        self.with_window(id, |w| w.workspace = Some(index))
    }

    fn maximize(&self, id: u32) -> Result<()> {
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;
        if let Some(w) = state.windows.iter_mut().find(|w| w.id == id) {
            if !w.maximized.any() {
                state.saved_rects.insert(id, w.geometry);
            }
            let area = state
                .work_areas
                .get(w.monitor as usize)
                .or_else(|| state.work_areas.first());
            if let Some(area) = area.copied() {
                w.geometry = Geometry::new(area.x, area.y, area.width, area.height);
            }
            w.maximized = MaximizeState::BOTH;
        }
        Ok(())
    }

    fn unmaximize(&self, id: u32) -> Result<()> {
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;
        if let Some(w) = state.windows.iter_mut().find(|w| w.id == id) {
            w.maximized = MaximizeState::default();
            if let Some(rect) = state.saved_rects.remove(&id) {
                w.geometry = rect;
            }
        }
        Ok(())
    }

    fn minimize(&self, id: u32) -> Result<()> {
        self.with_window(id, |w| {
            w.minimized = true;
            w.focused = false;
        })
    }

    fn unminimize(&self, id: u32) -> Result<()> {
        self.with_window(id, |w| w.minimized = false)
    }

    fn raise(&self, id: u32) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::raise_internal(&mut state, id);
        Ok(())
    }

    fn activate(&self, id: u32) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        for w in state.windows.iter_mut() {
            w.focused = w.id == id;
        }
        Self::raise_internal(&mut state, id);
        Ok(())
    }

    fn set_sticky(&self, id: u32, sticky: bool) -> Result<()> {
        self.with_window(id, |w| w.sticky = sticky)
    }

    fn kill(&self, id: u32) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.windows.retain(|w| w.id != id);
        state.saved_rects.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activate_moves_focus_and_raises() {
        let port = HeadlessPort::new();
        let mut a = WindowSnapshot::new(1, "a", Geometry::new(0, 0, 100, 100));
        a.focused = true;
        port.insert(a);
        port.insert(WindowSnapshot::new(2, "b", Geometry::new(0, 0, 100, 100)));

        port.activate(2).unwrap();

        assert!(!port.window(1).unwrap().focused);
        assert!(port.window(2).unwrap().focused);
        assert_eq!(port.stacking_order(), vec![1, 2]);
    }

    #[test]
    fn kill_removes_the_window() {
        let port = HeadlessPort::new();
        port.insert(WindowSnapshot::new(7, "doomed", Geometry::new(0, 0, 10, 10)));
        port.kill(7).unwrap();
        assert!(port.window(7).is_none());
        assert!(port.windows().unwrap().is_empty());
    }

    #[test]
    fn commands_on_missing_ids_are_absorbed() {
        let port = HeadlessPort::new();
        port.minimize(99).unwrap();
        port.move_resize_frame(99, Geometry::new(0, 0, 1, 1)).unwrap();
        assert!(port.windows().unwrap().is_empty());
    }

    #[test]
    fn unmaximize_restores_the_premaximize_rect() {
        let port = HeadlessPort::new();
        port.insert(WindowSnapshot::new(1, "editor", Geometry::new(30, 40, 500, 400)));

        port.maximize(1).unwrap();
        let maxed = port.window(1).unwrap();
        assert_eq!(maxed.maximized, MaximizeState::BOTH);
        assert_eq!(maxed.geometry, Geometry::new(0, 20, 1920, 1060));

        port.unmaximize(1).unwrap();
        let restored = port.window(1).unwrap();
        assert!(!restored.maximized.any());
        assert_eq!(restored.geometry, Geometry::new(30, 40, 500, 400));
    }

    #[test]
    fn empty_work_area_table_yields_an_empty_rect() {
        let port = HeadlessPort::new();
        port.set_work_areas(Vec::new());
        assert_eq!(port.work_area_all_monitors().unwrap(), Rect::new(0, 0, 0, 0));
    }

    #[test]
    fn combined_work_area_spans_monitors() {
        let port = HeadlessPort::new();
        port.set_work_areas(vec![
            Rect::new(0, 20, 1920, 1060),
            Rect::new(1920, 0, 1280, 1024),
        ]);
        let all = port.work_area_all_monitors().unwrap();
        assert_eq!(all, Rect::new(0, 0, 3200, 1080));
    }
}
