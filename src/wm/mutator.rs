//! Window state-transition engine
//!
//! Every operation resolves its target against a fresh enumeration before
//! touching anything; a miss aborts with no side effects. Geometry commands
//! go through `normalize` first so they always land on a window in normal
//! visibility state, and finish by activating the window: a geometry
//! mutation is also a bring-to-front.

use std::sync::Arc;

use tracing::debug;

use crate::compositor::CompositorPort;
use crate::error::{Result, WindowError};
use crate::shared::{Geometry, WindowSnapshot};

use super::registry;

#[derive(Clone)]
pub struct Mutator {
    port: Arc<dyn CompositorPort>,
}

impl Mutator {
    pub fn new(port: Arc<dyn CompositorPort>) -> Self {
        Self { port }
    }

    fn resolve(&self, id: u32) -> Result<WindowSnapshot> {
        let windows = self.port.windows()?;
        registry::resolve(&windows, id).cloned()
    }

    /// Leave minimized and maximized state before applying geometry, so the
    /// compositor cannot silently reject or defer the change. Returns true
    /// if any state was left; the window's geometry may have changed.
    fn normalize(&self, window: &WindowSnapshot) -> Result<bool> {
        if window.minimized {
            self.port.unminimize(window.id)?;
        }
        if window.maximized.any() {
            self.port.unmaximize(window.id)?;
        }
        Ok(window.minimized || window.maximized.any())
    }

    /// Geometry to fill in for the parts a partial move/resize keeps: the
    /// restored rect after normalization, not the pre-normalization one.
    /// Unmaximizing puts the old rect back, so a fresh read is required.
    fn settled_geometry(&self, window: &WindowSnapshot) -> Result<Geometry> {
        if self.normalize(window)? {
            return Ok(self.resolve(window.id)?.geometry);
        }
        Ok(window.geometry)
    }

    pub fn move_resize(&self, id: u32, x: i32, y: i32, width: u32, height: u32) -> Result<()> {
        let window = self.resolve(id)?;
        debug!("MoveResize {} -> {},{} {}x{}", id, x, y, width, height);
        self.normalize(&window)?;
        self.port.move_resize_frame(id, Geometry::new(x, y, width, height))?;
        self.port.activate(id)?;
        Ok(())
    }

    /// Resize in place: size comes from the caller, position from the
    /// window's post-normalization geometry.
    pub fn resize(&self, id: u32, width: u32, height: u32) -> Result<()> {
        let window = self.resolve(id)?;
        debug!("Resize {} -> {}x{}", id, width, height);
        let g = self.settled_geometry(&window)?;
        self.port.move_resize_frame(id, Geometry::new(g.x, g.y, width, height))?;
        self.port.activate(id)?;
        Ok(())
    }

    /// Move without resizing; size is the post-normalization size
    pub fn move_to(&self, id: u32, x: i32, y: i32) -> Result<()> {
        let window = self.resolve(id)?;
        debug!("Move {} -> {},{}", id, x, y);
        let g = self.settled_geometry(&window)?;
        self.port.move_resize_frame(id, Geometry::new(x, y, g.width, g.height))?;
        self.port.activate(id)?;
        Ok(())
    }

    pub fn move_to_workspace(&self, id: u32, index: u32) -> Result<()> {
        self.resolve(id)?;
        debug!("MoveToWorkspace {} -> {}", id, index);
        self.port.set_workspace(id, index)?;
        Ok(())
    }

    pub fn maximize(&self, id: u32) -> Result<()> {
        let window = self.resolve(id)?;
        debug!("Maximize {}", id);
        if window.minimized {
            self.port.unminimize(id)?;
        }
        self.port.maximize(id)?;
        self.port.activate(id)?;
        Ok(())
    }

    pub fn minimize(&self, id: u32) -> Result<()> {
        self.resolve(id)?;
        debug!("Minimize {}", id);
        self.port.minimize(id)?;
        Ok(())
    }

    pub fn unmaximize(&self, id: u32) -> Result<()> {
        let window = self.resolve(id)?;
        if !window.maximized.any() {
            debug!("Unmaximize {}: not maximized", id);
            return Err(WindowError::BadState(id));
        }
        self.port.unmaximize(id)?;
        self.port.activate(id)?;
        Ok(())
    }

    pub fn unminimize(&self, id: u32) -> Result<()> {
        let window = self.resolve(id)?;
        if !window.minimized {
            debug!("Unminimize {}: not minimized", id);
            return Err(WindowError::BadState(id));
        }
        self.port.unminimize(id)?;
        Ok(())
    }

    pub fn raise(&self, id: u32) -> Result<()> {
        self.resolve(id)?;
        self.port.raise(id)?;
        Ok(())
    }

    pub fn stick(&self, id: u32) -> Result<()> {
        self.resolve(id)?;
        self.port.set_sticky(id, true)?;
        Ok(())
    }

    pub fn unstick(&self, id: u32) -> Result<()> {
        self.resolve(id)?;
        self.port.set_sticky(id, false)?;
        Ok(())
    }

    pub fn activate(&self, id: u32) -> Result<()> {
        self.resolve(id)?;
        debug!("Activate {}", id);
        self.port.activate(id)?;
        Ok(())
    }

    /// Force-terminate the owning client. Unsaved state is lost.
    pub fn close(&self, id: u32) -> Result<()> {
        self.resolve(id)?;
        debug!("Close (kill) {}", id);
        self.port.kill(id)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::HeadlessPort;
    use crate::shared::MaximizeState;

    fn setup() -> (Arc<HeadlessPort>, Mutator) {
        let port = Arc::new(HeadlessPort::new());
        let mutator = Mutator::new(port.clone());
        (port, mutator)
    }

    fn window(id: u32) -> WindowSnapshot {
        WindowSnapshot::new(id, "test", Geometry::new(50, 60, 400, 300))
    }

    #[test]
    fn move_resize_normalizes_any_starting_state() {
        // Every combination of {minimized, maximized} must end identical
        for (minimized, maximized) in [
            (false, MaximizeState::default()),
            (true, MaximizeState::default()),
            (false, MaximizeState::BOTH),
            (true, MaximizeState::BOTH),
            (true, MaximizeState { horizontal: true, vertical: false }),
        ] {
            let (port, mutator) = setup();
            let mut w = window(1);
            w.minimized = minimized;
            w.maximized = maximized;
            port.insert(w);

            mutator.move_resize(1, 5, 10, 640, 480).unwrap();

            let after = port.window(1).unwrap();
            assert!(!after.minimized);
            assert!(!after.maximized.any());
            assert_eq!(after.geometry, Geometry::new(5, 10, 640, 480));
            assert!(after.focused);
        }
    }

    #[test]
    fn resize_keeps_position() {
        let (port, mutator) = setup();
        port.insert(window(1));

        mutator.resize(1, 800, 600).unwrap();

        assert_eq!(port.window(1).unwrap().geometry, Geometry::new(50, 60, 800, 600));
    }

    #[test]
    fn resize_keeps_the_restored_position_of_a_maximized_window() {
        let (port, mutator) = setup();
        port.insert(window(1));
        // Maximizing parks the window at the work-area origin
        port.maximize(1).unwrap();

        mutator.resize(1, 800, 600).unwrap();

        let after = port.window(1).unwrap();
        assert!(!after.maximized.any());
        // Position is the restored rect's, not the maximized origin
        assert_eq!(after.geometry, Geometry::new(50, 60, 800, 600));
    }

    #[test]
    fn move_keeps_the_restored_size_of_a_maximized_window() {
        let (port, mutator) = setup();
        port.insert(window(1));
        port.maximize(1).unwrap();

        mutator.move_to(1, 5, 5).unwrap();

        let after = port.window(1).unwrap();
        assert!(!after.maximized.any());
        assert_eq!(after.geometry, Geometry::new(5, 5, 400, 300));
    }

    #[test]
    fn move_keeps_size() {
        let (port, mutator) = setup();
        port.insert(window(1));

        mutator.move_to(1, -5, 200).unwrap();

        assert_eq!(port.window(1).unwrap().geometry, Geometry::new(-5, 200, 400, 300));
    }

    #[test]
    fn maximize_unminimizes_but_keeps_maximized_state() {
        let (port, mutator) = setup();
        let mut w = window(1);
        w.minimized = true;
        port.insert(w);

        mutator.maximize(1).unwrap();

        let after = port.window(1).unwrap();
        assert!(!after.minimized);
        assert_eq!(after.maximized, MaximizeState::BOTH);
        assert!(after.focused);
    }

    #[test]
    fn unmaximize_requires_maximized_state() {
        let (port, mutator) = setup();
        port.insert(window(1));

        assert!(matches!(mutator.unmaximize(1), Err(WindowError::BadState(1))));

        // Either axis alone satisfies the precondition
        port.maximize(1).unwrap();
        mutator.unmaximize(1).unwrap();
        assert!(!port.window(1).unwrap().maximized.any());
        assert!(port.window(1).unwrap().focused);
    }

    #[test]
    fn unminimize_fails_twice_on_a_normal_window() {
        let (port, mutator) = setup();
        let mut w = window(1);
        w.minimized = true;
        port.insert(w);

        mutator.unminimize(1).unwrap();
        assert!(matches!(mutator.unminimize(1), Err(WindowError::BadState(1))));
        assert!(matches!(mutator.unminimize(1), Err(WindowError::BadState(1))));
        // No activation side effect on plain unminimize
        assert!(!port.window(1).unwrap().focused);
    }

    #[test]
    fn minimize_then_state_is_visible_to_inspection() {
        let (port, mutator) = setup();
        port.insert(window(1));

        mutator.minimize(1).unwrap();
        assert!(port.window(1).unwrap().minimized);
    }

    #[test]
    fn stick_and_unstick_toggle_the_flag() {
        let (port, mutator) = setup();
        port.insert(window(1));

        mutator.stick(1).unwrap();
        assert!(port.window(1).unwrap().sticky);
        mutator.unstick(1).unwrap();
        assert!(!port.window(1).unwrap().sticky);
    }

    #[test]
    fn raise_reorders_without_focusing() {
        let (port, mutator) = setup();
        port.insert(window(1));
        port.insert(window(2));

        mutator.raise(1).unwrap();

        assert_eq!(port.stacking_order(), vec![2, 1]);
        assert!(!port.window(1).unwrap().focused);
    }

    #[test]
    fn every_operation_rejects_unknown_ids() {
        let (_port, mutator) = setup();

        assert!(matches!(mutator.move_resize(9, 0, 0, 1, 1), Err(WindowError::NotFound(9))));
        assert!(matches!(mutator.resize(9, 1, 1), Err(WindowError::NotFound(9))));
        assert!(matches!(mutator.move_to(9, 0, 0), Err(WindowError::NotFound(9))));
        assert!(matches!(mutator.move_to_workspace(9, 1), Err(WindowError::NotFound(9))));
        assert!(matches!(mutator.maximize(9), Err(WindowError::NotFound(9))));
        assert!(matches!(mutator.minimize(9), Err(WindowError::NotFound(9))));
        assert!(matches!(mutator.unmaximize(9), Err(WindowError::NotFound(9))));
        assert!(matches!(mutator.unminimize(9), Err(WindowError::NotFound(9))));
        assert!(matches!(mutator.raise(9), Err(WindowError::NotFound(9))));
        assert!(matches!(mutator.stick(9), Err(WindowError::NotFound(9))));
        assert!(matches!(mutator.unstick(9), Err(WindowError::NotFound(9))));
        assert!(matches!(mutator.activate(9), Err(WindowError::NotFound(9))));
        assert!(matches!(mutator.close(9), Err(WindowError::NotFound(9))));
    }
}
