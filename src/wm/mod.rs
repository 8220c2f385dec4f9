//! Window-control service core
//!
//! Composes the registry lookup, the read-only inspector, and the
//! state-transition mutator over a shared compositor port. The D-Bus layer
//! holds one `WindowService` and owns no window state of its own.

use std::sync::Arc;

use crate::compositor::CompositorPort;

pub mod inspector;
pub mod mutator;
pub mod registry;

pub use inspector::Inspector;
pub use mutator::Mutator;

#[derive(Clone)]
pub struct WindowService {
    pub inspector: Inspector,
    pub mutator: Mutator,
}

impl WindowService {
    pub fn new(port: Arc<dyn CompositorPort>) -> Self {
        Self {
            inspector: Inspector::new(port.clone()),
            mutator: Mutator::new(port),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::HeadlessPort;
    use crate::error::WindowError;
    use crate::shared::{Geometry, MaximizeState, WindowSnapshot};

    fn service() -> (Arc<HeadlessPort>, WindowService) {
        let port = Arc::new(HeadlessPort::new());
        let service = WindowService::new(port.clone());
        (port, service)
    }

    // A minimized, maximized-both window resized through the service must
    // end up normal, exactly sized, and focused.
    #[test]
    fn resize_restores_minimized_maximized_window() {
        let (port, service) = service();
        let mut w = WindowSnapshot::new(5, "editor", Geometry::new(100, 100, 1920, 1060));
        w.minimized = true;
        w.maximized = MaximizeState::BOTH;
        port.insert(w);

        service.mutator.resize(5, 800, 600).unwrap();

        let after = port.window(5).unwrap();
        assert!(!after.minimized);
        assert!(!after.maximized.any());
        assert_eq!(after.geometry, Geometry::new(100, 100, 800, 600));
        assert!(after.focused);
    }

    #[test]
    fn close_on_unknown_id_has_no_side_effect() {
        let (port, service) = service();
        port.insert(WindowSnapshot::new(1, "survivor", Geometry::new(0, 0, 10, 10)));

        let err = service.mutator.close(99999).unwrap_err();
        assert!(matches!(err, WindowError::NotFound(99999)));
        assert!(port.window(1).is_some());
    }

    #[test]
    fn move_to_workspace_leaves_active_workspace_alone() {
        let (port, service) = service();
        port.insert(WindowSnapshot::new(3, "mail", Geometry::new(0, 0, 500, 400)));

        service.mutator.move_to_workspace(3, 2).unwrap();

        assert_eq!(port.window(3).unwrap().workspace, Some(2));
        assert_eq!(port.active_workspace().unwrap(), 0);
    }

    #[test]
    fn list_and_mutate_share_one_id_space() {
        let (port, service) = service();
        port.insert(WindowSnapshot::new(10, "a", Geometry::new(0, 0, 100, 100)));
        port.insert(WindowSnapshot::new(11, "b", Geometry::new(0, 0, 100, 100)));

        let listed: Vec<u32> = service.inspector.list().unwrap().iter().map(|s| s.id).collect();
        for id in listed {
            service.mutator.activate(id).unwrap();
        }
        assert!(port.window(11).unwrap().focused);
    }
}
