//! Window registry lookup
//!
//! Ids are unique in the live set, so first match is the only match. Every
//! call works on a fresh enumeration; a miss usually just means the window
//! closed between the caller's last `List` and now.

use crate::error::{Result, WindowError};
use crate::shared::WindowSnapshot;

pub fn resolve(windows: &[WindowSnapshot], id: u32) -> Result<&WindowSnapshot> {
    windows
        .iter()
        .find(|w| w.id == id)
        .ok_or(WindowError::NotFound(id))
}
