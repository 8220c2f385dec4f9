//! Service error taxonomy
//!
//! Callers of the D-Bus surface only ever see a single "Not found" fault for
//! both a missing window and a failed state precondition, matching the
//! original contract. The split below exists so logs can tell the two apart.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WindowError {
    /// No live window carries this id
    #[error("no window with id {0}")]
    NotFound(u32),

    /// Window exists but is not in the state the operation requires
    #[error("window {0} is not in the required state")]
    BadState(u32),

    /// Compositor backend failure (connection lost, protocol error)
    #[error(transparent)]
    Compositor(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, WindowError>;
