use thiserror::Error;

use crate::binding::BindingKind;
use crate::types::SlotIndex;

/// Error type for controller interface operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Slot index is outside the backend's range.
    #[error("Invalid controller slot: {0}")]
    InvalidSlot(SlotIndex),
    /// Axis or button index is outside the backend's range.
    #[error("Invalid control index: {0}")]
    InvalidControl(u32),
    /// A callback already occupies this slot/control/kind.
    #[error("Slot {slot} {kind} {index} is already bound")]
    DuplicateBinding {
        slot: SlotIndex,
        kind: BindingKind,
        index: u32,
    },
    /// The hardware backend could not be acquired.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),
    /// The interface has been shut down and cannot be reused.
    #[error("Controller interface is shut down")]
    ShutDown,
}

/// Convenient result alias for controller operations.
pub type Result<T> = std::result::Result<T, Error>;
