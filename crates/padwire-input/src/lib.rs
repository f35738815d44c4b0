//! Controller input abstraction.
//!
//! A [`ControllerInterface`] polls a [`RawStateSource`] once per tick, diffs
//! every connected slot against its last known state and hands the
//! resulting transitions either to an armed intercept hook or to the
//! callbacks registered in its binding table.

mod backend;
mod binding;
mod calibration;
mod differ;
mod dispatch;
mod error;
mod events;
mod interface;
mod intercept;
mod source;
mod types;

pub use crate::backend::{MemoryHandle, MemorySource};
#[cfg(feature = "sdl2-backend")]
pub use crate::backend::Sdl2Source;
pub use crate::binding::{AxisCallback, BindingKind, BindingTable, ButtonCallback};
pub use crate::calibration::{
    CalibrationProfile, CalibrationTable, DEFAULT_AXIS_SCALE, DEFAULT_DEADZONE,
};
pub use crate::differ::{AXIS_BUTTON_THRESHOLD, AXIS_QUANTIZE_STEPS};
pub use crate::error::{Error, Result};
pub use crate::events::{HookResult, InputEvent};
pub use crate::interface::{ConnectionCallback, ControllerInterface, InterfaceState};
pub use crate::intercept::{HookCallback, InterceptHandle, InterceptHook};
pub use crate::source::{strength_to_u16, RawStateSource};
pub use crate::types::{
    Axis, AxisRange, Button, Direction, Layout, RawSample, SlotIndex, MAX_AXES,
    MAX_BUTTONS,
};
