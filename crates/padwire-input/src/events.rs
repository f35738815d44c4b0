use crate::types::SlotIndex;

/// Magnitude an axis must reach before a capture UI should treat it as input.
const SIGNIFICANT_AXIS: f32 = 0.5;

/// A single transition detected while polling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// An axis changed; `value` is the effective (calibrated) value.
    Axis {
        slot: SlotIndex,
        axis: u32,
        value: f32,
    },
    /// A button changed state.
    Button {
        slot: SlotIndex,
        button: u32,
        pressed: bool,
    },
}

impl InputEvent {
    pub fn slot(&self) -> SlotIndex {
        match *self {
            InputEvent::Axis { slot, .. } | InputEvent::Button { slot, .. } => slot,
        }
    }

    /// Physical index of the axis or button.
    pub fn index(&self) -> u32 {
        match *self {
            InputEvent::Axis { axis, .. } => axis,
            InputEvent::Button { button, .. } => button,
        }
    }

    /// True for button presses and for axes deflected at least halfway.
    /// Releases and small axis motion are not.
    pub fn is_significant(&self) -> bool {
        match *self {
            InputEvent::Axis { value, .. } => value.abs() >= SIGNIFICANT_AXIS,
            InputEvent::Button { pressed, .. } => pressed,
        }
    }
}

/// What an intercept hook wants after seeing an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HookResult {
    /// Disarm the hook.
    #[default]
    Stop,
    /// Keep the hook armed for the next event.
    Continue,
}
