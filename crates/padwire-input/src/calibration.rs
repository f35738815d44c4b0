use crate::error::{Error, Result};
use crate::types::SlotIndex;

/// Default gain applied to effective axis values.
pub const DEFAULT_AXIS_SCALE: f32 = 1.0;
/// Default normalized magnitude below which an axis reads as centered.
pub const DEFAULT_DEADZONE: f32 = 0.25;

/// Per-controller axis calibration.
///
/// Values are caller-trusted: nothing is clamped. A scale of 1.30 to 1.40
/// suits controllers whose sticks never reach full deflection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationProfile {
    pub axis_scale: f32,
    pub deadzone: f32,
}

impl Default for CalibrationProfile {
    fn default() -> Self {
        Self {
            axis_scale: DEFAULT_AXIS_SCALE,
            deadzone: DEFAULT_DEADZONE,
        }
    }
}

impl CalibrationProfile {
    pub const fn new(axis_scale: f32, deadzone: f32) -> Self {
        Self {
            axis_scale,
            deadzone,
        }
    }

    /// Effective value of a normalized reading: zero inside the deadzone,
    /// otherwise the reading times the scale.
    #[inline]
    pub fn apply(&self, normalized: f32) -> f32 {
        if normalized.abs() < self.deadzone {
            0.0
        } else {
            normalized * self.axis_scale
        }
    }
}

/// Calibration for every slot of a backend.
#[derive(Debug, Clone)]
pub struct CalibrationTable {
    profiles: Vec<CalibrationProfile>,
}

impl CalibrationTable {
    pub fn new(slots: usize) -> Self {
        Self {
            profiles: vec![CalibrationProfile::default(); slots],
        }
    }

    pub fn profile(&self, slot: SlotIndex) -> Option<&CalibrationProfile> {
        self.profiles.get(slot)
    }

    pub fn set_axis_scale(&mut self, slot: SlotIndex, scale: f32) -> Result<()> {
        self.profile_mut(slot)?.axis_scale = scale;
        Ok(())
    }

    pub fn set_deadzone(&mut self, slot: SlotIndex, size: f32) -> Result<()> {
        self.profile_mut(slot)?.deadzone = size;
        Ok(())
    }

    fn profile_mut(&mut self, slot: SlotIndex) -> Result<&mut CalibrationProfile> {
        self.profiles.get_mut(slot).ok_or(Error::InvalidSlot(slot))
    }
}
