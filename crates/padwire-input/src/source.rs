use crate::error::Result;
use crate::types::{AxisRange, Layout, RawSample, SlotIndex};

/// Hardware capability the interface polls.
///
/// One implementation per backend. The interface never talks to hardware
/// except through this trait.
pub trait RawStateSource {
    /// Short backend identifier used in logs.
    fn name(&self) -> &'static str;

    /// Fixed capacity of the backend.
    fn layout(&self) -> Layout;

    /// Native range of an axis.
    fn axis_range(&self, _axis: u32) -> AxisRange {
        AxisRange::SIGNED_16
    }

    /// Acquire backend resources.
    fn open(&mut self) -> Result<()>;

    /// Release backend resources. Must be safe to call when `open` failed
    /// or was never called, and more than once.
    fn close(&mut self);

    /// Called once at the start of every poll, before any `sample`.
    fn refresh(&mut self) {}

    /// Latest state of a slot, or `None` when nothing is connected there or
    /// the device could not be read.
    fn sample(&mut self, slot: SlotIndex) -> Option<RawSample>;

    /// Motors the device in `slot` can drive; 0 when it has no rumble.
    /// Never more than `layout().motors`.
    fn motors(&self, _slot: SlotIndex) -> u32 {
        self.layout().motors
    }

    /// Set motor intensities in [0.0, 1.0]. `strengths` has at most
    /// `layout().motors` entries; motors past its end are stopped.
    fn set_vibration(&mut self, slot: SlotIndex, strengths: &[f32]);
}

/// Convert a normalized motor strength to the 16-bit range used by
/// hardware vibration commands.
#[inline]
pub fn strength_to_u16(strength: f32) -> u16 {
    (strength.clamp(0.0, 1.0) * 65535.0).round() as u16
}
