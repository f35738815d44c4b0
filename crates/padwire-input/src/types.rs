use padwire_bit_derive::Bit;
use padwire_bit_mask::{Bitable, Bitmask};
use smallvec::SmallVec;

/// Index of a controller slot. Every index below [`Layout::slots`] exists
/// for the lifetime of the interface, whether or not a device is present.
pub type SlotIndex = usize;

/// Upper bound on buttons per controller (width of the button bitmask).
pub const MAX_BUTTONS: u32 = padwire_bit_mask::MAX_BITS;
/// Upper bound on axes per controller.
pub const MAX_AXES: u32 = padwire_bit_mask::MAX_BITS;

/// Axes of the standard gamepad layout, in physical index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Bit)]
pub enum Axis {
    LeftX,
    LeftY,
    RightX,
    RightY,
    LeftTrigger,
    RightTrigger,
}

impl Axis {
    /// Trigger axes only report one direction.
    pub fn is_trigger(self) -> bool {
        matches!(self, Axis::LeftTrigger | Axis::RightTrigger)
    }
}

/// Buttons of the standard gamepad layout, in physical index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Bit)]
pub enum Button {
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
    Start,
    Back,
    LeftStick,
    RightStick,
    LeftShoulder,
    RightShoulder,
    Guide,
    A,
    B,
    X,
    Y,
}

impl From<Axis> for u32 {
    fn from(axis: Axis) -> u32 {
        axis.index()
    }
}

impl From<Button> for u32 {
    fn from(button: Button) -> u32 {
        button.index()
    }
}

/// One half of an axis range, used by axis-to-button bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Negative,
    Positive,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Negative, Direction::Positive];

    #[inline]
    pub(crate) fn slot(self) -> usize {
        match self {
            Direction::Negative => 0,
            Direction::Positive => 1,
        }
    }

    /// Multiplier that maps this direction onto the positive half-line.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Direction::Negative => -1.0,
            Direction::Positive => 1.0,
        }
    }
}

/// Native integer range of one backend axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRange {
    pub min: i32,
    pub max: i32,
}

impl AxisRange {
    /// Signed 16-bit stick.
    pub const SIGNED_16: AxisRange = AxisRange::new(-32768, 32767);
    /// Trigger reported on the positive half of a signed 16-bit range.
    pub const POSITIVE_16: AxisRange = AxisRange::new(0, 32767);

    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Map a raw reading onto [-1.0, 1.0]. Negative and positive halves are
    /// scaled separately so both ends reach full magnitude.
    pub fn normalize(&self, raw: i32) -> f32 {
        let raw = raw.clamp(self.min.min(self.max), self.max.max(self.min));
        if raw < 0 {
            raw as f32 / self.min.unsigned_abs() as f32
        } else if raw > 0 {
            raw as f32 / self.max as f32
        } else {
            0.0
        }
    }

    /// Inverse of [`AxisRange::normalize`], rounding to the nearest step.
    pub fn denormalize(&self, value: f32) -> i32 {
        let value = value.clamp(-1.0, 1.0);
        let raw = if value < 0.0 {
            value * self.min.unsigned_abs() as f32
        } else {
            value * self.max as f32
        };
        (raw.round() as i32).clamp(self.min, self.max)
    }
}

/// Fixed capacity of a backend, supplied by its adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub slots: usize,
    pub axes: u32,
    pub buttons: u32,
    pub motors: u32,
}

impl Layout {
    /// The standard gamepad layout: 6 axes, 15 buttons and 2 rumble motors.
    pub const fn standard(slots: usize) -> Self {
        Self {
            slots,
            axes: Axis::COUNT as u32,
            buttons: Button::COUNT as u32,
            motors: 2,
        }
    }

    pub(crate) fn clamped(self) -> Self {
        Self {
            axes: self.axes.min(MAX_AXES),
            buttons: self.buttons.min(MAX_BUTTONS),
            ..self
        }
    }
}

/// Snapshot of one connected controller, taken once per poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSample {
    pub axes: SmallVec<[i32; 8]>,
    pub buttons: Bitmask<u32>,
}

impl RawSample {
    pub fn new(axes: &[i32], buttons: Bitmask<u32>) -> Self {
        Self {
            axes: SmallVec::from_slice(axes),
            buttons,
        }
    }

    /// A sample with every axis centered and no buttons held.
    pub fn centered(axes: u32) -> Self {
        Self {
            axes: smallvec::smallvec![0; axes as usize],
            buttons: Bitmask::empty(),
        }
    }

    /// Raw value of an axis; missing axes read as centered.
    #[inline]
    pub fn axis(&self, axis: u32) -> i32 {
        self.axes.get(axis as usize).copied().unwrap_or(0)
    }

    #[inline]
    pub fn is_pressed(&self, button: impl Into<u32>) -> bool {
        self.buttons.contains(button.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_layout_matches_named_controls() {
        let layout = Layout::standard(4);
        assert_eq!(layout.axes, 6);
        assert_eq!(layout.buttons, 15);
        assert_eq!(u32::from(Axis::RightTrigger), 5);
        assert_eq!(u32::from(Button::Y), 14);
    }

    #[test]
    fn normalize_reaches_both_ends() {
        let range = AxisRange::SIGNED_16;
        assert_eq!(range.normalize(-32768), -1.0);
        assert_eq!(range.normalize(32767), 1.0);
        assert_eq!(range.normalize(0), 0.0);
        assert!((range.normalize(16384) - 0.5).abs() < 0.001);
    }

    #[test]
    fn normalize_clamps_out_of_range_readings() {
        assert_eq!(AxisRange::POSITIVE_16.normalize(-20), 0.0);
        assert_eq!(AxisRange::POSITIVE_16.normalize(40_000), 1.0);
    }

    #[test]
    fn denormalize_inverts_normalize() {
        let range = AxisRange::new(-10_000, 10_000);
        assert_eq!(range.denormalize(-0.6), -6000);
        assert_eq!(range.normalize(range.denormalize(0.3)), 0.3);
    }

    #[test]
    fn clamped_layout_respects_bitmask_width() {
        let layout = Layout {
            slots: 1,
            axes: 100,
            buttons: 80,
            motors: 2,
        }
        .clamped();
        assert_eq!(layout.axes, MAX_AXES);
        assert_eq!(layout.buttons, MAX_BUTTONS);
    }

    #[test]
    fn sample_reads_missing_axes_as_centered() {
        let sample = RawSample::new(&[5, -5], Bitmask::new(&[Button::A.index()]));
        assert_eq!(sample.axis(1), -5);
        assert_eq!(sample.axis(9), 0);
        assert!(sample.is_pressed(Button::A));
        assert!(!sample.is_pressed(Button::B));
    }
}
