use log::trace;
use padwire_bit_mask::Bitmask;
use smallvec::SmallVec;

use crate::calibration::CalibrationProfile;
use crate::events::InputEvent;
use crate::types::{AxisRange, Direction, Layout, RawSample, SlotIndex};

/// Effective magnitude at which one half of an axis counts as pressed.
pub const AXIS_BUTTON_THRESHOLD: f32 = 0.5;
/// Axis changes smaller than `1 / AXIS_QUANTIZE_STEPS` are not reported.
pub const AXIS_QUANTIZE_STEPS: f32 = 1000.0;

/// One detected change plus, for axes, the edges of its two derived
/// direction buttons (`Some(pressed)` when that direction flipped).
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Transition {
    pub event: InputEvent,
    pub edges: [Option<bool>; 2],
}

pub(crate) type Transitions = SmallVec<[Transition; 8]>;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct AxisState {
    value: f32,
    quantized: i32,
}

/// What the interface remembers about one slot between polls.
#[derive(Debug, Clone, Default)]
pub(crate) struct LastKnownState {
    pub connected: bool,
    sample: RawSample,
    axes: SmallVec<[AxisState; 8]>,
    active: [Bitmask<u32>; 2],
}

impl LastKnownState {
    #[cfg(test)]
    pub(crate) fn sample(&self) -> &RawSample {
        &self.sample
    }
}

/// Turns consecutive samples of a slot into transitions.
pub(crate) struct StateDiffer {
    ranges: SmallVec<[AxisRange; 8]>,
    buttons: u32,
}

impl StateDiffer {
    pub fn new(layout: &Layout, range: impl Fn(u32) -> AxisRange) -> Self {
        Self {
            ranges: (0..layout.axes).map(range).collect(),
            buttons: layout.buttons,
        }
    }

    /// Adopt `sample` as the baseline without reporting anything.
    pub fn rebase(
        &self,
        sample: &RawSample,
        calibration: &CalibrationProfile,
        last: &mut LastKnownState,
    ) {
        last.axes.clear();
        last.active = [Bitmask::empty(); 2];
        for (axis, range) in (0u32..).zip(self.ranges.iter()) {
            let value = calibration.apply(range.normalize(sample.axis(axis)));
            for direction in Direction::ALL {
                let active = direction_active(direction, value, false);
                last.active[direction.slot()].set(axis, active);
            }
            last.axes.push(AxisState {
                value,
                quantized: quantize(value),
            });
        }
        last.sample = self.truncate(sample);
    }

    /// Compare `sample` against `last`, append transitions to `out` and make
    /// `sample` the new last known state.
    pub fn diff(
        &self,
        slot: SlotIndex,
        sample: &RawSample,
        calibration: &CalibrationProfile,
        last: &mut LastKnownState,
        out: &mut Transitions,
    ) {
        if last.axes.len() != self.ranges.len() {
            self.rebase(sample, calibration, last);
            return;
        }

        for (axis, range) in (0u32..).zip(self.ranges.iter()) {
            let value = calibration.apply(range.normalize(sample.axis(axis)));
            let quantized = quantize(value);

            let mut edges = [None; 2];
            for direction in Direction::ALL {
                let active_set = &mut last.active[direction.slot()];
                let was_active = active_set.contains(axis);
                let active = direction_active(direction, value, was_active);
                if active != was_active {
                    active_set.set(axis, active);
                    edges[direction.slot()] = Some(active);
                }
            }

            let previous = &mut last.axes[axis as usize];
            if quantized != previous.quantized || edges.iter().any(Option::is_some) {
                trace!(
                    "slot {slot} axis {axis}: {:.3} -> {value:.3}",
                    previous.value
                );
                out.push(Transition {
                    event: InputEvent::Axis { slot, axis, value },
                    edges,
                });
            }
            *previous = AxisState { value, quantized };
        }

        let sample = self.truncate(sample);
        for button in last.sample.buttons.changed(&sample.buttons).iter() {
            let pressed = sample.buttons.contains(button);
            trace!("slot {slot} button {button}: pressed={pressed}");
            out.push(Transition {
                event: InputEvent::Button {
                    slot,
                    button,
                    pressed,
                },
                edges: [None; 2],
            });
        }
        last.sample = sample;
    }

    fn truncate(&self, sample: &RawSample) -> RawSample {
        RawSample {
            axes: sample.axes.iter().copied().take(self.ranges.len()).collect(),
            buttons: sample.buttons.truncate(self.buttons),
        }
    }
}

#[inline]
fn quantize(value: f32) -> i32 {
    (value * AXIS_QUANTIZE_STEPS).round() as i32
}

/// A direction activates once the value reaches the threshold with the
/// matching sign and stays active until the value is zero or flips sign.
#[inline]
fn direction_active(direction: Direction, value: f32, was_active: bool) -> bool {
    let along = value * direction.sign();
    if was_active {
        along > 0.0
    } else {
        along >= AXIS_BUTTON_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Layout;

    const RANGE: AxisRange = AxisRange::new(-10_000, 10_000);

    fn differ() -> StateDiffer {
        StateDiffer::new(&Layout::standard(1), |_| RANGE)
    }

    fn sample(axes: &[f32], buttons: &[u32]) -> RawSample {
        let raw: Vec<i32> = axes.iter().map(|v| RANGE.denormalize(*v)).collect();
        RawSample::new(&raw, Bitmask::new(buttons))
    }

    fn run(
        differ: &StateDiffer,
        calibration: &CalibrationProfile,
        last: &mut LastKnownState,
        s: &RawSample,
    ) -> Transitions {
        let mut out = Transitions::new();
        differ.diff(0, s, calibration, last, &mut out);
        out
    }

    #[test]
    fn first_sample_becomes_baseline() {
        let d = differ();
        let cal = CalibrationProfile::default();
        let mut last = LastKnownState::default();
        let out = run(&d, &cal, &mut last, &sample(&[0.9, 0.0], &[1, 2]));
        assert!(out.is_empty());
        assert!(last.sample().is_pressed(1u32));
    }

    #[test]
    fn deadzone_then_change_then_return() {
        let d = differ();
        let cal = CalibrationProfile::default();
        let mut last = LastKnownState::default();
        let values: Vec<Vec<f32>> = [0.10, 0.30, 0.30, 0.0]
            .iter()
            .map(|v| {
                let out = run(&d, &cal, &mut last, &sample(&[*v], &[]));
                out.iter()
                    .map(|t| match t.event {
                        InputEvent::Axis { value, .. } => value,
                        InputEvent::Button { .. } => f32::NAN,
                    })
                    .collect()
            })
            .collect();
        assert!(values[0].is_empty());
        assert_eq!(values[1], vec![0.3]);
        assert!(values[2].is_empty());
        assert_eq!(values[3], vec![0.0]);
    }

    #[test]
    fn jitter_below_quantization_is_dropped() {
        let d = StateDiffer::new(&Layout::standard(1), |_| AxisRange::SIGNED_16);
        let cal = CalibrationProfile::new(1.0, 0.0);
        let mut last = LastKnownState::default();
        run(&d, &cal, &mut last, &RawSample::new(&[16000], Bitmask::empty()));
        let out = run(&d, &cal, &mut last, &RawSample::new(&[16003], Bitmask::empty()));
        assert!(out.is_empty());
        let out = run(&d, &cal, &mut last, &RawSample::new(&[16100], Bitmask::empty()));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn button_edges_fire_once_per_flip() {
        let d = differ();
        let cal = CalibrationProfile::default();
        let mut last = LastKnownState::default();
        run(&d, &cal, &mut last, &sample(&[], &[0, 4]));

        let out = run(&d, &cal, &mut last, &sample(&[], &[0, 4, 7]));
        assert_eq!(
            out.iter().map(|t| t.event).collect::<Vec<_>>(),
            vec![InputEvent::Button { slot: 0, button: 7, pressed: true }]
        );

        let out = run(&d, &cal, &mut last, &sample(&[], &[4, 7]));
        assert_eq!(
            out.iter().map(|t| t.event).collect::<Vec<_>>(),
            vec![InputEvent::Button { slot: 0, button: 0, pressed: false }]
        );

        assert!(run(&d, &cal, &mut last, &sample(&[], &[4, 7])).is_empty());
    }

    #[test]
    fn buttons_beyond_layout_are_ignored() {
        let d = differ();
        let cal = CalibrationProfile::default();
        let mut last = LastKnownState::default();
        run(&d, &cal, &mut last, &sample(&[], &[]));
        assert!(run(&d, &cal, &mut last, &sample(&[], &[40])).is_empty());
    }

    #[test]
    fn negative_direction_press_and_release() {
        let d = differ();
        let cal = CalibrationProfile::default();
        let mut last = LastKnownState::default();
        let edges: Vec<[Option<bool>; 2]> = [0.0, -0.6, -0.6, -0.1]
            .iter()
            .map(|v| {
                run(&d, &cal, &mut last, &sample(&[0.0, 0.0, *v], &[]))
                    .first()
                    .map(|t| t.edges)
                    .unwrap_or([None, None])
            })
            .collect();
        assert_eq!(edges[0], [None, None]);
        assert_eq!(edges[1], [Some(true), None]);
        assert_eq!(edges[2], [None, None]);
        assert_eq!(edges[3], [Some(false), None]);
    }

    #[test]
    fn direction_holds_until_zero_or_sign_flip() {
        let d = StateDiffer::new(&Layout::standard(1), |_| RANGE);
        let cal = CalibrationProfile::new(1.0, 0.0);
        let mut last = LastKnownState::default();
        run(&d, &cal, &mut last, &sample(&[0.0], &[]));

        let out = run(&d, &cal, &mut last, &sample(&[0.7], &[]));
        assert_eq!(out[0].edges, [None, Some(true)]);
        // Below threshold but same sign: still pressed.
        let out = run(&d, &cal, &mut last, &sample(&[0.2], &[]));
        assert_eq!(out[0].edges, [None, None]);
        // Straight across to the other side.
        let out = run(&d, &cal, &mut last, &sample(&[-0.8], &[]));
        assert_eq!(out[0].edges, [Some(true), Some(false)]);
    }

    #[test]
    fn scale_applies_before_threshold() {
        let d = differ();
        let cal = CalibrationProfile::new(2.0, 0.25);
        let mut last = LastKnownState::default();
        run(&d, &cal, &mut last, &sample(&[0.0], &[]));
        let out = run(&d, &cal, &mut last, &sample(&[0.3], &[]));
        assert_eq!(out[0].event, InputEvent::Axis { slot: 0, axis: 0, value: 0.6 });
        assert_eq!(out[0].edges, [None, Some(true)]);
    }
}
