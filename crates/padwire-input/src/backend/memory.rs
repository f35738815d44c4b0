use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use padwire_bit_mask::Bitmask;
use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::source::RawStateSource;
use crate::types::{AxisRange, Layout, RawSample, SlotIndex};

#[derive(Debug, Clone, Default)]
struct Device {
    connected: bool,
    rumble: bool,
    axes: SmallVec<[i32; 8]>,
    buttons: Bitmask<u32>,
    vibration: SmallVec<[f32; 4]>,
}

#[derive(Debug, Default)]
struct Shared {
    devices: Vec<Device>,
    open: bool,
    open_error: Option<String>,
    vibration_commands: usize,
}

/// Backend whose device state lives in memory and is driven through a
/// [`MemoryHandle`]. Used for replay, tests and benchmarks.
pub struct MemorySource {
    layout: Layout,
    range: AxisRange,
    shared: Arc<Mutex<Shared>>,
}

/// Cloneable control surface of a [`MemorySource`].
#[derive(Clone)]
pub struct MemoryHandle {
    layout: Layout,
    range: AxisRange,
    shared: Arc<Mutex<Shared>>,
}

impl MemorySource {
    /// Axis range used unless overridden. Decimal so normalized test
    /// values survive the round trip exactly.
    pub const DEFAULT_AXIS_RANGE: AxisRange = AxisRange::new(-10_000, 10_000);

    pub fn new(layout: Layout) -> Self {
        Self::with_axis_range(layout, Self::DEFAULT_AXIS_RANGE)
    }

    pub fn with_axis_range(layout: Layout, range: AxisRange) -> Self {
        let device = Device {
            connected: false,
            rumble: true,
            axes: smallvec::smallvec![0; layout.axes as usize],
            buttons: Bitmask::empty(),
            vibration: smallvec::smallvec![0.0; layout.motors as usize],
        };
        let shared = Shared {
            devices: vec![device; layout.slots],
            ..Shared::default()
        };
        Self {
            layout,
            range,
            shared: Arc::new(Mutex::new(shared)),
        }
    }

    pub fn handle(&self) -> MemoryHandle {
        MemoryHandle {
            layout: self.layout,
            range: self.range,
            shared: self.shared.clone(),
        }
    }
}

impl RawStateSource for MemorySource {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn layout(&self) -> Layout {
        self.layout
    }

    fn axis_range(&self, _axis: u32) -> AxisRange {
        self.range
    }

    fn open(&mut self) -> Result<()> {
        let mut shared = lock(&self.shared);
        if let Some(reason) = shared.open_error.clone() {
            return Err(Error::BackendUnavailable(reason));
        }
        shared.open = true;
        Ok(())
    }

    fn close(&mut self) {
        lock(&self.shared).open = false;
    }

    fn sample(&mut self, slot: SlotIndex) -> Option<RawSample> {
        let shared = lock(&self.shared);
        if !shared.open {
            return None;
        }
        let device = shared.devices.get(slot)?;
        device.connected.then(|| RawSample {
            axes: device.axes.clone(),
            buttons: device.buttons,
        })
    }

    fn motors(&self, slot: SlotIndex) -> u32 {
        match lock(&self.shared).devices.get(slot) {
            Some(device) if device.rumble => self.layout.motors,
            _ => 0,
        }
    }

    fn set_vibration(&mut self, slot: SlotIndex, strengths: &[f32]) {
        let mut shared = lock(&self.shared);
        shared.vibration_commands += 1;
        if let Some(device) = shared.devices.get_mut(slot) {
            for (i, motor) in device.vibration.iter_mut().enumerate() {
                *motor = strengths.get(i).copied().unwrap_or(0.0);
            }
        }
    }
}

impl MemoryHandle {
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Make `open` fail with the given reason (or succeed again with `None`).
    pub fn fail_open(&self, reason: Option<&str>) {
        lock(&self.shared).open_error = reason.map(str::to_string);
    }

    pub fn is_open(&self) -> bool {
        lock(&self.shared).open
    }

    pub fn connect(&self, slot: SlotIndex) {
        self.with_device(slot, |d| d.connected = true);
    }

    pub fn disconnect(&self, slot: SlotIndex) {
        self.with_device(slot, |d| d.connected = false);
    }

    /// Whether the device in `slot` reports rumble motors. On by default.
    pub fn set_rumble_support(&self, slot: SlotIndex, supported: bool) {
        self.with_device(slot, |d| d.rumble = supported);
    }

    /// Set an axis to a raw backend value.
    pub fn set_axis_raw(&self, slot: SlotIndex, axis: impl Into<u32>, raw: i32) {
        let axis = axis.into() as usize;
        self.with_device(slot, |d| {
            if let Some(value) = d.axes.get_mut(axis) {
                *value = raw;
            }
        });
    }

    /// Set an axis from a normalized value in [-1.0, 1.0].
    pub fn set_axis(&self, slot: SlotIndex, axis: impl Into<u32>, value: f32) {
        self.set_axis_raw(slot, axis, self.range.denormalize(value));
    }

    pub fn set_button(&self, slot: SlotIndex, button: impl Into<u32>, pressed: bool) {
        let button = button.into();
        if button >= self.layout.buttons {
            return;
        }
        self.with_device(slot, |d| d.buttons.set(button, pressed));
    }

    pub fn press(&self, slot: SlotIndex, button: impl Into<u32>) {
        self.set_button(slot, button, true);
    }

    pub fn release(&self, slot: SlotIndex, button: impl Into<u32>) {
        self.set_button(slot, button, false);
    }

    /// Last motor strengths written to a slot.
    pub fn vibration(&self, slot: SlotIndex) -> Vec<f32> {
        lock(&self.shared)
            .devices
            .get(slot)
            .map(|d| d.vibration.to_vec())
            .unwrap_or_default()
    }

    /// Number of vibration commands the backend has received.
    pub fn vibration_commands(&self) -> usize {
        lock(&self.shared).vibration_commands
    }

    fn with_device(&self, slot: SlotIndex, f: impl FnOnce(&mut Device)) {
        if let Some(device) = lock(&self.shared).devices.get_mut(slot) {
            f(device);
        }
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}
