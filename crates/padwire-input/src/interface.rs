use std::sync::Arc;

use log::{debug, error, info, trace, warn};

use crate::binding::BindingTable;
use crate::calibration::{CalibrationProfile, CalibrationTable};
use crate::differ::{LastKnownState, StateDiffer, Transitions};
use crate::dispatch::{Delivery, Dispatcher};
use crate::error::{Error, Result};
use crate::intercept::{InterceptHandle, InterceptHook};
use crate::source::RawStateSource;
use crate::types::{Direction, Layout, SlotIndex};

/// Receives `(slot, connected)` whenever a slot changes presence.
pub type ConnectionCallback = Box<dyn FnMut(SlotIndex, bool) + Send>;

/// Lifecycle of a [`ControllerInterface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceState {
    Uninitialized,
    Initialized,
    /// Terminal.
    ShutDown,
}

/// Polls a backend and turns its state into binding callbacks.
///
/// All methods except those on [`InterceptHandle`] must be called from the
/// thread that owns the interface. Binding and calibration changes take
/// effect on the next [`ControllerInterface::poll_events`].
pub struct ControllerInterface<S: RawStateSource> {
    source: S,
    layout: Layout,
    state: InterfaceState,
    calibration: CalibrationTable,
    bindings: BindingTable,
    differ: StateDiffer,
    dispatcher: Dispatcher,
    slots: Vec<LastKnownState>,
    on_connection: Option<ConnectionCallback>,
    scratch: Transitions,
}

impl<S: RawStateSource> ControllerInterface<S> {
    pub fn new(source: S) -> Self {
        let layout = source.layout().clamped();
        let differ = StateDiffer::new(&layout, |axis| source.axis_range(axis));
        Self {
            layout,
            state: InterfaceState::Uninitialized,
            calibration: CalibrationTable::new(layout.slots),
            bindings: BindingTable::new(&layout),
            differ,
            dispatcher: Dispatcher::new(Arc::new(InterceptHook::new())),
            slots: vec![LastKnownState::default(); layout.slots],
            on_connection: None,
            scratch: Transitions::new(),
            source,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.source.name()
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn state(&self) -> InterfaceState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.state == InterfaceState::Initialized
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Acquire backend resources. Calling it again while initialized does
    /// nothing; after [`ControllerInterface::shutdown`] it fails.
    pub fn initialize(&mut self) -> Result<()> {
        match self.state {
            InterfaceState::Initialized => return Ok(()),
            InterfaceState::ShutDown => return Err(Error::ShutDown),
            InterfaceState::Uninitialized => {}
        }

        if let Err(e) = self.source.open() {
            error!("{} backend failed to initialize: {e}", self.source.name());
            self.source.close();
            return Err(e);
        }
        self.state = InterfaceState::Initialized;
        info!(
            "{} backend initialized ({} slots)",
            self.source.name(),
            self.layout.slots
        );
        Ok(())
    }

    /// Release backend resources. Never fails and may be called in any state.
    pub fn shutdown(&mut self) {
        if self.state == InterfaceState::ShutDown {
            return;
        }
        self.dispatcher.hook().disarm();
        self.source.close();
        for last in &mut self.slots {
            last.connected = false;
        }
        self.state = InterfaceState::ShutDown;
        info!("{} backend shut down", self.source.name());
    }

    pub fn clear_bindings(&mut self) {
        self.bindings.clear();
        debug!("all bindings cleared");
    }

    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    pub fn bind_controller_axis<F>(
        &mut self,
        slot: SlotIndex,
        axis: impl Into<u32>,
        callback: F,
    ) -> Result<()>
    where
        F: FnMut(SlotIndex, u32, f32) + Send + 'static,
    {
        let axis = axis.into();
        self.bindings
            .bind_axis(slot, axis, Box::new(callback))
            .inspect_err(|e| warn!("{e}"))
    }

    pub fn bind_controller_button<F>(
        &mut self,
        slot: SlotIndex,
        button: impl Into<u32>,
        callback: F,
    ) -> Result<()>
    where
        F: FnMut(SlotIndex, u32, bool) + Send + 'static,
    {
        let button = button.into();
        self.bindings
            .bind_button(slot, button, Box::new(callback))
            .inspect_err(|e| warn!("{e}"))
    }

    /// Treat one half of an axis as a button. The callback receives the
    /// axis index.
    pub fn bind_controller_axis_to_button<F>(
        &mut self,
        slot: SlotIndex,
        axis: impl Into<u32>,
        direction: Direction,
        callback: F,
    ) -> Result<()>
    where
        F: FnMut(SlotIndex, u32, bool) + Send + 'static,
    {
        let axis = axis.into();
        self.bindings
            .bind_axis_to_button(slot, axis, direction, Box::new(callback))
            .inspect_err(|e| warn!("{e}"))
    }

    /// Motor count of a connected slot, 0 otherwise or when the device has
    /// no rumble.
    pub fn controller_rumble_motor_count(&self, slot: SlotIndex) -> u32 {
        if self.is_connected(slot) {
            self.source.motors(slot).min(self.layout.motors)
        } else {
            0
        }
    }

    /// Extra strengths beyond the motor count are ignored. Invalid or
    /// disconnected slots are left untouched.
    pub fn set_controller_rumble_strength(&mut self, slot: SlotIndex, strengths: &[f32]) {
        let motors = self.controller_rumble_motor_count(slot) as usize;
        if motors == 0 {
            debug!("rumble ignored for slot {slot}: no controller");
            return;
        }
        let count = strengths.len().min(motors);
        self.source.set_vibration(slot, &strengths[..count]);
    }

    /// Values are stored as given; see [`CalibrationProfile`].
    pub fn set_controller_axis_scale(&mut self, slot: SlotIndex, scale: f32) -> Result<()> {
        self.calibration.set_axis_scale(slot, scale)
    }

    pub fn set_controller_deadzone(&mut self, slot: SlotIndex, size: f32) -> Result<()> {
        self.calibration.set_deadzone(slot, size)
    }

    pub fn calibration(&self, slot: SlotIndex) -> Option<&CalibrationProfile> {
        self.calibration.profile(slot)
    }

    /// Whether the last poll saw a controller in `slot`.
    pub fn is_connected(&self, slot: SlotIndex) -> bool {
        self.is_initialized() && self.slots.get(slot).is_some_and(|s| s.connected)
    }

    pub fn set_connection_callback<F>(&mut self, callback: F)
    where
        F: FnMut(SlotIndex, bool) + Send + 'static,
    {
        self.on_connection = Some(Box::new(callback));
    }

    /// Handle for arming the intercept hook, possibly from another thread.
    pub fn intercept(&self) -> InterceptHandle {
        InterceptHandle {
            hook: self.dispatcher.hook().clone(),
        }
    }

    /// Sample every slot once and dispatch what changed. Does nothing unless
    /// the interface is initialized.
    pub fn poll_events(&mut self) {
        if !self.is_initialized() {
            debug!("poll ignored: interface is {:?}", self.state);
            return;
        }

        self.source.refresh();
        for slot in 0..self.layout.slots {
            let Some(sample) = self.source.sample(slot) else {
                let last = &mut self.slots[slot];
                if last.connected {
                    last.connected = false;
                    info!("controller disconnected from slot {slot}");
                    if let Some(callback) = self.on_connection.as_mut() {
                        callback(slot, false);
                    }
                }
                continue;
            };

            let calibration = self
                .calibration
                .profile(slot)
                .copied()
                .unwrap_or_default();
            let last = &mut self.slots[slot];
            if !last.connected {
                self.differ.rebase(&sample, &calibration, last);
                last.connected = true;
                info!("controller connected to slot {slot}");
                if let Some(callback) = self.on_connection.as_mut() {
                    callback(slot, true);
                }
                continue;
            }

            self.scratch.clear();
            self.differ
                .diff(slot, &sample, &calibration, last, &mut self.scratch);
            for transition in &self.scratch {
                if let Delivery::Dispatched(0) =
                    self.dispatcher.dispatch(&mut self.bindings, transition)
                {
                    trace!("no binding for {:?}", transition.event);
                }
            }
        }
    }
}

impl<S: RawStateSource> Drop for ControllerInterface<S> {
    fn drop(&mut self) {
        if self.state == InterfaceState::Initialized {
            self.shutdown();
        }
    }
}
