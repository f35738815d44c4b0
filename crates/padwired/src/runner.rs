use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{after, never, select, tick, unbounded, Receiver};
use padwire_input::{
    ControllerInterface, Direction, HookResult, InputEvent, RawStateSource, SlotIndex,
};

use crate::config::Config;
use crate::names::{axis_name, button_name, describe, direction_suffix, pressed_word};
use crate::{print_debug, print_info, print_warning};

/// Receives one formatted line per dispatched input.
pub(crate) type Report = Arc<dyn Fn(String) + Send + Sync>;

/// Why a poll loop ended.
#[cfg_attr(not(feature = "sdl2-backend"), allow(dead_code))]
#[derive(Debug, PartialEq)]
pub(crate) enum Exit<T> {
    Finished(T),
    TimedOut,
    Stopped,
}

/// Bind a reporting callback to every control of every slot, replacing any
/// existing bindings.
pub(crate) fn bind_all<S: RawStateSource>(
    interface: &mut ControllerInterface<S>,
    report: &Report,
) -> padwire_input::Result<()> {
    interface.clear_bindings();
    let layout = interface.layout();
    for slot in 0..layout.slots {
        for axis in 0..layout.axes {
            let r = report.clone();
            interface.bind_controller_axis(slot, axis, move |s, a, v| {
                r(format!("slot {s} {} {v:.3}", axis_name(a)));
            })?;
            for direction in Direction::ALL {
                let r = report.clone();
                interface.bind_controller_axis_to_button(slot, axis, direction, move |s, a, p| {
                    r(format!(
                        "slot {s} {}({}) {}",
                        axis_name(a),
                        direction_suffix(direction),
                        pressed_word(p)
                    ));
                })?;
            }
        }
        for button in 0..layout.buttons {
            let r = report.clone();
            interface.bind_controller_button(slot, button, move |s, b, p| {
                r(format!("slot {s} {} {}", button_name(b), pressed_word(p)));
            })?;
        }
    }
    let r = report.clone();
    interface.set_connection_callback(move |slot, connected| {
        let state = if connected { "connected" } else { "disconnected" };
        r(format!("slot {slot} {state}"));
    });
    Ok(())
}

/// Drives a [`ControllerInterface`] at the configured cadence until asked
/// to stop.
#[cfg_attr(not(feature = "sdl2-backend"), allow(dead_code))]
pub(crate) struct Runner<S: RawStateSource> {
    interface: ControllerInterface<S>,
    poll_interval: Duration,
    capture_timeout: Duration,
    stop: Receiver<()>,
}

#[cfg_attr(not(feature = "sdl2-backend"), allow(dead_code))]
impl<S: RawStateSource> Runner<S> {
    /// Initialize the backend and apply the config's calibration.
    pub fn new(source: S, config: &Config, stop: Receiver<()>) -> padwire_input::Result<Self> {
        let mut interface = ControllerInterface::new(source);
        config.apply(&mut interface);
        interface.initialize()?;
        Ok(Self {
            interface,
            poll_interval: config.poll_interval,
            capture_timeout: config.capture_timeout,
            stop,
        })
    }

    pub fn interface(&self) -> &ControllerInterface<S> {
        &self.interface
    }

    /// Log every input until stopped.
    pub fn watch(&mut self) -> padwire_input::Result<()> {
        let report: Report = Arc::new(|line: String| {
            print_info!("{line}");
        });
        bind_all(&mut self.interface, &report)?;
        print_info!(
            "padwired started on {} backend. Press Ctrl+C to stop.",
            self.interface.backend_name()
        );
        self.poll_until(&never::<()>(), None);
        Ok(())
    }

    /// Wait for the next significant input. Smaller motion is swallowed
    /// while waiting and never reaches bindings.
    pub fn capture(&mut self) -> Exit<InputEvent> {
        let (tx, rx) = unbounded();
        let intercept = self.interface.intercept();
        intercept.arm(move |event| {
            if !event.is_significant() {
                return HookResult::Continue;
            }
            let _ = tx.send(*event);
            HookResult::Stop
        });
        print_info!("waiting for input...");

        let exit = self.poll_until(&rx, Some(self.capture_timeout));
        intercept.disarm();
        if let Exit::Finished(event) = &exit {
            print_info!("captured {}", describe(event));
        }
        exit
    }

    /// Rumble `slot` for `duration`, then stop the motors. Returns whether
    /// the slot had a controller to rumble.
    pub fn rumble(&mut self, slot: SlotIndex, strengths: &[f32], duration: Duration) -> bool {
        self.interface.poll_events();
        let motors = self.interface.controller_rumble_motor_count(slot);
        if motors == 0 {
            print_warning!("no controller in slot {slot}");
            return false;
        }
        print_debug!("rumbling slot {slot} ({motors} motors) for {duration:?}");
        self.interface.set_controller_rumble_strength(slot, strengths);
        let _ = self.poll_until(&never::<()>(), Some(duration));
        self.interface
            .set_controller_rumble_strength(slot, &vec![0.0; motors as usize]);
        true
    }

    /// Poll on every tick until `done` yields, the timeout elapses or a
    /// stop is requested.
    pub fn poll_until<T>(&mut self, done: &Receiver<T>, timeout: Option<Duration>) -> Exit<T> {
        let ticker = tick(self.poll_interval);
        let deadline = timeout.map_or_else(never, after);
        loop {
            select! {
                recv(self.stop) -> _ => return Exit::Stopped,
                recv(done) -> msg => match msg {
                    Ok(value) => return Exit::Finished(value),
                    Err(_) => return Exit::Stopped,
                },
                recv(deadline) -> _ => return Exit::TimedOut,
                recv(ticker) -> _ => self.interface.poll_events(),
            }
        }
    }

    pub fn shutdown(&mut self) {
        self.interface.shutdown();
    }
}
