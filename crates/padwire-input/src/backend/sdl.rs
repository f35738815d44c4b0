use std::time::{Duration, Instant};

use log::{debug, info, warn};
use padwire_bit_mask::Bitmask;
use sdl2::controller::{Axis as SdlAxis, Button as SdlButton, GameController};
use sdl2::{GameControllerSubsystem, Sdl};
use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::source::{strength_to_u16, RawStateSource};
use crate::types::{Axis, AxisRange, Button, Layout, RawSample, SlotIndex};

/// Number of controller slots exposed by the SDL2 backend.
const SDL_SLOTS: usize = 4;

// Longest rumble SDL accepts in one command.
const RUMBLE_DURATION_MS: u32 = 0xFFFF;

// Held strengths are sent again this often so they outlast a single command.
const RUMBLE_RENEW: Duration = Duration::from_secs(60);

/// Strengths last sent to a slot, kept until they are changed or stopped.
#[derive(Debug, Clone, Copy)]
struct HeldRumble {
    low: u16,
    high: u16,
    sent: Instant,
}

impl HeldRumble {
    fn due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.sent) >= RUMBLE_RENEW
    }
}

struct Context {
    // Keeps SDL alive for as long as the subsystem is used.
    _sdl: Sdl,
    subsystem: GameControllerSubsystem,
    joysticks: u32,
}

/// SDL2 game controller backend. SDL must be used from the thread that
/// opened it, so this source is neither `Send` nor `Sync`.
pub struct Sdl2Source {
    context: Option<Context>,
    slots: [Option<GameController>; SDL_SLOTS],
    rumble: [Option<HeldRumble>; SDL_SLOTS],
}

impl Default for Sdl2Source {
    fn default() -> Self {
        Self::new()
    }
}

impl Sdl2Source {
    pub fn new() -> Self {
        Self {
            context: None,
            slots: Default::default(),
            rumble: [None; SDL_SLOTS],
        }
    }

    /// Names of the controllers currently held, by slot.
    pub fn device_names(&self) -> Vec<(SlotIndex, String)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, ctrl)| {
                ctrl.as_ref()
                    .filter(|c| c.attached())
                    .map(|c| (slot, c.name()))
            })
            .collect()
    }

    /// Open every game controller not yet held into a free slot.
    fn enumerate(&mut self) {
        let Some(context) = self.context.as_mut() else {
            return;
        };
        let count = match context.subsystem.num_joysticks() {
            Ok(count) => count,
            Err(e) => {
                warn!("sdl: failed to count joysticks: {e}");
                return;
            }
        };
        if count == context.joysticks {
            return;
        }
        context.joysticks = count;

        for (slot, held) in self.slots.iter_mut().zip(self.rumble.iter_mut()) {
            if slot.as_ref().is_some_and(|c| !c.attached()) {
                *slot = None;
                *held = None;
            }
        }

        for index in 0..count {
            if !context.subsystem.is_game_controller(index) {
                continue;
            }
            let controller = match context.subsystem.open(index) {
                Ok(controller) => controller,
                Err(e) => {
                    debug!("sdl: cannot open device {index}: {e}");
                    continue;
                }
            };
            let id = controller.instance_id();
            if self
                .slots
                .iter()
                .flatten()
                .any(|held| held.instance_id() == id)
            {
                continue;
            }
            let Some(free) = self.slots.iter_mut().find(|s| s.is_none()) else {
                break;
            };
            info!("sdl: opened {}", controller.name());
            *free = Some(controller);
        }
    }

    /// Send held strengths again before SDL lets them lapse.
    fn renew_rumble(&mut self, now: Instant) {
        for (slot, (controller, held)) in self
            .slots
            .iter_mut()
            .zip(self.rumble.iter_mut())
            .enumerate()
        {
            let Some(rumble) = held.as_mut().filter(|r| r.due(now)) else {
                continue;
            };
            match controller.as_mut().filter(|c| c.attached()) {
                Some(controller) => {
                    send_rumble(controller, slot, rumble.low, rumble.high, RUMBLE_DURATION_MS);
                    rumble.sent = now;
                }
                None => *held = None,
            }
        }
    }
}

fn send_rumble(
    controller: &mut GameController,
    slot: SlotIndex,
    low: u16,
    high: u16,
    duration: u32,
) {
    if let Err(e) = controller.set_rumble(low, high, duration) {
        warn!("sdl: failed to set rumble on slot {slot}: {e}");
    }
}

impl RawStateSource for Sdl2Source {
    fn name(&self) -> &'static str {
        "sdl2"
    }

    fn layout(&self) -> Layout {
        Layout::standard(SDL_SLOTS)
    }

    fn axis_range(&self, axis: u32) -> AxisRange {
        if Axis::ALL
            .get(axis as usize)
            .is_some_and(|axis| axis.is_trigger())
        {
            AxisRange::POSITIVE_16
        } else {
            AxisRange::SIGNED_16
        }
    }

    fn open(&mut self) -> Result<()> {
        if self.context.is_some() {
            return Ok(());
        }
        let sdl = sdl2::init().map_err(Error::BackendUnavailable)?;
        let subsystem = sdl.game_controller().map_err(Error::BackendUnavailable)?;
        self.context = Some(Context {
            _sdl: sdl,
            subsystem,
            joysticks: u32::MAX,
        });
        self.enumerate();
        Ok(())
    }

    fn close(&mut self) {
        self.rumble = [None; SDL_SLOTS];
        self.slots = Default::default();
        self.context = None;
    }

    fn refresh(&mut self) {
        if let Some(context) = self.context.as_ref() {
            context.subsystem.update();
        }
        self.enumerate();
        self.renew_rumble(Instant::now());
    }

    fn sample(&mut self, slot: SlotIndex) -> Option<RawSample> {
        let controller = self.slots.get(slot)?.as_ref()?;
        if !controller.attached() {
            return None;
        }
        let axes: SmallVec<[i32; 8]> = Axis::ALL
            .iter()
            .map(|axis| i32::from(controller.axis(map_axis(*axis))))
            .collect();
        let mut buttons = Bitmask::empty();
        for button in Button::ALL {
            buttons.set(button.into(), controller.button(map_button(button)));
        }
        Some(RawSample { axes, buttons })
    }

    fn motors(&self, slot: SlotIndex) -> u32 {
        match self.slots.get(slot) {
            Some(Some(controller)) if controller.has_rumble() => self.layout().motors,
            _ => 0,
        }
    }

    fn set_vibration(&mut self, slot: SlotIndex, strengths: &[f32]) {
        let Some(Some(controller)) = self.slots.get_mut(slot) else {
            return;
        };
        let low = strength_to_u16(strengths.first().copied().unwrap_or(0.0));
        let high = strength_to_u16(strengths.get(1).copied().unwrap_or(0.0));
        if low == 0 && high == 0 {
            send_rumble(controller, slot, 0, 0, 0);
            self.rumble[slot] = None;
        } else {
            send_rumble(controller, slot, low, high, RUMBLE_DURATION_MS);
            self.rumble[slot] = Some(HeldRumble {
                low,
                high,
                sent: Instant::now(),
            });
        }
    }
}

fn map_axis(axis: Axis) -> SdlAxis {
    match axis {
        Axis::LeftX => SdlAxis::LeftX,
        Axis::LeftY => SdlAxis::LeftY,
        Axis::RightX => SdlAxis::RightX,
        Axis::RightY => SdlAxis::RightY,
        Axis::LeftTrigger => SdlAxis::TriggerLeft,
        Axis::RightTrigger => SdlAxis::TriggerRight,
    }
}

fn map_button(button: Button) -> SdlButton {
    match button {
        Button::DPadUp => SdlButton::DPadUp,
        Button::DPadDown => SdlButton::DPadDown,
        Button::DPadLeft => SdlButton::DPadLeft,
        Button::DPadRight => SdlButton::DPadRight,
        Button::Start => SdlButton::Start,
        Button::Back => SdlButton::Back,
        Button::LeftStick => SdlButton::LeftStick,
        Button::RightStick => SdlButton::RightStick,
        Button::LeftShoulder => SdlButton::LeftShoulder,
        Button::RightShoulder => SdlButton::RightShoulder,
        Button::Guide => SdlButton::Guide,
        Button::A => SdlButton::A,
        Button::B => SdlButton::B,
        Button::X => SdlButton::X,
        Button::Y => SdlButton::Y,
    }
}
