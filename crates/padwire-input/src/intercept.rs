use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::debug;

use crate::events::{HookResult, InputEvent};

/// Callback that steals events while armed.
pub type HookCallback = Box<dyn FnMut(&InputEvent) -> HookResult + Send>;

#[derive(Default)]
struct HookSlot {
    callback: Option<HookCallback>,
    // Bumped by every arm/disarm so a callback that asked to continue is
    // not put back over a newer decision made while it was running.
    generation: u64,
}

/// Single-slot, globally armed event interceptor.
///
/// The lock is only held to hand the callback in or out; the callback
/// itself always runs unlocked.
#[derive(Default)]
pub struct InterceptHook {
    slot: Mutex<HookSlot>,
}

impl InterceptHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the hook, replacing any callback that was armed before.
    pub fn arm<F>(&self, callback: F)
    where
        F: FnMut(&InputEvent) -> HookResult + Send + 'static,
    {
        let mut slot = self.lock();
        slot.generation = slot.generation.wrapping_add(1);
        slot.callback = Some(Box::new(callback));
        debug!("event intercept armed");
    }

    /// Disarms the hook. Returns whether a callback was armed.
    pub fn disarm(&self) -> bool {
        let mut slot = self.lock();
        slot.generation = slot.generation.wrapping_add(1);
        let was_armed = slot.callback.take().is_some();
        if was_armed {
            debug!("event intercept disarmed");
        }
        was_armed
    }

    pub fn is_armed(&self) -> bool {
        self.lock().callback.is_some()
    }

    /// Offers `event` to the armed callback. Returns `true` when the event
    /// was consumed and must not reach regular bindings.
    pub fn try_consume(&self, event: &InputEvent) -> bool {
        let (mut callback, generation) = {
            let mut slot = self.lock();
            match slot.callback.take() {
                Some(callback) => (callback, slot.generation),
                None => return false,
            }
        };

        let result = callback(event);
        match result {
            HookResult::Stop => {
                debug!("event intercept consumed {event:?}");
            }
            HookResult::Continue => {
                let mut slot = self.lock();
                if slot.generation == generation && slot.callback.is_none() {
                    slot.callback = Some(callback);
                }
            }
        }
        true
    }

    fn lock(&self) -> MutexGuard<'_, HookSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Shareable handle to an interface's intercept hook, for capture UIs
/// running on other threads.
#[derive(Clone, Default)]
pub struct InterceptHandle {
    pub(crate) hook: Arc<InterceptHook>,
}

impl InterceptHandle {
    pub fn arm<F>(&self, callback: F)
    where
        F: FnMut(&InputEvent) -> HookResult + Send + 'static,
    {
        self.hook.arm(callback);
    }

    pub fn disarm(&self) -> bool {
        self.hook.disarm()
    }

    pub fn is_armed(&self) -> bool {
        self.hook.is_armed()
    }
}
