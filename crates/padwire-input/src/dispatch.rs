use std::sync::Arc;

use crate::binding::BindingTable;
use crate::differ::Transition;
use crate::events::InputEvent;
use crate::intercept::InterceptHook;
use crate::types::Direction;

/// Where a transition ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delivery {
    Intercepted,
    /// Number of binding callbacks invoked (may be zero).
    Dispatched(usize),
}

/// Routes transitions to the intercept hook or to bound callbacks.
pub(crate) struct Dispatcher {
    hook: Arc<InterceptHook>,
}

impl Dispatcher {
    pub fn new(hook: Arc<InterceptHook>) -> Self {
        Self { hook }
    }

    pub fn hook(&self) -> &Arc<InterceptHook> {
        &self.hook
    }

    /// Callbacks run synchronously, axis first, then button, then the
    /// negative and positive axis-to-button bindings.
    pub fn dispatch(&self, bindings: &mut BindingTable, transition: &Transition) -> Delivery {
        if self.hook.try_consume(&transition.event) {
            return Delivery::Intercepted;
        }

        let mut invoked = 0;
        match transition.event {
            InputEvent::Axis { slot, axis, value } => {
                if let Some(callback) = bindings.axis_mut(slot, axis) {
                    callback(slot, axis, value);
                    invoked += 1;
                }
                for direction in Direction::ALL {
                    let Some(pressed) = transition.edges[direction.slot()] else {
                        continue;
                    };
                    if let Some(callback) = bindings.axis_button_mut(slot, axis, direction) {
                        callback(slot, axis, pressed);
                        invoked += 1;
                    }
                }
            }
            InputEvent::Button {
                slot,
                button,
                pressed,
            } => {
                if let Some(callback) = bindings.button_mut(slot, button) {
                    callback(slot, button, pressed);
                    invoked += 1;
                }
            }
        }
        Delivery::Dispatched(invoked)
    }
}
