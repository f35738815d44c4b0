use std::fmt;

use crate::error::{Error, Result};
use crate::types::{Direction, Layout, SlotIndex};

/// Receives `(slot, axis, effective_value)`.
pub type AxisCallback = Box<dyn FnMut(SlotIndex, u32, f32) + Send>;
/// Receives `(slot, control, pressed)`. For axis-to-button bindings the
/// control is the axis index.
pub type ButtonCallback = Box<dyn FnMut(SlotIndex, u32, bool) + Send>;

/// The three ways a callback can be attached to a physical control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    Axis,
    Button,
    AxisToButton(Direction),
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingKind::Axis => f.write_str("axis"),
            BindingKind::Button => f.write_str("button"),
            BindingKind::AxisToButton(Direction::Negative) => f.write_str("axis(-)"),
            BindingKind::AxisToButton(Direction::Positive) => f.write_str("axis(+)"),
        }
    }
}

struct SlotBindings {
    axes: Vec<Option<AxisCallback>>,
    buttons: Vec<Option<ButtonCallback>>,
    axis_buttons: Vec<[Option<ButtonCallback>; 2]>,
}

impl SlotBindings {
    fn new(layout: &Layout) -> Self {
        Self {
            axes: (0..layout.axes).map(|_| None).collect(),
            buttons: (0..layout.buttons).map(|_| None).collect(),
            axis_buttons: (0..layout.axes).map(|_| [None, None]).collect(),
        }
    }

    fn clear(&mut self) {
        self.axes.iter_mut().for_each(|cb| *cb = None);
        self.buttons.iter_mut().for_each(|cb| *cb = None);
        self.axis_buttons.iter_mut().for_each(|cbs| *cbs = [None, None]);
    }

    fn count(&self) -> usize {
        self.axes.iter().filter(|cb| cb.is_some()).count()
            + self.buttons.iter().filter(|cb| cb.is_some()).count()
            + self
                .axis_buttons
                .iter()
                .flatten()
                .filter(|cb| cb.is_some())
                .count()
    }
}

/// Callbacks per slot, indexed directly by physical control number.
///
/// A (slot, control, kind) triple holds at most one callback. There is no
/// per-binding unbind; [`BindingTable::clear`] drops everything.
pub struct BindingTable {
    slots: Vec<SlotBindings>,
}

impl BindingTable {
    pub fn new(layout: &Layout) -> Self {
        Self {
            slots: (0..layout.slots).map(|_| SlotBindings::new(layout)).collect(),
        }
    }

    pub fn bind_axis(
        &mut self,
        slot: SlotIndex,
        axis: u32,
        callback: AxisCallback,
    ) -> Result<()> {
        let entry = self
            .slot_mut(slot)?
            .axes
            .get_mut(axis as usize)
            .ok_or(Error::InvalidControl(axis))?;
        claim(entry, callback, slot, BindingKind::Axis, axis)
    }

    pub fn bind_button(
        &mut self,
        slot: SlotIndex,
        button: u32,
        callback: ButtonCallback,
    ) -> Result<()> {
        let entry = self
            .slot_mut(slot)?
            .buttons
            .get_mut(button as usize)
            .ok_or(Error::InvalidControl(button))?;
        claim(entry, callback, slot, BindingKind::Button, button)
    }

    pub fn bind_axis_to_button(
        &mut self,
        slot: SlotIndex,
        axis: u32,
        direction: Direction,
        callback: ButtonCallback,
    ) -> Result<()> {
        let entry = self
            .slot_mut(slot)?
            .axis_buttons
            .get_mut(axis as usize)
            .ok_or(Error::InvalidControl(axis))?;
        claim(
            &mut entry[direction.slot()],
            callback,
            slot,
            BindingKind::AxisToButton(direction),
            axis,
        )
    }

    /// Removes all bindings for all slots.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(SlotBindings::clear);
    }

    pub fn is_bound(&self, slot: SlotIndex, index: u32, kind: BindingKind) -> bool {
        let Some(bindings) = self.slots.get(slot) else {
            return false;
        };
        let index = index as usize;
        match kind {
            BindingKind::Axis => bindings.axes.get(index).is_some_and(Option::is_some),
            BindingKind::Button => {
                bindings.buttons.get(index).is_some_and(Option::is_some)
            }
            BindingKind::AxisToButton(direction) => bindings
                .axis_buttons
                .get(index)
                .is_some_and(|cbs| cbs[direction.slot()].is_some()),
        }
    }

    /// Total number of registered callbacks.
    pub fn len(&self) -> usize {
        self.slots.iter().map(SlotBindings::count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub(crate) fn axis_mut(
        &mut self,
        slot: SlotIndex,
        axis: u32,
    ) -> Option<&mut AxisCallback> {
        self.slots.get_mut(slot)?.axes.get_mut(axis as usize)?.as_mut()
    }

    #[inline]
    pub(crate) fn button_mut(
        &mut self,
        slot: SlotIndex,
        button: u32,
    ) -> Option<&mut ButtonCallback> {
        self.slots.get_mut(slot)?.buttons.get_mut(button as usize)?.as_mut()
    }

    #[inline]
    pub(crate) fn axis_button_mut(
        &mut self,
        slot: SlotIndex,
        axis: u32,
        direction: Direction,
    ) -> Option<&mut ButtonCallback> {
        self.slots.get_mut(slot)?.axis_buttons.get_mut(axis as usize)?
            [direction.slot()]
        .as_mut()
    }

    fn slot_mut(&mut self, slot: SlotIndex) -> Result<&mut SlotBindings> {
        self.slots.get_mut(slot).ok_or(Error::InvalidSlot(slot))
    }
}

fn claim<T>(
    entry: &mut Option<T>,
    callback: T,
    slot: SlotIndex,
    kind: BindingKind,
    index: u32,
) -> Result<()> {
    if entry.is_some() {
        return Err(Error::DuplicateBinding { slot, kind, index });
    }
    *entry = Some(callback);
    Ok(())
}
