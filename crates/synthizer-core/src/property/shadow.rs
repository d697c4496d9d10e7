//! The audio thread's publish side of a property's external-read view.

use std::sync::Arc;

use parking_lot::Mutex;

use super::schema::PropertyTable;
use super::value::PropertyValue;

/// Coherent external-read view of an object's properties. The audio thread
/// publishes here (either a just-drained external write, or a value it
/// advanced itself, e.g. a generator's playback position); external `get`
/// calls always read a value that was whole when it was written, never one
/// torn mid-write, without taking any lock the audio thread also blocks on
/// for longer than a slot assignment.
#[derive(Clone)]
pub struct PropertyShadow {
    slots: Arc<Mutex<Vec<PropertyValue>>>,
}

impl PropertyShadow {
    pub(super) fn new(table: PropertyTable) -> Self {
        Self {
            slots: Arc::new(Mutex::new(table.iter().map(|desc| desc.default).collect())),
        }
    }

    /// Publishes `value` for `slot`, visible to every subsequent `get`.
    pub fn publish(&self, slot: usize, value: PropertyValue) {
        if let Some(target) = self.slots.lock().get_mut(slot) {
            *target = value;
        }
    }

    /// Reads the current value of `slot`, or `None` if `slot` is out of
    /// range for this table.
    pub fn get(&self, slot: usize) -> Option<PropertyValue> {
        self.slots.lock().get(slot).copied()
    }
}
