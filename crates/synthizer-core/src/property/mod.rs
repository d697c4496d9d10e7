//! Data-driven property protocol.
//!
//! Rather than generating per-object-type setter/getter code (the teacher's
//! automation parameters took this approach via `ParameterSpec` registration
//! per lane), each object kind exposes a static `&[PropertySlotDesc]` table.
//! `get`/`set` walk the table generically, so adding a property to an object
//! kind never requires new code on the protocol side.

mod queue;
mod schema;
mod shadow;
mod value;

pub use queue::{PropertyQueue, PropertyReceiver, PropertySender};
pub use schema::{index_of, PropertySlotDesc, PropertyTable};
pub use shadow::PropertyShadow;
pub use value::{PropertyKind, PropertyValue};

use crate::error::SynthizerError;

/// One property write destined for a specific object and slot.
#[derive(Clone, Copy, Debug)]
pub struct PropertyWrite {
    /// Index of the slot within the object's [`PropertyTable`].
    pub slot: usize,
    /// The value being written.
    pub value: PropertyValue,
}

/// Validates `value` against `desc` and returns the error the protocol
/// should surface to the caller if it fails.
pub fn validate(desc: &PropertySlotDesc, value: &PropertyValue) -> Result<(), SynthizerError> {
    if value.kind() != desc.kind {
        return Err(SynthizerError::PropertyTypeMismatch {
            name: desc.name,
            expected: desc.kind,
            got: value.kind(),
        });
    }
    if let Some(validator) = desc.validator {
        if !validator(value) {
            return Err(SynthizerError::InvalidPropertyValue(desc.name));
        }
    }
    Ok(())
}

/// The audio-thread half of the protocol for one object: the receiving end
/// of its property queue, plus the shadow slot it publishes external-visible
/// reads through. Embedded in `SourceBase`/generators/effects that declare a
/// [`PropertyTable`].
pub struct PropertyHost {
    table: PropertyTable,
    receiver: PropertyReceiver,
    shadow: PropertyShadow,
}

impl PropertyHost {
    /// Builds a host/endpoint pair for an object kind's `table`, with room
    /// for `capacity` pending writes.
    pub fn new(table: PropertyTable, capacity: usize) -> (Self, PropertyEndpoint) {
        let (sender, receiver) = PropertyQueue::new(capacity);
        let shadow = PropertyShadow::new(table);
        let endpoint = PropertyEndpoint {
            table,
            sender,
            shadow: shadow.clone(),
        };
        (
            Self {
                table,
                receiver,
                shadow,
            },
            endpoint,
        )
    }

    /// Drains every pending write, applying each via `apply(slot, value)`
    /// and publishing it to the shadow slot so external `get`s observe it
    /// from this point on. Writes already passed validation at `set` time;
    /// this never rejects one.
    pub fn drain(&mut self, mut apply: impl FnMut(usize, PropertyValue)) {
        let shadow = &self.shadow;
        self.receiver.drain(|write| {
            apply(write.slot, write.value);
            shadow.publish(write.slot, write.value);
        });
    }

    /// Publishes a value the audio thread computed itself (not from an
    /// external write) to the shadow slot, e.g. a buffer generator's
    /// playback position advancing every tick.
    pub fn publish(&self, slot: usize, value: PropertyValue) {
        self.shadow.publish(slot, value);
    }

    /// The schema this host validates writes against.
    pub fn table(&self) -> PropertyTable {
        self.table
    }
}

/// The external-thread half of the protocol for one object: enough to
/// validate and enqueue a `set`, and to read the coherent shadow view for a
/// `get`, without touching the audio thread. Cheaply `Clone`-able (every
/// field is a handle onto shared state).
#[derive(Clone)]
pub struct PropertyEndpoint {
    /// Schema this endpoint's object was constructed with.
    pub table: PropertyTable,
    /// Producer half of the object's property queue.
    pub sender: PropertySender,
    /// Coherent external-read view of the object's properties.
    pub shadow: PropertyShadow,
}
