//! Per-object MPSC property queue, drained once per audio tick.
//!
//! Grounded on the teacher's `AutomationLane`/`AutomationSender` pair
//! (`ringbuf::HeapRb` wrapped behind an `Arc<Mutex<_>>` producer side so many
//! external threads can enqueue writes for the same object, with a single
//! consumer owned by the audio thread).

use std::sync::Arc;

use parking_lot::Mutex;
use ringbuf::{HeapConsumer, HeapProducer, HeapRb};

use super::value::PropertyValue;
use super::PropertyWrite;

/// Producer handle for a single object's property queue. `Clone`-able and
/// `Send`/`Sync` so multiple external threads may hold one for the same
/// object.
#[derive(Clone)]
pub struct PropertySender {
    inner: Arc<Mutex<HeapProducer<PropertyWrite>>>,
}

impl PropertySender {
    /// Enqueues a write, returning `false` if the queue is full (the caller
    /// should retry or surface [`crate::SynthizerError::ResourceExhausted`]).
    pub fn send(&self, slot: usize, value: PropertyValue) -> bool {
        let write = PropertyWrite { slot, value };
        self.inner.lock().push(write).is_ok()
    }
}

/// Consumer half, owned exclusively by the audio thread.
pub struct PropertyReceiver {
    inner: HeapConsumer<PropertyWrite>,
}

impl PropertyReceiver {
    /// Drains all pending writes, applying `apply` to each in FIFO order.
    /// Later writes for the same slot within one drain therefore win, which
    /// is the intended "last write before the tick boundary wins" semantics.
    pub fn drain(&mut self, mut apply: impl FnMut(PropertyWrite)) {
        while let Some(write) = self.inner.pop() {
            apply(write);
        }
    }
}

/// A property queue split into its sender/receiver halves.
pub struct PropertyQueue;

impl PropertyQueue {
    /// Creates a new queue with room for `capacity` pending writes.
    pub fn new(capacity: usize) -> (PropertySender, PropertyReceiver) {
        let rb = HeapRb::new(capacity.max(1));
        let (producer, consumer) = rb.split();
        (
            PropertySender {
                inner: Arc::new(Mutex::new(producer)),
            },
            PropertyReceiver { inner: consumer },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_write_to_same_slot_wins_after_drain() {
        let (tx, mut rx) = PropertyQueue::new(8);
        tx.send(0, PropertyValue::Double(1.0));
        tx.send(0, PropertyValue::Double(2.0));
        let mut last = None;
        rx.drain(|write| last = Some(write.value));
        assert_eq!(last, Some(PropertyValue::Double(2.0)));
    }

    #[test]
    fn full_queue_reports_failure_instead_of_blocking() {
        let (tx, _rx) = PropertyQueue::new(1);
        assert!(tx.send(0, PropertyValue::Double(1.0)));
        assert!(!tx.send(0, PropertyValue::Double(2.0)));
    }
}
