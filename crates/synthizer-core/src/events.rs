//! Event delivery from the audio thread to a host-owned consumer thread.
//!
//! Reuses the [`crate::ring`] SPSC primitive parameterized over a small
//! `Event` enum instead of raw samples.

use crate::handle::Handle;
use crate::ring::{AudioRing, Consumer, Producer};

/// Notifications the audio thread emits about object lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Event {
    /// Placeholder occupying empty ring slots; never observed by consumers
    /// since [`EventReceiver::try_recv`] only yields real pushes.
    #[default]
    None,
    /// A generator reached the end of its buffer without looping.
    Finished(Handle),
    /// A looping generator wrapped back to the start.
    Looped(Handle),
    /// A user-defined automation marker was reached.
    UserAutomation(Handle, u64),
}

/// Producer half, held by the audio thread.
pub struct EventSender {
    producer: Producer<Event>,
}

impl EventSender {
    /// Pushes one event; silently drops it if the queue is full, consistent
    /// with events being best-effort notifications rather than guaranteed
    /// delivery.
    pub fn push(&mut self, event: Event) {
        let _ = self.producer.write(&[event]);
    }
}

/// Consumer half, held by whichever host thread drains events.
pub struct EventReceiver {
    consumer: Consumer<Event>,
}

impl EventReceiver {
    /// Pops the next event, if any.
    pub fn try_recv(&mut self) -> Option<Event> {
        let mut buf = [Event::None];
        if self.consumer.read(&mut buf) == 1 {
            Some(buf[0])
        } else {
            None
        }
    }
}

/// Creates a fresh event queue split into its sender/receiver halves.
pub fn event_queue(capacity: usize) -> (EventSender, EventReceiver) {
    let (producer, consumer) = AudioRing::new(capacity);
    (EventSender { producer }, EventReceiver { consumer })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_delivered_in_order() {
        let (mut tx, mut rx) = event_queue(4);
        let handle = Handle::allocate();
        tx.push(Event::Finished(handle));
        tx.push(Event::Looped(handle));
        assert_eq!(rx.try_recv(), Some(Event::Finished(handle)));
        assert_eq!(rx.try_recv(), Some(Event::Looped(handle)));
        assert_eq!(rx.try_recv(), None);
    }
}
