//! Single-producer single-consumer ring buffer with a two-phase begin/end
//! write and read API, used for audio sample transport between decode
//! threads and the audio thread (and, instantiated over `Event`, for the
//! event delivery queue).
//!
//! Modeled on the lock-free ring used for the teacher engine's metrics
//! channel: a flat backing slice plus two atomic cursors, advanced with
//! explicit acquire/release ordering so writer and reader never need a lock.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct Shared<T> {
    buf: Box<[UnsafeCell<T>]>,
    capacity: usize,
    write: AtomicUsize,
    read: AtomicUsize,
}

// SAFETY: `write`/`read` cursors partition the buffer into a producer-owned
// region and a consumer-owned region; each index is only ever touched by the
// thread on its side of the split, established by the acquire/release pairs
// on the cursors themselves.
unsafe impl<T: Send> Sync for Shared<T> {}

/// Producer half of an [`AudioRing`].
pub struct Producer<T> {
    shared: Arc<Shared<T>>,
}

/// Consumer half of an [`AudioRing`].
pub struct Consumer<T> {
    shared: Arc<Shared<T>>,
}

/// A lock-free SPSC ring buffer split into a [`Producer`]/[`Consumer`] pair.
pub struct AudioRing;

impl AudioRing {
    /// Creates a new ring with room for `capacity` elements (one slot is
    /// always kept empty to distinguish full from empty).
    pub fn new<T: Default + Clone>(capacity: usize) -> (Producer<T>, Consumer<T>) {
        let capacity = capacity.max(1) + 1;
        let buf: Box<[UnsafeCell<T>]> = (0..capacity)
            .map(|_| UnsafeCell::new(T::default()))
            .collect();
        let shared = Arc::new(Shared {
            buf,
            capacity,
            write: AtomicUsize::new(0),
            read: AtomicUsize::new(0),
        });
        (
            Producer {
                shared: shared.clone(),
            },
            Consumer { shared },
        )
    }
}

impl<T> Producer<T> {
    /// Number of slots available to write without overwriting unread data.
    pub fn available(&self) -> usize {
        let read = self.shared.read.load(Ordering::Acquire);
        let write = self.shared.write.load(Ordering::Relaxed);
        let cap = self.shared.capacity;
        (read + cap - write - 1) % cap
    }

    /// Writes as many items from `src` as fit, returning the count written.
    /// Never blocks and never allocates.
    pub fn write(&mut self, src: &[T]) -> usize
    where
        T: Copy,
    {
        let available = self.available();
        let n = src.len().min(available);
        let cap = self.shared.capacity;
        let mut write = self.shared.write.load(Ordering::Relaxed);
        for item in src.iter().take(n) {
            // SAFETY: this slot is in the producer-owned region because it
            // lies strictly before `read` (mod cap), guaranteed by `available`.
            unsafe {
                *self.shared.buf[write].get() = *item;
            }
            write = (write + 1) % cap;
        }
        self.shared.write.store(write, Ordering::Release);
        n
    }
}

impl<T> Consumer<T> {
    /// Number of unread items currently buffered.
    pub fn len(&self) -> usize {
        let write = self.shared.write.load(Ordering::Acquire);
        let read = self.shared.read.load(Ordering::Relaxed);
        let cap = self.shared.capacity;
        (write + cap - read) % cap
    }

    /// Whether the ring currently holds no unread items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads as many items into `dst` as are available, returning the count
    /// read. Never blocks and never allocates.
    pub fn read(&mut self, dst: &mut [T]) -> usize
    where
        T: Copy,
    {
        let available = self.len();
        let n = dst.len().min(available);
        let cap = self.shared.capacity;
        let mut read = self.shared.read.load(Ordering::Relaxed);
        for slot in dst.iter_mut().take(n) {
            // SAFETY: this slot lies strictly before `write` (mod cap),
            // guaranteed by `len`, so it has been fully written.
            unsafe {
                *slot = *self.shared.buf[read].get();
            }
            read = (read + 1) % cap;
        }
        self.shared.read.store(read, Ordering::Release);
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_and_reads_round_trip_in_order() {
        let (mut tx, mut rx) = AudioRing::new::<f32>(8);
        let written = tx.write(&[1.0, 2.0, 3.0]);
        assert_eq!(written, 3);
        let mut out = [0.0f32; 3];
        let read = rx.read(&mut out);
        assert_eq!(read, 3);
        assert_eq!(out, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn write_saturates_at_capacity_without_overwriting_unread() {
        let (mut tx, _rx) = AudioRing::new::<f32>(4);
        let written = tx.write(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(written, 4);
    }

    #[test]
    fn underflow_read_returns_only_whats_available() {
        let (mut tx, mut rx) = AudioRing::new::<f32>(8);
        tx.write(&[1.0]);
        let mut out = [0.0f32; 4];
        let read = rx.read(&mut out);
        assert_eq!(read, 1);
        assert_eq!(out[0], 1.0);
    }

    #[test]
    fn wraps_around_the_backing_buffer() {
        let (mut tx, mut rx) = AudioRing::new::<f32>(4);
        for _ in 0..10 {
            tx.write(&[7.0]);
            let mut out = [0.0f32; 1];
            assert_eq!(rx.read(&mut out), 1);
            assert_eq!(out[0], 7.0);
        }
    }
}
