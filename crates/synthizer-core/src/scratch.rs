//! Block buffer cache: a pool of reusable scratch buses, plus a guarded
//! global allocator that panics on heap activity while the audio thread is
//! inside a tick, so tests can assert zero-allocation real-time behavior.
//!
//! Grounded on the teacher's `Scratch`/`RtAllocGuard`/`GuardedAllocator`
//! trio.

use std::cell::Cell;

/// A single scratch bus: `channels` planar `Vec<f32>`s of `frames` samples
/// each, zeroed on acquisition.
pub struct Bus {
    channels: Vec<Vec<f32>>,
}

impl Bus {
    fn new(channels: usize, frames: usize) -> Self {
        Self {
            channels: (0..channels).map(|_| vec![0.0; frames]).collect(),
        }
    }

    fn resize(&mut self, channels: usize, frames: usize) {
        self.channels.resize_with(channels, || vec![0.0; frames]);
        for channel in &mut self.channels {
            channel.resize(frames, 0.0);
        }
    }

    fn clear(&mut self) {
        for channel in &mut self.channels {
            channel.iter_mut().for_each(|s| *s = 0.0);
        }
    }

    /// Planar channel slices, read-write.
    pub fn channels_mut(&mut self) -> &mut [Vec<f32>] {
        &mut self.channels
    }

    /// Planar channel slices, read-only.
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }
}

/// Scoped handle to a [`Bus`] borrowed from a [`BufferCache`]. Returns the
/// bus to the cache's free list on drop instead of deallocating it.
pub struct BusGuard<'a> {
    cache: &'a mut BufferCache,
    bus: Option<Bus>,
}

impl<'a> std::ops::Deref for BusGuard<'a> {
    type Target = Bus;
    fn deref(&self) -> &Bus {
        self.bus.as_ref().expect("bus taken before guard dropped")
    }
}

impl<'a> std::ops::DerefMut for BusGuard<'a> {
    fn deref_mut(&mut self) -> &mut Bus {
        self.bus.as_mut().expect("bus taken before guard dropped")
    }
}

impl<'a> Drop for BusGuard<'a> {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.take() {
            self.cache.free.push(bus);
        }
    }
}

/// A pool of [`Bus`]es reused across ticks, pre-populated at construction so
/// steady-state operation never allocates.
pub struct BufferCache {
    free: Vec<Bus>,
    channels: usize,
    frames: usize,
}

impl BufferCache {
    /// Creates a cache with `reserve` pre-allocated buses sized for
    /// `channels` x `frames`.
    pub fn new(reserve: usize, channels: usize, frames: usize) -> Self {
        Self {
            free: (0..reserve).map(|_| Bus::new(channels, frames)).collect(),
            channels,
            frames,
        }
    }

    /// Borrows a zeroed bus from the pool, growing the pool (off the audio
    /// thread's steady-state path) if it is momentarily exhausted.
    pub fn acquire(&mut self) -> BusGuard<'_> {
        let mut bus = self.free.pop().unwrap_or_else(|| {
            tracing::warn!("buffer cache exhausted, growing pool");
            Bus::new(self.channels, self.frames)
        });
        bus.resize(self.channels, self.frames);
        bus.clear();
        BusGuard {
            cache: self,
            bus: Some(bus),
        }
    }
}

thread_local! {
    static RT_GUARD_ACTIVE: Cell<bool> = Cell::new(false);
}

/// Marks the current thread as "inside a real-time tick" for the duration of
/// its lifetime. While active, and under `cfg(deny_alloc_in_rt)`, any heap
/// allocation on this thread panics via [`GuardedAllocator`].
pub struct RtAllocGuard {
    _private: (),
}

impl RtAllocGuard {
    /// Enters the guarded region. Reentrant: nesting guards is a no-op past
    /// the first.
    pub fn enter() -> Self {
        RT_GUARD_ACTIVE.with(|flag| flag.set(true));
        Self { _private: () }
    }

    /// Whether the current thread is inside a guarded region.
    pub fn is_active() -> bool {
        RT_GUARD_ACTIVE.with(|flag| flag.get())
    }
}

impl Drop for RtAllocGuard {
    fn drop(&mut self) {
        RT_GUARD_ACTIVE.with(|flag| flag.set(false));
    }
}

#[cfg(any(test, deny_alloc_in_rt))]
mod guarded_alloc {
    use super::RtAllocGuard;
    use std::alloc::{GlobalAlloc, Layout, System};

    /// Wraps the system allocator, panicking on any allocation performed
    /// while [`RtAllocGuard::is_active`] is true on the calling thread.
    pub struct GuardedAllocator;

    unsafe impl GlobalAlloc for GuardedAllocator {
        unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
            if RtAllocGuard::is_active() {
                panic!("heap allocation attempted inside a real-time tick");
            }
            unsafe { System.alloc(layout) }
        }

        unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
            unsafe { System.dealloc(ptr, layout) }
        }
    }

    #[global_allocator]
    static GLOBAL: GuardedAllocator = GuardedAllocator;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquired_bus_is_zeroed_and_sized() {
        let mut cache = BufferCache::new(2, 2, 4);
        let bus = cache.acquire();
        assert_eq!(bus.channels().len(), 2);
        assert_eq!(bus.channels()[0].len(), 4);
        assert!(bus.channels()[0].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn bus_returns_to_pool_on_drop() {
        let mut cache = BufferCache::new(1, 1, 4);
        {
            let _bus = cache.acquire();
            assert_eq!(cache.free.len(), 0);
        }
        assert_eq!(cache.free.len(), 1);
    }

    #[test]
    #[should_panic(expected = "heap allocation attempted")]
    fn allocation_inside_guard_panics() {
        let _guard = RtAllocGuard::enter();
        let v: Vec<u8> = Vec::with_capacity(1024);
        std::hint::black_box(&v);
    }

    #[test]
    fn no_allocation_outside_guard_is_fine() {
        let v: Vec<u8> = Vec::with_capacity(1024);
        assert_eq!(v.capacity(), 1024);
    }
}
