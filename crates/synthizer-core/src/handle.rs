//! Opaque external handles to audio-thread-owned objects.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// An opaque, ABI-friendly reference to an audio-thread-owned object.
///
/// `Handle` is a plain `u64` newtype with no lifetime so that a future
/// `extern "C"` layer could wrap it directly; no such layer exists in this
/// workspace (the C ABI is out of scope here).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u64);

impl Handle {
    /// Allocates a fresh, process-unique handle value. Does not by itself
    /// register anything in a handle table; callers pair this with insertion
    /// into whichever table owns the object.
    pub fn allocate() -> Self {
        Handle(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw integer value, exposed for logging and potential future ABI use.
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_unique() {
        let a = Handle::allocate();
        let b = Handle::allocate();
        assert_ne!(a, b);
    }
}
