//! The output-device boundary. Concrete backends (cpal, ALSA, WASAPI) are
//! named external collaborators and do not ship in this workspace; only the
//! trait and a test double live here.

/// An interleaved-or-planar audio output sink the [`crate::scheduler`]
/// submits finished blocks to.
pub trait AudioBackend: Send {
    /// Submits one block of planar audio for playback. Must not block for
    /// longer than the backend's own buffering allows; backpressure is the
    /// backend's responsibility, not the scheduler's. Takes borrowed slices
    /// so the scheduler never allocates to hand off a block.
    fn submit_block(&mut self, channels: &[&[f32]]);

    /// The channel count and sample rate this backend was opened with.
    fn format(&self) -> (usize, u32);
}

/// A backend that discards every block. Used by tests and by hosts that want
/// to drive the engine without producing sound (e.g. for pure event
/// monitoring).
#[cfg(any(test, feature = "test-support"))]
pub struct NullBackend {
    channels: usize,
    sample_rate: u32,
    /// Copies of every submitted block, for test assertions.
    pub captured: Vec<Vec<Vec<f32>>>,
}

#[cfg(any(test, feature = "test-support"))]
impl NullBackend {
    /// Creates a backend reporting `channels`/`sample_rate` as its format.
    pub fn new(channels: usize, sample_rate: u32) -> Self {
        Self {
            channels,
            sample_rate,
            captured: Vec::new(),
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl AudioBackend for NullBackend {
    fn submit_block(&mut self, channels: &[&[f32]]) {
        self.captured
            .push(channels.iter().map(|c| c.to_vec()).collect());
    }

    fn format(&self) -> (usize, u32) {
        (self.channels, self.sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_backend_captures_submitted_blocks() {
        let mut backend = NullBackend::new(2, 44_100);
        backend.submit_block(&[&[1.0, 2.0], &[3.0, 4.0]]);
        assert_eq!(backend.captured.len(), 1);
        assert_eq!(backend.format(), (2, 44_100));
    }
}
