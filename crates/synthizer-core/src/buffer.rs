//! Immutable decoded-audio storage shared by generators.

use std::sync::Arc;

/// An immutable, reference-counted block of decoded audio: planar channels
/// of equal length, sharable cheaply across multiple generator instances.
#[derive(Clone)]
pub struct Buffer {
    inner: Arc<BufferData>,
}

struct BufferData {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl Buffer {
    /// Builds a buffer from already-decoded planar channel data. All
    /// channels must have equal length.
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        debug_assert!(
            channels.windows(2).all(|w| w[0].len() == w[1].len()),
            "buffer channels must have equal length"
        );
        Self {
            inner: Arc::new(BufferData {
                channels,
                sample_rate,
            }),
        }
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.inner.channels.len()
    }

    /// Number of frames (samples per channel).
    pub fn frame_count(&self) -> usize {
        self.inner.channels.first().map_or(0, |c| c.len())
    }

    /// The sample rate the buffer was decoded at.
    pub fn sample_rate(&self) -> u32 {
        self.inner.sample_rate
    }

    /// Read-only access to one channel's samples.
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.inner.channels[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_frame_and_channel_counts() {
        let buffer = Buffer::from_channels(vec![vec![0.0; 100], vec![0.0; 100]], 44_100);
        assert_eq!(buffer.channel_count(), 2);
        assert_eq!(buffer.frame_count(), 100);
    }

    #[test]
    fn clone_is_cheap_and_shares_storage() {
        let buffer = Buffer::from_channels(vec![vec![1.0; 4]], 44_100);
        let clone = buffer.clone();
        assert_eq!(clone.channel(0), buffer.channel(0));
    }
}
