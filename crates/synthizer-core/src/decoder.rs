//! Decoder and streaming-source boundaries. Concrete decoders (FLAC/MP3/WAV)
//! are named external collaborators and do not ship in this workspace; only
//! the traits and test doubles live here.

use crate::error::SynthizerError;

/// Decodes an entire audio asset up front into planar `f32` channels,
/// backing a [`crate::buffer::Buffer`].
pub trait Decoder {
    /// Decodes the full asset, returning planar channels of equal length.
    fn decode_all(&mut self) -> Result<(Vec<Vec<f32>>, u32), SynthizerError>;
}

/// Supplies audio incrementally, for streaming generators that must not hold
/// an entire asset in memory.
pub trait Stream: Send {
    /// Fills `out` (one slice per channel) with up to `out[0].len()` frames,
    /// returning the number of frames actually written. Returning fewer
    /// frames than requested signals end-of-stream.
    fn read(&mut self, out: &mut [Vec<f32>]) -> usize;

    /// Number of channels this stream produces.
    fn channel_count(&self) -> usize;

    /// The stream's native sample rate.
    fn sample_rate(&self) -> u32;
}

/// A [`Decoder`] over samples already resident in memory, for tests.
#[cfg(any(test, feature = "test-support"))]
pub struct SliceDecoder {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

#[cfg(any(test, feature = "test-support"))]
impl SliceDecoder {
    /// Wraps already-decoded channel data.
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        Self {
            channels,
            sample_rate,
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Decoder for SliceDecoder {
    fn decode_all(&mut self) -> Result<(Vec<Vec<f32>>, u32), SynthizerError> {
        Ok((self.channels.clone(), self.sample_rate))
    }
}

/// A [`Stream`] over samples already resident in memory, for tests.
#[cfg(any(test, feature = "test-support"))]
pub struct SliceStream {
    channels: Vec<Vec<f32>>,
    position: usize,
    sample_rate: u32,
}

#[cfg(any(test, feature = "test-support"))]
impl SliceStream {
    /// Wraps already-decoded channel data to be read incrementally.
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        Self {
            channels,
            position: 0,
            sample_rate,
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Stream for SliceStream {
    fn read(&mut self, out: &mut [Vec<f32>]) -> usize {
        let remaining = self.channels[0].len().saturating_sub(self.position);
        let n = out.first().map_or(0, |c| c.len()).min(remaining);
        for (channel_out, channel_src) in out.iter_mut().zip(self.channels.iter()) {
            channel_out[..n].copy_from_slice(&channel_src[self.position..self.position + n]);
        }
        self.position += n;
        n
    }

    fn channel_count(&self) -> usize {
        self.channels.len()
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_decoder_returns_its_channels_verbatim() {
        let mut decoder = SliceDecoder::new(vec![vec![1.0, 2.0]], 44_100);
        let (channels, sample_rate) = decoder.decode_all().unwrap();
        assert_eq!(channels, vec![vec![1.0, 2.0]]);
        assert_eq!(sample_rate, 44_100);
    }

    #[test]
    fn slice_stream_reports_short_read_at_end() {
        let mut stream = SliceStream::new(vec![vec![1.0, 2.0, 3.0]], 44_100);
        let mut out = vec![vec![0.0; 2]];
        assert_eq!(stream.read(&mut out), 2);
        let mut out2 = vec![vec![0.0; 2]];
        assert_eq!(stream.read(&mut out2), 1);
    }
}
