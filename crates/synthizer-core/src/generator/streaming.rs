//! Streams audio from a decode thread through an [`crate::ring::AudioRing`]
//! instead of holding the whole asset in memory.

use crate::ring::Consumer;
use super::Generator;

/// Reads mono samples from a ring fed by a background decode thread.
/// Underflow (the decode thread falling behind) is filled with silence
/// rather than blocking the audio thread.
pub struct StreamingGenerator {
    ring: Consumer<f32>,
    finished: bool,
}

impl StreamingGenerator {
    /// Wraps the consumer half of a ring a decode thread is feeding.
    pub fn new(ring: Consumer<f32>) -> Self {
        Self {
            ring,
            finished: false,
        }
    }

    /// Marks the stream as finished; future blocks report `true` once the
    /// ring drains, letting already-buffered audio play out.
    pub fn mark_finished(&mut self) {
        self.finished = true;
    }
}

impl Generator for StreamingGenerator {
    fn generate_block(&mut self, out: &mut [f32]) -> bool {
        let read = self.ring.read(out);
        if read < out.len() {
            out[read..].iter_mut().for_each(|s| *s = 0.0);
        }
        self.finished && self.ring.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::AudioRing;

    #[test]
    fn underflow_fills_remainder_with_silence() {
        let (mut tx, rx) = AudioRing::new::<f32>(8);
        tx.write(&[1.0, 2.0]);
        let mut generator = StreamingGenerator::new(rx);
        let mut out = vec![9.0; 4];
        generator.generate_block(&mut out);
        assert_eq!(out, vec![1.0, 2.0, 0.0, 0.0]);
    }

    #[test]
    fn reports_finished_only_after_ring_drains() {
        let (mut tx, rx) = AudioRing::new::<f32>(8);
        tx.write(&[1.0]);
        let mut generator = StreamingGenerator::new(rx);
        generator.mark_finished();
        let mut out = vec![0.0; 4];
        assert!(generator.generate_block(&mut out));
    }
}
