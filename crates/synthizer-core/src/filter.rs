//! Per-channel biquad filter wrapping the pure DSP design/state pair from
//! `synthizer-dsp`, adding the multi-channel fan-out and identity bypass the
//! engine needs.

use synthizer_dsp::{BiquadCoeffs, BiquadState, FilterDesign};

/// A filter instance covering up to a fixed number of channels, each with
/// independent Direct-Form-I state but shared coefficients.
pub struct Filter {
    coeffs: BiquadCoeffs,
    per_channel: Vec<BiquadState>,
}

impl Filter {
    /// Creates a filter initialized to the identity design for `channels`
    /// channels.
    pub fn new(channels: usize) -> Self {
        Self {
            coeffs: BiquadCoeffs::IDENTITY,
            per_channel: vec![BiquadState::new(); channels.max(1)],
        }
    }

    /// Installs a new design, recomputing coefficients for `sample_rate`.
    /// Per-channel history is preserved (no reset), matching the property
    /// protocol's "apply at the next tick boundary" semantics without a
    /// click from discontinuous state.
    pub fn set_design(&mut self, design: &FilterDesign, sample_rate: f64) {
        self.coeffs = design.coeffs(sample_rate);
    }

    /// Whether the installed design is the identity filter; callers can use
    /// this to skip processing entirely.
    pub fn is_identity(&self) -> bool {
        self.coeffs.is_identity()
    }

    /// Filters `block` for channel `channel`, in place.
    pub fn process_channel(&mut self, channel: usize, block: &mut [f32]) {
        if let Some(state) = self.per_channel.get_mut(channel) {
            state.process_block(&self.coeffs, block);
        }
    }

    /// Resets all per-channel filter history to zero.
    pub fn reset(&mut self) {
        for state in &mut self.per_channel {
            state.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_filter_bypasses_every_channel() {
        let mut filter = Filter::new(2);
        let mut block = [0.3, -0.2, 0.9];
        let before = block;
        filter.process_channel(0, &mut block);
        assert_eq!(block, before);
    }

    #[test]
    fn installing_a_design_clears_identity_flag() {
        let mut filter = Filter::new(1);
        assert!(filter.is_identity());
        filter.set_design(
            &FilterDesign::Lowpass {
                frequency: 1000.0,
                q: 0.707,
            },
            44_100.0,
        );
        assert!(!filter.is_identity());
    }
}
