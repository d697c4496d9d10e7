//! Equal-power stereo panning.

use synthizer_dsp::constant_power;

/// Pans a mono signal to stereo by angle in `[-1.0, 1.0]` (`-1` full left,
/// `1` full right), using constant-power gains so perceived loudness stays
/// constant across the sweep.
pub struct StereoPanner {
    pan: f32,
}

impl StereoPanner {
    /// Creates a panner centered (`pan = 0.0`).
    pub fn new() -> Self {
        Self { pan: 0.0 }
    }

    /// Sets the pan position, clamped to `[-1.0, 1.0]`.
    pub fn set_pan(&mut self, pan: f32) {
        self.pan = pan.clamp(-1.0, 1.0);
    }

    /// Applies the configured pan to `input`, writing into `out_l`/`out_r`.
    pub fn process_block(&mut self, input: &[f32], out_l: &mut [f32], out_r: &mut [f32]) {
        let (gain_l, gain_r) = constant_power(self.pan);
        for ((sample, l), r) in input.iter().zip(out_l.iter_mut()).zip(out_r.iter_mut()) {
            *l = sample * gain_l;
            *r = sample * gain_r;
        }
    }
}

impl Default for StereoPanner {
    fn default() -> Self {
        Self::new()
    }
}
