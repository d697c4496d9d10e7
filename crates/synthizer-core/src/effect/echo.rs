//! Multi-tap delay effect: a bank of fixed taps reading from a single large
//! delay memory, each with an independent `(delay, gain_l, gain_r)`.

use synthizer_dsp::{Tap, TapDelayBank};

use super::Effect;

/// A single configured echo tap, in application units (seconds/linear gain)
/// rather than the frame/float units `synthizer_dsp::Tap` uses internally.
#[derive(Clone, Copy, Debug)]
pub struct EchoTap {
    /// Delay time in seconds.
    pub delay_seconds: f32,
    /// Linear gain applied to the left output.
    pub gain_l: f32,
    /// Linear gain applied to the right output.
    pub gain_r: f32,
}

/// Multi-tap delay effect.
pub struct Echo {
    bank_l: TapDelayBank,
    bank_r: TapDelayBank,
    sample_rate: f32,
}

impl Echo {
    /// Creates an echo effect with room for delays up to `max_delay_seconds`.
    pub fn new(sample_rate: f32, max_delay_seconds: f32) -> Self {
        let max_frames = (sample_rate * max_delay_seconds).ceil() as usize;
        Self {
            bank_l: TapDelayBank::new(max_frames.max(1)),
            bank_r: TapDelayBank::new(max_frames.max(1)),
            sample_rate,
        }
    }

    /// Replaces the configured tap list.
    pub fn set_taps(&mut self, taps: &[EchoTap]) {
        let to_dsp = |tap: &EchoTap, gain: f32| Tap {
            delay_frames: (tap.delay_seconds * self.sample_rate).round() as usize,
            gain_l: gain,
            gain_r: 0.0,
        };
        self.bank_l
            .set_taps(taps.iter().map(|t| to_dsp(t, t.gain_l)).collect());
        self.bank_r
            .set_taps(taps.iter().map(|t| to_dsp(t, t.gain_r)).collect());
    }
}

impl Effect for Echo {
    fn process_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        for sample in left.iter_mut() {
            let (wet, _) = self.bank_l.process_sample(*sample);
            *sample = wet;
        }
        for sample in right.iter_mut() {
            let (wet, _) = self.bank_r.process_sample(*sample);
            *sample = wet;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_tap_reproduces_input_after_its_delay() {
        let mut echo = Echo::new(1000.0, 1.0);
        echo.set_taps(&[EchoTap {
            delay_seconds: 0.003,
            gain_l: 1.0,
            gain_r: 1.0,
        }]);
        let mut left = vec![0.0; 10];
        let mut right = vec![0.0; 10];
        left[0] = 1.0;
        right[0] = 1.0;
        echo.process_block(&mut left, &mut right);
        assert!((left[3] - 1.0).abs() < 1e-6);
        assert!((right[3] - 1.0).abs() < 1e-6);
    }
}
