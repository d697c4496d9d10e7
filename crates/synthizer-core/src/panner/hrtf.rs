//! HRTF-based spatialization: bilinear interpolation over the four nearest
//! azimuth/elevation grid cells, crossfaded across a block whenever the
//! source direction changes to avoid zipper artifacts, plus a fractional
//! inter-aural time delay.
//!
//! The compiled-in dataset is a small synthetic azimuth x elevation grid of
//! short FIR taps, sufficient to exercise the interpolation and crossfade
//! machinery deterministically; it is not a claim of acoustic fidelity.

use synthizer_dsp::DelayLine;

const AZIMUTH_STEPS: usize = 8;
const ELEVATION_STEPS: usize = 3;
const TAP_LEN: usize = 8;
const MAX_ITD_SAMPLES: f32 = 32.0;

/// A single direction's impulse response, one per ear.
#[derive(Clone, Copy)]
struct HrtfCell {
    left: [f32; TAP_LEN],
    right: [f32; TAP_LEN],
    itd_samples: f32,
}

/// The compiled-in HRTF dataset: an azimuth x elevation grid of [`HrtfCell`].
pub struct HrtfDataset {
    cells: Vec<HrtfCell>,
}

impl HrtfDataset {
    /// Synthesizes a deterministic placeholder dataset: gains fall off
    /// smoothly away from the ipsilateral ear and the ITD grows with
    /// azimuth, matching the qualitative shape of a real HRTF set without
    /// claiming acoustic measurement.
    pub fn synthetic() -> Self {
        let mut cells = Vec::with_capacity(AZIMUTH_STEPS * ELEVATION_STEPS);
        for elevation_idx in 0..ELEVATION_STEPS {
            for azimuth_idx in 0..AZIMUTH_STEPS {
                let azimuth =
                    azimuth_idx as f32 / AZIMUTH_STEPS as f32 * std::f32::consts::TAU;
                let elevation_scale =
                    1.0 - (elevation_idx as f32 / (ELEVATION_STEPS - 1).max(1) as f32) * 0.2;
                let pan = azimuth.sin();
                let mut left = [0.0; TAP_LEN];
                let mut right = [0.0; TAP_LEN];
                left[0] = (1.0 - pan.max(0.0) * 0.6) * elevation_scale;
                right[0] = (1.0 + pan.min(0.0) * 0.6) * elevation_scale;
                cells.push(HrtfCell {
                    left,
                    right,
                    itd_samples: pan * MAX_ITD_SAMPLES,
                });
            }
        }
        Self { cells }
    }

    fn cell(&self, azimuth_idx: usize, elevation_idx: usize) -> &HrtfCell {
        let azimuth_idx = azimuth_idx % AZIMUTH_STEPS;
        let elevation_idx = elevation_idx.min(ELEVATION_STEPS - 1);
        &self.cells[elevation_idx * AZIMUTH_STEPS + azimuth_idx]
    }

    /// Bilinearly interpolates the four nearest cells around
    /// `(azimuth, elevation)` (both in radians, elevation in `[-PI/2, PI/2]`).
    fn interpolate(&self, azimuth: f32, elevation: f32) -> HrtfCell {
        let az_norm = azimuth.rem_euclid(std::f32::consts::TAU) / std::f32::consts::TAU
            * AZIMUTH_STEPS as f32;
        let az0 = az_norm.floor() as usize;
        let az_frac = az_norm - az0 as f32;
        let az1 = az0 + 1;

        let el_norm = ((elevation + std::f32::consts::FRAC_PI_2) / std::f32::consts::PI)
            .clamp(0.0, 1.0)
            * (ELEVATION_STEPS - 1) as f32;
        let el0 = el_norm.floor() as usize;
        let el_frac = el_norm - el0 as f32;
        let el1 = (el0 + 1).min(ELEVATION_STEPS - 1);

        let c00 = self.cell(az0, el0);
        let c10 = self.cell(az1, el0);
        let c01 = self.cell(az0, el1);
        let c11 = self.cell(az1, el1);

        let mut out = HrtfCell {
            left: [0.0; TAP_LEN],
            right: [0.0; TAP_LEN],
            itd_samples: 0.0,
        };
        for i in 0..TAP_LEN {
            let top = c00.left[i] * (1.0 - az_frac) + c10.left[i] * az_frac;
            let bottom = c01.left[i] * (1.0 - az_frac) + c11.left[i] * az_frac;
            out.left[i] = top * (1.0 - el_frac) + bottom * el_frac;

            let top = c00.right[i] * (1.0 - az_frac) + c10.right[i] * az_frac;
            let bottom = c01.right[i] * (1.0 - az_frac) + c11.right[i] * az_frac;
            out.right[i] = top * (1.0 - el_frac) + bottom * el_frac;
        }
        let itd_top = c00.itd_samples * (1.0 - az_frac) + c10.itd_samples * az_frac;
        let itd_bottom = c01.itd_samples * (1.0 - az_frac) + c11.itd_samples * az_frac;
        out.itd_samples = itd_top * (1.0 - el_frac) + itd_bottom * el_frac;
        out
    }
}

/// Per-source HRTF panner state: previous and target cells plus the delay
/// lines used for the FIR taps and the fractional ITD.
pub struct HrtfPanner {
    dataset: std::sync::Arc<HrtfDataset>,
    previous: HrtfCell,
    target: HrtfCell,
    input_delay: DelayLine,
}

impl HrtfPanner {
    /// Creates a panner sharing `dataset` (typically the process-wide
    /// singleton from [`crate::init`]).
    pub fn new(dataset: std::sync::Arc<HrtfDataset>) -> Self {
        let initial = dataset.interpolate(0.0, 0.0);
        Self {
            dataset,
            previous: initial,
            target: initial,
            input_delay: DelayLine::new(MAX_ITD_SAMPLES as usize + TAP_LEN + 2),
        }
    }

    /// Updates the target direction for the next block. The previous
    /// direction's impulse keeps being used, crossfading towards this one
    /// across the block, rather than snapping (which would click).
    pub fn set_direction(&mut self, azimuth: f32, elevation: f32) {
        self.previous = self.target;
        self.target = self.dataset.interpolate(azimuth, elevation);
    }

    /// Processes one block, crossfading from the previous direction's
    /// impulse to the target direction's impulse across the block.
    pub fn process_block(&mut self, input: &[f32], out_l: &mut [f32], out_r: &mut [f32]) {
        let n = input.len();
        for i in 0..n {
            self.input_delay.push(input[i]);
            let t = if n > 1 { i as f32 / (n - 1) as f32 } else { 1.0 };

            let itd = self.previous.itd_samples * (1.0 - t) + self.target.itd_samples * t;
            let itd_l = (-itd).max(0.0);
            let itd_r = itd.max(0.0);

            let mut sample_l_prev = 0.0f32;
            let mut sample_l_tgt = 0.0f32;
            let mut sample_r_prev = 0.0f32;
            let mut sample_r_tgt = 0.0f32;
            for (tap, (&hl_prev, &hr_prev)) in self
                .previous
                .left
                .iter()
                .zip(self.previous.right.iter())
                .enumerate()
            {
                let delayed_l = self.input_delay.read_fractional(tap as f32 + itd_l);
                let delayed_r = self.input_delay.read_fractional(tap as f32 + itd_r);
                sample_l_prev += delayed_l * hl_prev;
                sample_r_prev += delayed_r * hr_prev;
            }
            for (tap, (&hl_tgt, &hr_tgt)) in self
                .target
                .left
                .iter()
                .zip(self.target.right.iter())
                .enumerate()
            {
                let delayed_l = self.input_delay.read_fractional(tap as f32 + itd_l);
                let delayed_r = self.input_delay.read_fractional(tap as f32 + itd_r);
                sample_l_tgt += delayed_l * hl_tgt;
                sample_r_tgt += delayed_r * hr_tgt;
            }
            out_l[i] = sample_l_prev * (1.0 - t) + sample_l_tgt * t;
            out_r[i] = sample_r_prev * (1.0 - t) + sample_r_tgt * t;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_stays_finite_across_direction_changes() {
        let dataset = std::sync::Arc::new(HrtfDataset::synthetic());
        let mut panner = HrtfPanner::new(dataset);
        let input = vec![0.5f32; 64];
        let mut l = vec![0.0; 64];
        let mut r = vec![0.0; 64];
        panner.set_direction(1.2, 0.3);
        panner.process_block(&input, &mut l, &mut r);
        panner.set_direction(-2.0, -0.1);
        panner.process_block(&input, &mut l, &mut r);
        assert!(l.iter().all(|s| s.is_finite()));
        assert!(r.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn interpolation_is_deterministic_for_same_direction() {
        let dataset = HrtfDataset::synthetic();
        let a = dataset.interpolate(0.7, 0.2);
        let b = dataset.interpolate(0.7, 0.2);
        assert_eq!(a.itd_samples, b.itd_samples);
    }
}
