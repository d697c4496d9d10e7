//! Panner bank: turns a mono or stereo source signal into a spatialized
//! stereo output, either via simple equal-power panning or HRTF
//! spatialization.

mod hrtf;
mod stereo;

pub use hrtf::{HrtfDataset, HrtfPanner};
pub use stereo::StereoPanner;

/// Which panning strategy a source is configured to use.
pub enum Panner {
    /// Equal-power stereo panning by angle.
    Stereo(StereoPanner),
    /// HRTF-based 3D spatialization by azimuth/elevation.
    Hrtf(HrtfPanner),
}

impl Panner {
    /// Processes one block of mono input into a stereo `(left, right)` bus.
    pub fn process_block(&mut self, input: &[f32], out_l: &mut [f32], out_r: &mut [f32]) {
        match self {
            Panner::Stereo(panner) => panner.process_block(input, out_l, out_r),
            Panner::Hrtf(panner) => panner.process_block(input, out_l, out_r),
        }
    }
}
