//! Procedural noise generators: uniform white noise, 1/f ("pink-ish") noise
//! via a cascaded leaky integrator, and full pink noise via the
//! Voss-McCartney algorithm.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::Generator;

/// Which noise coloring a [`NoiseGenerator`] produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoiseKind {
    /// Flat-spectrum white noise.
    Uniform,
    /// Approximate 1/f coloring via a single leaky integrator.
    OneOverF,
    /// Pink noise via the Voss-McCartney octave-sum algorithm.
    Pink,
}

const PINK_OCTAVES: usize = 8;

/// Procedural noise source; never allocates past construction.
pub struct NoiseGenerator {
    rng: StdRng,
    kind: NoiseKind,
    one_over_f_state: f32,
    pink_rows: [f32; PINK_OCTAVES],
    pink_counter: u32,
}

impl NoiseGenerator {
    /// Creates a generator of the given kind, seeded from OS entropy.
    pub fn new(kind: NoiseKind) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            kind,
            one_over_f_state: 0.0,
            pink_rows: [0.0; PINK_OCTAVES],
            pink_counter: 0,
        }
    }

    fn next_uniform(&mut self) -> f32 {
        self.rng.gen_range(-1.0..=1.0)
    }

    fn next_one_over_f(&mut self) -> f32 {
        let white = self.next_uniform();
        self.one_over_f_state = 0.98 * self.one_over_f_state + 0.02 * white;
        (self.one_over_f_state * 6.0).clamp(-1.0, 1.0)
    }

    fn next_pink(&mut self) -> f32 {
        self.pink_counter = self.pink_counter.wrapping_add(1);
        let trailing_zeros = self.pink_counter.trailing_zeros() as usize;
        for row in self.pink_rows.iter_mut().take(trailing_zeros.min(PINK_OCTAVES) + 1) {
            *row = self.rng.gen_range(-1.0..=1.0);
        }
        let sum: f32 = self.pink_rows.iter().sum();
        (sum / PINK_OCTAVES as f32).clamp(-1.0, 1.0)
    }
}

impl Generator for NoiseGenerator {
    fn generate_block(&mut self, out: &mut [f32]) -> bool {
        for sample in out.iter_mut() {
            *sample = match self.kind {
                NoiseKind::Uniform => self.next_uniform(),
                NoiseKind::OneOverF => self.next_one_over_f(),
                NoiseKind::Pink => self.next_pink(),
            };
        }
        false
    }
}
