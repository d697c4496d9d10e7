#![deny(unsafe_op_in_unsafe_fn)]

//! Allocation-free numeric building blocks used by `synthizer-core`.
//!
//! Nothing in this crate knows about handles, threads, or properties: it is
//! pure functions and small `Copy` state machines operating one sample or
//! one block at a time.

pub mod biquad;
pub mod delay;
pub mod gain;
pub mod pan;
pub mod smoothing;
pub mod utils;

pub use biquad::{BiquadCoeffs, BiquadState, FilterDesign};
pub use delay::{DelayLine, Tap, TapDelayBank};
pub use pan::constant_power;
pub use smoothing::OnePole;
