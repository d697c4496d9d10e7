//! Round-trip/idempotence properties that are naturally property-based
//! rather than example-based: the identity biquad is a true no-op for any
//! input, HRTF output stays finite for any direction, and a single property
//! write survives a send/drain round trip unchanged.

use proptest::prelude::*;

use synthizer_core::panner::{HrtfDataset, HrtfPanner};
use synthizer_core::property::{PropertyQueue, PropertyValue};
use synthizer_dsp::{BiquadCoeffs, BiquadState};

proptest! {
    #[test]
    fn identity_biquad_bypasses_any_finite_input(inputs in prop::collection::vec(-1e6f32..1e6f32, 1..64)) {
        let coeffs = BiquadCoeffs::IDENTITY;
        let mut state = BiquadState::new();
        for input in inputs {
            prop_assert_eq!(state.process(&coeffs, input), input);
        }
    }

    #[test]
    fn hrtf_output_stays_finite_for_any_direction(
        azimuth in -100.0f32..100.0,
        elevation in -10.0f32..10.0,
        samples in prop::collection::vec(-1.0f32..1.0, 1..64),
    ) {
        let dataset = std::sync::Arc::new(HrtfDataset::synthetic());
        let mut panner = HrtfPanner::new(dataset);
        panner.set_direction(azimuth, elevation);
        let mut out_l = vec![0.0f32; samples.len()];
        let mut out_r = vec![0.0f32; samples.len()];
        panner.process_block(&samples, &mut out_l, &mut out_r);
        prop_assert!(out_l.iter().all(|s| s.is_finite()));
        prop_assert!(out_r.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn a_single_property_write_survives_send_and_drain_unchanged(value in -1e12f64..1e12) {
        let (tx, mut rx) = PropertyQueue::new(4);
        prop_assert!(tx.send(0, PropertyValue::Double(value)));
        let mut seen = None;
        rx.drain(|write| seen = Some(write.value));
        prop_assert_eq!(seen, Some(PropertyValue::Double(value)));
    }
}
