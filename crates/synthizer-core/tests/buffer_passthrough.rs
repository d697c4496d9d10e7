//! Scenario 1: decode a pure tone into a Buffer, play it through a Direct
//! source, and check the output's RMS and zero-crossing rate match a sine.

use synthizer_core::buffer::Buffer;
use synthizer_core::generator::BufferGenerator;
use synthizer_core::handle::Handle;
use synthizer_core::source::{SourceBase, SourceKind};

const SAMPLE_RATE: f64 = 44_100.0;

fn sine_channel(frequency: f64, frames: usize) -> Vec<f32> {
    (0..frames)
        .map(|i| (2.0 * std::f64::consts::PI * frequency * i as f64 / SAMPLE_RATE).sin() as f32)
        .collect()
}

#[test]
fn direct_source_passthrough_matches_expected_rms_and_zero_crossings() {
    let frames = SAMPLE_RATE as usize;
    let buffer = Buffer::from_channels(vec![sine_channel(440.0, frames)], 44_100);

    let handle = Handle::allocate();
    let (mut source, _endpoint) =
        SourceBase::new(handle, 1, frames, SAMPLE_RATE, 16, SourceKind::Direct);
    source.generators.push(Box::new(BufferGenerator::new(buffer)));

    let mut generator_bus = vec![0.0f32; frames];
    source.generate(&mut generator_bus);

    let mut out_l = vec![0.0f32; frames];
    let mut out_r = vec![0.0f32; frames];
    source.tick(&mut generator_bus, &mut out_l, &mut out_r);

    let rms = (out_l.iter().map(|s| s * s).sum::<f32>() / frames as f32).sqrt();
    assert!((rms - 0.707).abs() < 0.01, "rms was {rms}");

    let zero_crossings = out_l
        .windows(2)
        .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
        .count();
    assert!(
        (zero_crossings as i64 - 880).abs() <= 2,
        "zero crossings was {zero_crossings}"
    );
}
