//! Feedback delay network reverb: prime-length delay lines mixed through a
//! Householder reflection, with per-line damping.

use synthizer_dsp::utils::primes_at_least;
use synthizer_dsp::DelayLine;

use super::Effect;
use crate::property::{
    PropertyEndpoint, PropertyHost, PropertyKind, PropertySlotDesc, PropertyTable, PropertyValue,
};

const LINE_COUNT: usize = 8;

const SLOT_FEEDBACK: usize = 0;
const SLOT_WET_MIX: usize = 1;
const SLOT_DAMPING: usize = 2;

/// Property schema for [`FdnReverb`], mirroring its direct setters'
/// existing clamp ranges.
pub const PROPERTY_TABLE: PropertyTable = &[
    PropertySlotDesc {
        name: "feedback",
        kind: PropertyKind::Double,
        default: PropertyValue::Double(0.85),
        validator: None,
    },
    PropertySlotDesc {
        name: "wet_mix",
        kind: PropertyKind::Double,
        default: PropertyValue::Double(0.3),
        validator: None,
    },
    PropertySlotDesc {
        name: "damping",
        kind: PropertyKind::Double,
        default: PropertyValue::Double(0.2),
        validator: None,
    },
];

/// A feedback delay network reverb effect.
pub struct FdnReverb {
    lines: Vec<DelayLine>,
    damping: Vec<f32>,
    damping_state: Vec<f32>,
    feedback: f32,
    wet_mix: f32,
    // Reused every sample so `process_sample` never touches the allocator.
    taps_scratch: Vec<f32>,
    mixed_scratch: Vec<f32>,
    properties: PropertyHost,
    endpoint: PropertyEndpoint,
}

impl FdnReverb {
    /// Creates a reverb sized for `sample_rate`, with line lengths chosen as
    /// the nearest prime at or above a spread of base delay times so the
    /// network avoids short periodic artifacts.
    pub fn new(sample_rate: f32, property_queue_capacity: usize) -> Self {
        let base_ms = [29.0, 37.0, 43.0, 53.0, 61.0, 71.0, 79.0, 89.0];
        let lower_bounds: Vec<usize> = base_ms
            .iter()
            .map(|ms| (sample_rate * ms / 1000.0) as usize)
            .collect();
        let limit = lower_bounds.iter().copied().max().unwrap_or(1).saturating_mul(2).max(64);
        let lengths = primes_at_least(&lower_bounds, limit);
        let (properties, endpoint) = PropertyHost::new(PROPERTY_TABLE, property_queue_capacity);
        Self {
            lines: lengths.iter().map(|&len| DelayLine::new(len)).collect(),
            damping: vec![0.2; LINE_COUNT],
            damping_state: vec![0.0; LINE_COUNT],
            feedback: 0.85,
            wet_mix: 0.3,
            taps_scratch: vec![0.0; LINE_COUNT],
            mixed_scratch: vec![0.0; LINE_COUNT],
            properties,
            endpoint,
        }
    }

    /// Sets the overall feedback coefficient (clamped for stability).
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 0.98);
    }

    /// Sets the dry/wet mix, `0.0` fully dry, `1.0` fully wet.
    pub fn set_wet_mix(&mut self, mix: f32) {
        self.wet_mix = mix.clamp(0.0, 1.0);
    }

    /// Sets per-line high-frequency damping, `0.0` none, `1.0` maximal.
    pub fn set_damping(&mut self, damping: f32) {
        self.damping.iter_mut().for_each(|d| *d = damping.clamp(0.0, 1.0));
    }

    /// Reflects `self.taps_scratch` through `I - 2uuᵀ/uᵀu` (`u` the
    /// all-ones vector) into `self.mixed_scratch`, in place and without
    /// allocating.
    fn householder_mix(&mut self) {
        let n = self.taps_scratch.len() as f32;
        let sum: f32 = self.taps_scratch.iter().sum();
        let factor = 2.0 * sum / n;
        for (mixed, &tap) in self.mixed_scratch.iter_mut().zip(self.taps_scratch.iter()) {
            *mixed = tap - factor;
        }
    }

    fn process_sample(&mut self, input: f32) -> f32 {
        for (tap, line) in self.taps_scratch.iter_mut().zip(self.lines.iter()) {
            *tap = line.read(0);
        }
        self.householder_mix();
        let mut output = 0.0;
        for (i, line) in self.lines.iter_mut().enumerate() {
            let damped = self.damping_state[i]
                + (self.mixed_scratch[i] - self.damping_state[i]) * (1.0 - self.damping[i]);
            self.damping_state[i] = damped;
            line.push(input + damped * self.feedback);
            output += self.taps_scratch[i];
        }
        output / self.lines.len() as f32
    }
}

impl Effect for FdnReverb {
    fn process_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        for i in 0..left.len() {
            let input = (left[i] + right[i]) * 0.5;
            let wet = self.process_sample(input);
            left[i] = left[i] * (1.0 - self.wet_mix) + wet * self.wet_mix;
            right[i] = right[i] * (1.0 - self.wet_mix) + wet * self.wet_mix;
        }
    }

    fn drain_properties(&mut self) {
        let feedback = &mut self.feedback;
        let wet_mix = &mut self.wet_mix;
        let damping = &mut self.damping;
        self.properties.drain(|slot, value| {
            let v = match value.as_double() {
                Some(v) => v as f32,
                None => return,
            };
            match slot {
                SLOT_FEEDBACK => *feedback = v.clamp(0.0, 0.98),
                SLOT_WET_MIX => *wet_mix = v.clamp(0.0, 1.0),
                SLOT_DAMPING => damping.iter_mut().for_each(|d| *d = v.clamp(0.0, 1.0)),
                _ => {}
            }
        });
    }

    fn property_endpoint(&self) -> Option<PropertyEndpoint> {
        Some(self.endpoint.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impulse_response_stays_finite_and_decays() {
        let mut reverb = FdnReverb::new(44_100.0, 16);
        let mut left = vec![0.0; 8192];
        let mut right = vec![0.0; 8192];
        left[0] = 1.0;
        right[0] = 1.0;
        reverb.process_block(&mut left, &mut right);
        assert!(left.iter().all(|s| s.is_finite()));
        let early_energy: f32 = left[..100].iter().map(|s| s * s).sum();
        let late_energy: f32 = left[4000..4100].iter().map(|s| s * s).sum();
        assert!(late_energy <= early_energy + 1e-3);
    }

    #[test]
    fn zero_wet_mix_passes_dry_signal_through() {
        let mut reverb = FdnReverb::new(44_100.0, 16);
        reverb.set_wet_mix(0.0);
        let mut left = vec![0.3, -0.2, 0.1];
        let mut right = vec![0.3, -0.2, 0.1];
        let before = left.clone();
        reverb.process_block(&mut left, &mut right);
        assert_eq!(left, before);
    }

    #[test]
    fn feedback_property_write_is_drained_and_clamped() {
        let mut reverb = FdnReverb::new(44_100.0, 16);
        let endpoint = reverb.property_endpoint().unwrap();
        endpoint.sender.send(SLOT_FEEDBACK, PropertyValue::Double(5.0));
        reverb.drain_properties();
        assert_eq!(reverb.feedback, 0.98);
        assert_eq!(
            endpoint.shadow.get(SLOT_FEEDBACK),
            Some(PropertyValue::Double(5.0))
        );
    }
}
