//! Source graph: the shared per-tick pipeline every source runs through,
//! plus a small capability enum carrying only the data specific to each
//! source kind.
//!
//! This replaces a CRTP-style class hierarchy with `SourceBase` (shared
//! state: gain, filter, generator list) plus `SourceKind` (small enum
//! dispatched once per tick, not once per sample).

mod distance;

pub use distance::DistanceModel;

use synthizer_dsp::FilterDesign;

use crate::filter::Filter;
use crate::generator::Generator;
use crate::handle::Handle;
use crate::panner::{HrtfPanner, Panner, StereoPanner};
use crate::property::{
    PropertyEndpoint, PropertyHost, PropertyKind, PropertySlotDesc, PropertyTable, PropertyValue,
};

/// Slot index of the `gain` property in [`PROPERTY_TABLE`].
pub const SLOT_GAIN: usize = 0;
/// Slot index of the `filter` property in [`PROPERTY_TABLE`].
pub const SLOT_FILTER: usize = 1;

/// Property schema shared by every [`SourceBase`], regardless of
/// [`SourceKind`].
pub const PROPERTY_TABLE: PropertyTable = &[
    PropertySlotDesc {
        name: "gain",
        kind: PropertyKind::Double,
        default: PropertyValue::Double(1.0),
        validator: Some(|v| v.as_double().is_some_and(|g| g >= 0.0)),
    },
    PropertySlotDesc {
        name: "filter",
        kind: PropertyKind::BiquadConfig,
        default: PropertyValue::BiquadConfig(FilterDesign::Identity),
        validator: None,
    },
];

/// Per-kind data a source carries. Dispatched once per tick in
/// [`SourceBase::tick`], not per sample, since the kind rarely changes
/// within a block.
pub enum SourceKind {
    /// Plays straight through to its routes with no panning.
    Direct,
    /// 2D equal-power panning by a fixed or automated angle.
    Panned {
        /// The panning strategy (stereo angle or HRTF direction), shared with
        /// [`SourceKind::Source3D`] since both ultimately drive a [`Panner`].
        panner: Panner,
    },
    /// 3D positioned source: direction and distance are derived from a
    /// listener-relative position each tick, then fed into a [`Panner`] and
    /// a distance-based gain.
    Source3D {
        /// Source position, listener space, meters.
        position: [f64; 3],
        /// Attenuation law applied from distance.
        distance_model: DistanceModel,
        /// Reference distance (model-specific) and the max/rolloff factor.
        distance_params: distance::DistanceParams,
        panner: Panner,
    },
}

/// Shared state and per-tick pipeline common to every source.
pub struct SourceBase {
    /// Handle identifying this source to the command/property protocols.
    pub handle: Handle,
    gain: f32,
    /// Optional filter applied to the mixed generator output before panning.
    filter: Filter,
    /// Generators feeding this source, summed each tick before filtering.
    pub generators: Vec<Box<dyn Generator + Send>>,
    /// Pre-allocated per-generator scratch, sized once at construction so
    /// [`SourceBase::generate`] never allocates on the audio thread.
    generator_scratch: Vec<f32>,
    properties: PropertyHost,
    sample_rate: f64,
    kind: SourceKind,
}

impl SourceBase {
    /// Creates a source with identity filtering and unity gain. `block_size`
    /// sizes the internal generator-summing scratch buffer once, up front;
    /// `property_queue_capacity` sizes its property queue. Returns the
    /// source together with the [`PropertyEndpoint`] external callers use to
    /// `set`/`get` its properties.
    pub fn new(
        handle: Handle,
        channels: usize,
        block_size: usize,
        sample_rate: f64,
        property_queue_capacity: usize,
        kind: SourceKind,
    ) -> (Self, PropertyEndpoint) {
        let (properties, endpoint) = PropertyHost::new(PROPERTY_TABLE, property_queue_capacity);
        (
            Self {
                handle,
                gain: 1.0,
                filter: Filter::new(channels),
                generators: Vec::new(),
                generator_scratch: vec![0.0; block_size],
                properties,
                sample_rate,
                kind,
            },
            endpoint,
        )
    }

    /// Applies every property write enqueued since the last tick. Must run
    /// before [`SourceBase::generate`]/[`SourceBase::tick`] so a property set
    /// from any thread is observed within the tick it lands in.
    pub fn drain_properties(&mut self) {
        let gain = &mut self.gain;
        let filter = &mut self.filter;
        let sample_rate = self.sample_rate;
        self.properties.drain(|slot, value| match slot {
            SLOT_GAIN => {
                if let Some(g) = value.as_double() {
                    *gain = g as f32;
                }
            }
            SLOT_FILTER => {
                if let PropertyValue::BiquadConfig(design) = value {
                    filter.set_design(&design, sample_rate);
                }
            }
            _ => {}
        });
    }

    /// Sums every attached generator's output into `scratch`, which must be
    /// zeroed by the caller (the block buffer cache guarantees this on
    /// acquisition).
    pub fn generate(&mut self, scratch: &mut [f32]) {
        for generator in &mut self.generators {
            generator.drain_properties();
            generator.generate_block(&mut self.generator_scratch[..scratch.len()]);
            for (out, sample) in scratch.iter_mut().zip(self.generator_scratch.iter()) {
                *out += sample;
            }
        }
    }

    /// Runs this source's per-tick pipeline: filter the mixed generator
    /// input, apply distance/pan as the kind dictates, and write into the
    /// provided stereo bus.
    pub fn tick(&mut self, mixed_input: &mut [f32], out_l: &mut [f32], out_r: &mut [f32]) {
        if !self.filter.is_identity() {
            self.filter.process_channel(0, mixed_input);
        }
        for sample in mixed_input.iter_mut() {
            *sample *= self.gain;
        }
        match &mut self.kind {
            SourceKind::Direct => {
                out_l.copy_from_slice(mixed_input);
                out_r.copy_from_slice(mixed_input);
            }
            SourceKind::Panned { panner } => {
                panner.process_block(mixed_input, out_l, out_r);
            }
            SourceKind::Source3D {
                position,
                distance_model,
                distance_params,
                panner,
            } => {
                let distance = (position[0] * position[0]
                    + position[1] * position[1]
                    + position[2] * position[2])
                    .sqrt();
                let attenuation = distance_model.attenuation(distance, distance_params) as f32;
                for sample in mixed_input.iter_mut() {
                    *sample *= attenuation;
                }
                if let Panner::Hrtf(hrtf) = panner {
                    let azimuth = position[0].atan2(position[2]) as f32;
                    let elevation = position[1].atan2(
                        (position[0] * position[0] + position[2] * position[2]).sqrt(),
                    ) as f32;
                    hrtf.set_direction(azimuth, elevation);
                } else if let Panner::Stereo(stereo) = panner {
                    let pan = (position[0].atan2(position[2].abs().max(1e-6)) / std::f64::consts::FRAC_PI_2) as f32;
                    stereo.set_pan(pan.clamp(-1.0, 1.0));
                }
                panner.process_block(mixed_input, out_l, out_r);
            }
        }
    }
}

/// Constructs a [`Panner`] appropriate for 3D sources: HRTF when `use_hrtf`
/// is set, equal-power stereo otherwise.
pub fn make_panner(use_hrtf: bool, hrtf_dataset: Option<std::sync::Arc<crate::panner::HrtfDataset>>) -> Panner {
    if use_hrtf {
        Panner::Hrtf(HrtfPanner::new(
            hrtf_dataset.expect("hrtf dataset must be initialized before creating an HRTF panner"),
        ))
    } else {
        Panner::Stereo(StereoPanner::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_source_passes_through_unpanned() {
        let handle = Handle::allocate();
        let (mut source, _endpoint) =
            SourceBase::new(handle, 1, 4, 44_100.0, 16, SourceKind::Direct);
        let mut input = vec![0.5; 4];
        let mut l = vec![0.0; 4];
        let mut r = vec![0.0; 4];
        source.tick(&mut input, &mut l, &mut r);
        assert_eq!(l, vec![0.5; 4]);
        assert_eq!(r, vec![0.5; 4]);
    }

    #[test]
    fn gain_scales_output_for_every_kind() {
        let handle = Handle::allocate();
        let (mut source, endpoint) = SourceBase::new(handle, 1, 2, 44_100.0, 16, SourceKind::Direct);
        endpoint
            .sender
            .send(SLOT_GAIN, PropertyValue::Double(0.5));
        source.drain_properties();
        let mut input = vec![1.0; 2];
        let mut l = vec![0.0; 2];
        let mut r = vec![0.0; 2];
        source.tick(&mut input, &mut l, &mut r);
        assert_eq!(l, vec![0.5; 2]);
    }

    #[test]
    fn property_set_is_visible_through_the_shadow_after_a_drain() {
        let handle = Handle::allocate();
        let (mut source, endpoint) = SourceBase::new(handle, 1, 2, 44_100.0, 16, SourceKind::Direct);
        endpoint
            .sender
            .send(SLOT_GAIN, PropertyValue::Double(0.25));
        source.drain_properties();
        assert_eq!(
            endpoint.shadow.get(SLOT_GAIN),
            Some(PropertyValue::Double(0.25))
        );
    }
}
