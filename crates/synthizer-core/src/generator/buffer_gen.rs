//! Plays back a decoded [`crate::buffer::Buffer`], with looping and
//! fractional-pitch playback via linear interpolation.

use super::Generator;
use crate::buffer::Buffer;
use crate::property::{
    PropertyEndpoint, PropertyHost, PropertyKind, PropertySlotDesc, PropertyTable, PropertyValue,
};

/// Generators aren't addressable by [`crate::handle::Handle`] through
/// [`crate::context::Context`] (unlike sources/effects); their property
/// queue is sized for direct external access via
/// [`BufferGenerator::property_endpoint`] rather than the many-threads-one-
/// object contention a source or effect's queue is sized for.
const PROPERTY_QUEUE_CAPACITY: usize = 16;

const SLOT_PLAYBACK_POSITION: usize = 0;
const SLOT_PITCH: usize = 1;
const SLOT_LOOPING: usize = 2;

/// Property schema for [`BufferGenerator`]. `playback_position` is
/// read/write: an external `set` seeks, while the audio thread publishes its
/// own advance to the same slot's shadow every block so a `get` always
/// reflects where playback actually is.
pub const PROPERTY_TABLE: PropertyTable = &[
    PropertySlotDesc {
        name: "playback_position",
        kind: PropertyKind::Double,
        default: PropertyValue::Double(0.0),
        validator: Some(|v| v.as_double().is_some_and(|p| p >= 0.0)),
    },
    PropertySlotDesc {
        name: "pitch",
        kind: PropertyKind::Double,
        default: PropertyValue::Double(1.0),
        validator: Some(|v| v.as_double().is_some_and(|p| p >= 0.0)),
    },
    PropertySlotDesc {
        name: "looping",
        kind: PropertyKind::Bool,
        default: PropertyValue::Bool(false),
        validator: None,
    },
];

/// Plays a [`Buffer`]'s first channel at an arbitrary playback rate.
pub struct BufferGenerator {
    buffer: Buffer,
    position: f64,
    pitch: f64,
    looping: bool,
    properties: PropertyHost,
    endpoint: PropertyEndpoint,
}

impl BufferGenerator {
    /// Creates a generator starting at the beginning of `buffer`.
    pub fn new(buffer: Buffer) -> Self {
        let (properties, endpoint) = PropertyHost::new(PROPERTY_TABLE, PROPERTY_QUEUE_CAPACITY);
        Self {
            buffer,
            position: 0.0,
            pitch: 1.0,
            looping: false,
            properties,
            endpoint,
        }
    }

    /// Sets the playback rate multiplier (1.0 = native speed).
    pub fn set_pitch(&mut self, pitch: f64) {
        self.pitch = pitch.max(0.0);
    }

    /// Sets whether playback wraps to the start at end-of-buffer.
    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// A handle external threads can use to `set`/`get` this generator's
    /// properties (`playback_position`, `pitch`, `looping`) without going
    /// through [`crate::context::Context`].
    pub fn property_endpoint(&self) -> PropertyEndpoint {
        self.endpoint.clone()
    }

    fn sample_at(&self, position: f64) -> f32 {
        let channel = self.buffer.channel(0);
        let len = channel.len();
        if len == 0 {
            return 0.0;
        }
        let base = position.floor() as usize;
        let frac = (position - position.floor()) as f32;
        let a = channel[base.min(len - 1)];
        let b = channel[(base + 1).min(len - 1)];
        a + (b - a) * frac
    }
}

impl Generator for BufferGenerator {
    fn drain_properties(&mut self) {
        let position = &mut self.position;
        let pitch = &mut self.pitch;
        let looping = &mut self.looping;
        self.properties.drain(|slot, value| match slot {
            SLOT_PLAYBACK_POSITION => {
                if let Some(p) = value.as_double() {
                    *position = p;
                }
            }
            SLOT_PITCH => {
                if let Some(p) = value.as_double() {
                    *pitch = p.max(0.0);
                }
            }
            SLOT_LOOPING => {
                if let PropertyValue::Bool(b) = value {
                    *looping = b;
                }
            }
            _ => {}
        });
    }

    fn generate_block(&mut self, out: &mut [f32]) -> bool {
        let len = self.buffer.frame_count() as f64;
        if len == 0.0 {
            out.iter_mut().for_each(|s| *s = 0.0);
            return true;
        }
        let mut ended = false;
        for sample in out.iter_mut() {
            if self.position >= len {
                if self.looping {
                    self.position %= len;
                } else {
                    ended = true;
                    *sample = 0.0;
                    continue;
                }
            }
            *sample = self.sample_at(self.position);
            self.position += self.pitch;
        }
        self.properties
            .publish(SLOT_PLAYBACK_POSITION, PropertyValue::Double(self.position));
        ended
    }
}
