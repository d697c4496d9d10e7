//! Process/context-wide configuration. A plain, `Copy` struct: no file
//! parsing, no serde. Config-file loading is a host concern, out of scope
//! here.

/// Tunable sizes for a [`crate::Context`]. All fields have sensible defaults;
/// construct with `..Default::default()` to override a handful.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineConfig {
    /// Samples processed per audio-thread tick.
    pub block_size: usize,
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Capacity of the command queue (structural changes per tick budget).
    pub command_queue_capacity: usize,
    /// Capacity of each object's property queue.
    pub property_queue_capacity: usize,
    /// Number of scratch buses kept pre-allocated in the block buffer cache.
    pub scratch_reserve: usize,
    /// Maximum simultaneous HRTF-panned voices.
    pub hrtf_voice_limit: usize,
    /// Capacity of the event delivery queue.
    pub event_queue_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            block_size: 256,
            sample_rate: 44_100,
            command_queue_capacity: 1024,
            property_queue_capacity: 64,
            scratch_reserve: 16,
            hrtf_voice_limit: 64,
            event_queue_capacity: 1024,
        }
    }
}

impl EngineConfig {
    /// Seconds represented by one block at this configuration's sample rate.
    pub fn block_duration_secs(&self) -> f64 {
        self.block_size as f64 / self.sample_rate as f64
    }
}
