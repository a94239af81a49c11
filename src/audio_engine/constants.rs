//! Audio engine configuration constants and limits.

/// Maximum number of voices that can be active simultaneously.
pub const MAX_VOICES: usize = 32;

/// Maximum number of channel groups an engine can create.
pub const MAX_GROUPS: usize = 8;

/// Maximum number of fade breakpoints stored per voice.
pub const MAX_FADE_POINTS: usize = 8;

/// Capacity of each command/event ring buffer.
pub const RING_CAPACITY: usize = 1024;

/// Render quantum requested from the output device, in frames.
pub const DSP_BLOCK_FRAMES: u32 = 512;

/// Chunk size handed to the resampler when converting clip sample rates.
pub const RESAMPLE_CHUNK_FRAMES: usize = 1024;

/// Minimum volume level (silence).
pub const VOLUME_MIN: f32 = 0.0;

/// Maximum volume level (100%).
pub const VOLUME_MAX: f32 = 1.0;
