//! Audio Engine Module
//!
//! This module provides the playback engine the ambient scheduler drives. It is organized into
//! sub-modules, each with a specific responsibility:
//!
//! - [`audio_stream`]: CPAL audio stream management and the real-time backend
//! - [`offline`]: a manually clocked backend rendering into caller-owned buffers
//! - [`registry`]: clip, channel and group bookkeeping shared by both backends
//! - [`constants`]: Configuration constants and limits
//! - [`errors`]: Audio-specific error types
//! - [`voice`]: Voice state (loop window, pass count, envelope)
//! - [`fade`]: Clock-keyed volume envelopes
//! - [`mixer`]: Real-time mixing engine
//! - [`sample_loader`]: Audio file loading and decoding
//!
//! The [`AudioBackend`] trait is the seam between the scheduler and an engine. Handles returned
//! by a backend are move-only: stopping a channel or releasing a clip consumes its handle, so a
//! stale handle cannot be used after release.

use std::path::Path;

pub mod audio_stream;
pub mod constants;
pub mod errors;
pub mod fade;
pub mod mixer;
pub mod offline;
pub mod registry;
pub mod sample_loader;
pub mod voice;

pub use audio_stream::{CpalBackend, setup_logger};
pub use errors::{BackendError, SampleLoadError};
pub use offline::OfflineBackend;

/// Handle to a loaded clip owned by an engine.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ClipHandle(u64);

impl ClipHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Handle to a playing channel.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ChannelHandle(u64);

impl ChannelHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Handle to a channel group (mixing bus).
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct GroupHandle(usize);

impl GroupHandle {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

/// Capabilities the ambient scheduler needs from an audio engine.
///
/// Commands are non-blocking. Implementations may buffer them until [`AudioBackend::update`],
/// which must deliver everything issued since the previous update in order.
pub trait AudioBackend {
    /// Mixer rate in Hz; one playback-clock tick is one frame at this rate.
    fn sample_rate(&self) -> u32;

    /// Loads the file at `path` and returns a handle to it.
    fn create_streaming_clip(&mut self, path: &Path) -> Result<ClipHandle, BackendError>;

    /// Length of a loaded clip in milliseconds.
    fn clip_length_ms(&self, clip: &ClipHandle) -> Option<u64>;

    /// Frees a clip. Channels already playing it keep their data until they stop.
    fn release_clip(&mut self, clip: ClipHandle);

    fn create_channel_group(&mut self, name: &str) -> Result<GroupHandle, BackendError>;

    fn set_group_volume(&mut self, group: &GroupHandle, volume: f32) -> Result<(), BackendError>;

    /// Starts `clip` on a new channel attached to `group`.
    fn play(
        &mut self,
        clip: &ClipHandle,
        group: &GroupHandle,
    ) -> Result<ChannelHandle, BackendError>;

    /// Loops the window `[start_ms, end_ms]` of the channel's clip `iterations` times.
    fn set_loop(
        &mut self,
        channel: &ChannelHandle,
        iterations: u32,
        start_ms: u32,
        end_ms: u32,
    ) -> Result<(), BackendError>;

    /// Current playback-clock value seen by `channel`.
    fn playback_clock(&self, channel: &ChannelHandle) -> Result<u64, BackendError>;

    /// Adds a volume breakpoint at an absolute playback-clock tick.
    fn add_fade_point(
        &mut self,
        channel: &ChannelHandle,
        clock: u64,
        volume: f32,
    ) -> Result<(), BackendError>;

    /// Stops a channel. Unknown or already finished channels are ignored.
    fn stop(&mut self, channel: ChannelHandle);

    /// Advances the engine's own housekeeping step.
    fn update(&mut self) -> Result<(), BackendError>;
}
