//! Manually clocked engine backend.
//!
//! [`OfflineBackend`] runs the same [`RtMixer`] as the real-time backend, but synchronously: the
//! playback clock only moves when the caller renders. Useful for headless rendering and for
//! driving the scheduler deterministically.

use std::path::Path;

use log::warn;

use crate::audio_engine::errors::BackendError;
use crate::audio_engine::mixer::RtMixer;
use crate::audio_engine::registry::HandleRegistry;
use crate::audio_engine::{AudioBackend, ChannelHandle, ClipHandle, GroupHandle};
use crate::messages::{AudioMessage, SampleBuffer};

pub struct OfflineBackend {
    registry: HandleRegistry,
    mixer: RtMixer,
    scratch: Vec<f32>,
}

impl OfflineBackend {
    pub fn new(sample_rate: u32, channels: usize) -> Self {
        Self {
            registry: HandleRegistry::new(sample_rate, channels),
            mixer: RtMixer::new(channels),
            scratch: Vec::new(),
        }
    }

    /// Registers decoded sample data without going through the file system.
    pub fn insert_clip(&mut self, sample: SampleBuffer) -> ClipHandle {
        self.registry.insert_clip(sample)
    }

    pub fn channels(&self) -> usize {
        self.registry.channels()
    }

    pub fn clock(&self) -> u64 {
        self.mixer.clock()
    }

    pub fn active_voices(&self) -> usize {
        self.mixer.active_voices()
    }

    /// Mixes `output.len() / channels` frames and advances the clock by that amount.
    pub fn render(&mut self, output: &mut [f32]) {
        let registry = &mut self.registry;
        self.mixer.render(output, |event| {
            if let AudioMessage::ChannelEnded { channel } = event {
                registry.channel_ended(channel);
            }
        });
    }

    /// Renders and discards `frames` frames.
    pub fn advance(&mut self, frames: usize) {
        let mut scratch = std::mem::take(&mut self.scratch);
        scratch.resize(frames * self.registry.channels(), 0.0);
        self.render(&mut scratch);
        self.scratch = scratch;
    }
}

impl AudioBackend for OfflineBackend {
    fn sample_rate(&self) -> u32 {
        self.registry.sample_rate()
    }

    fn create_streaming_clip(&mut self, path: &Path) -> Result<ClipHandle, BackendError> {
        self.registry.load_clip(path)
    }

    fn clip_length_ms(&self, clip: &ClipHandle) -> Option<u64> {
        self.registry.clip_length_ms(clip)
    }

    fn release_clip(&mut self, clip: ClipHandle) {
        self.registry.release_clip(clip);
    }

    fn create_channel_group(&mut self, name: &str) -> Result<GroupHandle, BackendError> {
        self.registry.create_group(name)
    }

    fn set_group_volume(&mut self, group: &GroupHandle, volume: f32) -> Result<(), BackendError> {
        self.registry.set_group_volume(group, volume)
    }

    fn play(
        &mut self,
        clip: &ClipHandle,
        group: &GroupHandle,
    ) -> Result<ChannelHandle, BackendError> {
        self.registry.play(clip, group)
    }

    fn set_loop(
        &mut self,
        channel: &ChannelHandle,
        iterations: u32,
        start_ms: u32,
        end_ms: u32,
    ) -> Result<(), BackendError> {
        self.registry.set_loop(channel, iterations, start_ms, end_ms)
    }

    fn playback_clock(&self, channel: &ChannelHandle) -> Result<u64, BackendError> {
        self.registry.ensure_live(channel)?;
        Ok(self.mixer.clock())
    }

    fn add_fade_point(
        &mut self,
        channel: &ChannelHandle,
        clock: u64,
        volume: f32,
    ) -> Result<(), BackendError> {
        self.registry.add_fade_point(channel, clock, volume)
    }

    fn stop(&mut self, channel: ChannelHandle) {
        self.registry.stop(channel);
    }

    fn update(&mut self) -> Result<(), BackendError> {
        for message in self.registry.take_pending() {
            if let Some(AudioMessage::VoiceDropped { channel }) = self.mixer.handle(message) {
                warn!("No free voice for channel {channel}, dropped");
                self.registry.channel_ended(channel);
            }
        }
        Ok(())
    }
}
