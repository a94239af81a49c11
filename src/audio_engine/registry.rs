//! Scheduler-side bookkeeping shared by the engine backends.
//!
//! [`HandleRegistry`] owns the decoded clips, hands out channel and group ids, tracks which
//! channels are still alive, and queues the [`ControlMessage`]s a backend delivers to its mixer on
//! the next update.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use log::debug;

use crate::audio_engine::constants::{MAX_GROUPS, VOLUME_MAX, VOLUME_MIN};
use crate::audio_engine::errors::BackendError;
use crate::audio_engine::sample_loader::decode_audio_file_to_sample_buffer;
use crate::audio_engine::{ChannelHandle, ClipHandle, GroupHandle};
use crate::messages::{ControlMessage, SampleBuffer};

pub struct HandleRegistry {
    sample_rate: u32,
    channels: usize,
    clips: HashMap<u64, SampleBuffer>,
    next_clip_id: u64,
    live_channels: HashSet<u64>,
    next_channel_id: u64,
    groups: Vec<String>,
    pending: Vec<ControlMessage>,
}

impl HandleRegistry {
    pub fn new(sample_rate: u32, channels: usize) -> Self {
        Self {
            sample_rate,
            channels,
            clips: HashMap::new(),
            next_clip_id: 1,
            live_channels: HashSet::new(),
            next_channel_id: 1,
            groups: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Decodes `path` to the engine layout and registers it.
    pub fn load_clip(&mut self, path: &Path) -> Result<ClipHandle, BackendError> {
        let sample = decode_audio_file_to_sample_buffer(path, self.channels, self.sample_rate)?;
        Ok(self.insert_clip(sample))
    }

    /// Registers already decoded sample data as a clip.
    pub fn insert_clip(&mut self, sample: SampleBuffer) -> ClipHandle {
        let id = self.next_clip_id;
        self.next_clip_id += 1;
        self.clips.insert(id, sample);
        ClipHandle::new(id)
    }

    pub fn clip_length_ms(&self, clip: &ClipHandle) -> Option<u64> {
        let sample = self.clips.get(&clip.id())?;
        if self.sample_rate == 0 {
            return None;
        }
        Some(sample.frames() as u64 * 1000 / u64::from(self.sample_rate))
    }

    pub fn release_clip(&mut self, clip: ClipHandle) {
        self.clips.remove(&clip.id());
    }

    pub fn loaded_clips(&self) -> usize {
        self.clips.len()
    }

    pub fn create_group(&mut self, name: &str) -> Result<GroupHandle, BackendError> {
        if self.groups.len() == MAX_GROUPS {
            return Err(BackendError::GroupLimit(MAX_GROUPS));
        }
        let index = self.groups.len();
        debug!("Created channel group {name} ({index})");
        self.groups.push(name.to_string());
        Ok(GroupHandle::new(index))
    }

    pub fn set_group_volume(
        &mut self,
        group: &GroupHandle,
        volume: f32,
    ) -> Result<(), BackendError> {
        self.ensure_group(group)?;
        let volume = if volume.is_finite() {
            volume.clamp(VOLUME_MIN, VOLUME_MAX)
        } else {
            VOLUME_MAX
        };
        debug!("Channel group {} volume {volume}", self.groups[group.index()]);
        self.pending.push(ControlMessage::SetGroupVolume {
            group: group.index(),
            volume,
        });
        Ok(())
    }

    pub fn play(
        &mut self,
        clip: &ClipHandle,
        group: &GroupHandle,
    ) -> Result<ChannelHandle, BackendError> {
        self.ensure_group(group)?;
        let sample = self
            .clips
            .get(&clip.id())
            .cloned()
            .ok_or(BackendError::UnknownClip(clip.id()))?;

        let channel = self.next_channel_id;
        self.next_channel_id += 1;
        self.live_channels.insert(channel);
        self.pending.push(ControlMessage::Play {
            channel,
            group: group.index(),
            sample,
        });
        Ok(ChannelHandle::new(channel))
    }

    pub fn set_loop(
        &mut self,
        channel: &ChannelHandle,
        iterations: u32,
        start_ms: u32,
        end_ms: u32,
    ) -> Result<(), BackendError> {
        self.ensure_live(channel)?;
        self.pending.push(ControlMessage::SetLoop {
            channel: channel.id(),
            iterations,
            start_frame: self.ms_to_frames(start_ms),
            end_frame: self.ms_to_frames(end_ms),
        });
        Ok(())
    }

    pub fn add_fade_point(
        &mut self,
        channel: &ChannelHandle,
        clock: u64,
        volume: f32,
    ) -> Result<(), BackendError> {
        self.ensure_live(channel)?;
        self.pending.push(ControlMessage::AddFadePoint {
            channel: channel.id(),
            clock,
            volume,
        });
        Ok(())
    }

    pub fn stop(&mut self, channel: ChannelHandle) {
        if self.live_channels.remove(&channel.id()) {
            self.pending.push(ControlMessage::Stop {
                channel: channel.id(),
            });
        }
    }

    /// Marks a channel the mixer reported as finished or dropped.
    pub fn channel_ended(&mut self, channel: u64) {
        self.live_channels.remove(&channel);
    }

    pub fn is_live(&self, channel: &ChannelHandle) -> bool {
        self.live_channels.contains(&channel.id())
    }

    pub fn ensure_live(&self, channel: &ChannelHandle) -> Result<(), BackendError> {
        if self.is_live(channel) {
            Ok(())
        } else {
            Err(BackendError::UnknownChannel(channel.id()))
        }
    }

    fn ensure_group(&self, group: &GroupHandle) -> Result<(), BackendError> {
        if group.index() < self.groups.len() {
            Ok(())
        } else {
            Err(BackendError::UnknownGroup(group.index()))
        }
    }

    /// Takes every command queued since the last call, oldest first.
    pub fn take_pending(&mut self) -> Vec<ControlMessage> {
        std::mem::take(&mut self.pending)
    }

    /// Puts undelivered commands back in front of anything queued meanwhile.
    pub fn requeue(&mut self, mut undelivered: Vec<ControlMessage>) {
        undelivered.append(&mut self.pending);
        self.pending = undelivered;
    }

    fn ms_to_frames(&self, ms: u32) -> usize {
        (u64::from(ms) * u64::from(self.sample_rate) / 1000) as usize
    }
}
