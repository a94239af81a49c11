//! Voice management for real-time audio mixing.
//!
//! This module provides the [`VoiceSlot`] struct which represents one playback channel of the
//! engine: a shared sample buffer, a loop window with a pass count, and a fade envelope.
//!
//! Voices are owned by the [`RtMixer`](crate::audio_engine::mixer::RtMixer) and addressed by the
//! channel id the backend handed out when the play request was issued.

use crate::audio_engine::fade::FadeEnvelope;
use crate::messages::SampleBuffer;

/// Outcome of advancing a voice by one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Playing,
    Finished,
}

pub struct VoiceSlot {
    pub active: bool,
    pub channel: u64,
    pub group: usize,
    pub sample: Option<SampleBuffer>,
    pub frame_pos: usize,
    loop_start: usize,
    loop_end: usize,
    passes_remaining: u32,
    pub envelope: FadeEnvelope,
}

impl VoiceSlot {
    pub fn new() -> Self {
        Self {
            active: false,
            channel: 0,
            group: 0,
            sample: None,
            frame_pos: 0,
            loop_start: 0,
            loop_end: 0,
            passes_remaining: 0,
            envelope: FadeEnvelope::default(),
        }
    }

    /// Starts the voice on a new channel, playing the whole sample once.
    pub fn start(&mut self, channel: u64, group: usize, sample: SampleBuffer) {
        let frames = sample.frames();
        self.active = true;
        self.channel = channel;
        self.group = group;
        self.sample = Some(sample);
        self.frame_pos = 0;
        self.loop_start = 0;
        self.loop_end = frames;
        self.passes_remaining = 1;
        self.envelope.clear();
    }

    pub fn stop(&mut self) {
        self.active = false;
        self.sample = None;
        self.frame_pos = 0;
        self.loop_start = 0;
        self.loop_end = 0;
        self.passes_remaining = 0;
        self.envelope.clear();
    }

    /// Restricts playback to `[start_frame, end_frame)` repeated `iterations` times.
    ///
    /// The window is clamped to the sample length; an empty window or zero passes is ignored.
    pub fn set_loop(&mut self, iterations: u32, start_frame: usize, end_frame: usize) {
        let Some(sample) = self.sample.as_ref() else {
            return;
        };
        let frames = sample.frames();
        let end = end_frame.min(frames);
        if iterations == 0 || start_frame >= end {
            return;
        }

        self.loop_start = start_frame;
        self.loop_end = end;
        self.passes_remaining = iterations;
        if !(self.loop_start..self.loop_end).contains(&self.frame_pos) {
            self.frame_pos = self.loop_start;
        }
    }

    pub fn is_playing_channel(&self, channel: u64) -> bool {
        self.active && self.channel == channel
    }

    /// Moves the play head one frame forward, wrapping inside the loop window.
    pub fn advance(&mut self) -> Advance {
        self.frame_pos += 1;
        if self.frame_pos < self.loop_end {
            return Advance::Playing;
        }

        self.passes_remaining = self.passes_remaining.saturating_sub(1);
        if self.passes_remaining == 0 {
            return Advance::Finished;
        }
        self.frame_pos = self.loop_start;
        Advance::Playing
    }
}
