//! Real-time audio mixer implementation.
//!
//! This module provides the [`RtMixer`] struct which mixes the active voices into an interleaved
//! output buffer and keeps the sample clock that every playback-clock query is answered from.
//!
//! The mixer manages a fixed pool of [`VoiceSlot`](crate::audio_engine::voice::VoiceSlot)s and
//! operates on [`SampleBuffer`](crate::messages::SampleBuffer) data loaded via
//! [`decode_audio_file_to_sample_buffer`](crate::audio_engine::sample_loader::decode_audio_file_to_sample_buffer).

use crate::audio_engine::constants::{MAX_GROUPS, MAX_VOICES, VOLUME_MAX, VOLUME_MIN};
use crate::audio_engine::voice::{Advance, VoiceSlot};
use crate::messages::{AudioMessage, ControlMessage, SampleBuffer};
use cpal::Sample;

/// Real-time mixer that handles voice management and the sample clock.
///
/// All operations are allocation-free once constructed, so the mixer can run inside an audio
/// callback.
pub struct RtMixer {
    /// Number of output channels (1 for mono, 2 for stereo).
    channels: usize,

    /// Frames rendered since the mixer was created.
    clock: u64,

    /// Per-group gain multipliers.
    group_volume: [f32; MAX_GROUPS],

    /// Active voices with MAX_VOICES slots.
    voices: [VoiceSlot; MAX_VOICES],
}

impl RtMixer {
    /// Creates a new RtMixer with the specified number of channels.
    ///
    /// # Parameters
    ///
    /// - `channels`: Number of output channels (1 for mono, 2 for stereo)
    pub fn new(channels: usize) -> Self {
        Self {
            channels,
            clock: 0,
            group_volume: [VOLUME_MAX; MAX_GROUPS],
            voices: std::array::from_fn(|_| VoiceSlot::new()),
        }
    }

    /// Applies one control message.
    ///
    /// Returns an event for the scheduler side when the message could not be honoured.
    pub fn handle(&mut self, message: ControlMessage) -> Option<AudioMessage> {
        match message {
            ControlMessage::Play {
                channel,
                group,
                sample,
            } => {
                if !self.play(channel, group, sample) {
                    return Some(AudioMessage::VoiceDropped { channel });
                }
            }
            ControlMessage::SetLoop {
                channel,
                iterations,
                start_frame,
                end_frame,
            } => {
                if let Some(voice) = self.voice_mut(channel) {
                    voice.set_loop(iterations, start_frame, end_frame);
                }
            }
            ControlMessage::AddFadePoint {
                channel,
                clock,
                volume,
            } => {
                if let Some(voice) = self.voice_mut(channel) {
                    voice.envelope.add_point(clock, volume);
                }
            }
            ControlMessage::Stop { channel } => self.stop_channel(channel),
            ControlMessage::SetGroupVolume { group, volume } => {
                self.set_group_volume(group, volume)
            }
            ControlMessage::StopAll() => self.stop_all(),
        }
        None
    }

    /// Starts a voice for `channel`.
    ///
    /// Returns `false` if the sample does not match the output layout or no voice slot is free.
    pub fn play(&mut self, channel: u64, group: usize, sample: SampleBuffer) -> bool {
        if sample.channels != self.channels || group >= MAX_GROUPS {
            return false;
        }

        for voice_slot in &mut self.voices {
            if !voice_slot.active {
                voice_slot.start(channel, group, sample);
                return true;
            }
        }

        // No free voice slot: drop deterministically.
        false
    }

    /// Stops the voice playing `channel`, if any.
    pub fn stop_channel(&mut self, channel: u64) {
        if let Some(voice) = self.voice_mut(channel) {
            voice.stop();
        }
    }

    /// Stops all active voices.
    pub fn stop_all(&mut self) {
        for voice in &mut self.voices {
            voice.stop();
        }
    }

    /// Sets the gain of a channel group.
    ///
    /// Invalid values (NaN, infinite, or out of range) are silently ignored.
    pub fn set_group_volume(&mut self, group: usize, volume: f32) {
        if group >= MAX_GROUPS {
            return;
        }

        if !volume.is_finite() || !(VOLUME_MIN..=VOLUME_MAX).contains(&volume) {
            return;
        }

        self.group_volume[group] = volume;
    }

    pub fn is_channel_active(&self, channel: u64) -> bool {
        self.voices.iter().any(|v| v.is_playing_channel(channel))
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.active).count()
    }

    fn voice_mut(&mut self, channel: u64) -> Option<&mut VoiceSlot> {
        self.voices
            .iter_mut()
            .find(|v| v.is_playing_channel(channel))
    }

    /// Renders audio frames to the output buffer and advances the clock.
    ///
    /// Mixes all active voices into the output buffer. The output buffer must contain interleaved
    /// audio samples with `channels` per frame. `on_event` receives a
    /// [`AudioMessage::ChannelEnded`] for every voice that finished its last loop pass.
    ///
    /// # Parameters
    ///
    /// - `output`: Output buffer to fill with mixed audio samples
    pub fn render(&mut self, output: &mut [f32], mut on_event: impl FnMut(AudioMessage)) {
        output.fill(Sample::EQUILIBRIUM);

        if self.channels == 0 {
            return;
        }

        let frames = output.len() / self.channels;
        if frames == 0 {
            return;
        }

        let block_start = self.clock;

        for voice in &mut self.voices {
            if !voice.active {
                continue;
            }

            let Some(sample) = voice.sample.clone() else {
                voice.stop();
                continue;
            };

            if sample.frames() == 0 {
                on_event(AudioMessage::ChannelEnded {
                    channel: voice.channel,
                });
                voice.stop();
                continue;
            }

            let group_gain = self.group_volume[voice.group];

            for frame in 0..frames {
                let gain = voice.envelope.gain_at(block_start + frame as u64) * group_gain;
                let in_base = voice.frame_pos * self.channels;
                let out_base = frame * self.channels;
                for channel in 0..self.channels {
                    output[out_base + channel] += sample.samples[in_base + channel] * gain;
                }

                if voice.advance() == Advance::Finished {
                    on_event(AudioMessage::ChannelEnded {
                        channel: voice.channel,
                    });
                    voice.stop();
                    break;
                }
            }
        }

        self.clock += frames as u64;
    }

    /// Frames rendered so far.
    pub fn clock(&self) -> u64 {
        self.clock
    }

    /// Gets the number of channels configured for this mixer.
    pub fn channels(&self) -> usize {
        self.channels
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn create_test_sample(channels: usize, frames: usize, value: f32) -> SampleBuffer {
        let samples = vec![value; channels * frames];
        SampleBuffer {
            channels,
            samples: Arc::from(samples.into_boxed_slice()),
        }
    }

    #[test]
    fn test_mixer_creation() {
        let mixer = RtMixer::new(2);
        assert_eq!(mixer.channels(), 2);
        assert_eq!(mixer.clock(), 0);
    }

    #[test]
    fn test_play_wrong_channels() {
        let mut mixer = RtMixer::new(2);
        let sample = create_test_sample(1, 100, 0.5);

        assert!(!mixer.play(0, 0, sample));
        assert_eq!(mixer.active_voices(), 0);
    }

    #[test]
    fn test_play_invalid_group() {
        let mut mixer = RtMixer::new(1);
        let sample = create_test_sample(1, 100, 0.5);

        assert!(!mixer.play(0, MAX_GROUPS, sample));
    }

    #[test]
    fn test_handle_play_and_stop() {
        let mut mixer = RtMixer::new(2);
        let sample = create_test_sample(2, 100, 0.5);

        assert!(
            mixer
                .handle(ControlMessage::Play {
                    channel: 4,
                    group: 0,
                    sample
                })
                .is_none()
        );
        assert!(mixer.is_channel_active(4));

        mixer.handle(ControlMessage::Stop { channel: 4 });
        assert!(!mixer.is_channel_active(4));
    }

    #[test]
    fn test_stop_all() {
        let mut mixer = RtMixer::new(2);
        mixer.play(0, 0, create_test_sample(2, 100, 0.5));
        mixer.play(1, 0, create_test_sample(2, 100, 0.5));
        assert_eq!(mixer.active_voices(), 2);

        mixer.handle(ControlMessage::StopAll());
        assert_eq!(mixer.active_voices(), 0);
    }

    #[test]
    fn test_stop_channel_leaves_others() {
        let mut mixer = RtMixer::new(2);
        mixer.play(0, 0, create_test_sample(2, 100, 0.5));
        mixer.play(1, 0, create_test_sample(2, 100, 0.3));

        mixer.stop_channel(0);

        assert!(!mixer.is_channel_active(0));
        assert!(mixer.is_channel_active(1));
    }

    #[test]
    fn test_render_silence_advances_clock() {
        let mut mixer = RtMixer::new(2);
        let mut output = vec![0.0; 200]; // 100 frames of stereo

        mixer.render(&mut output, |_| {});

        assert!(output.iter().all(|&s| s == 0.0));
        assert_eq!(mixer.clock(), 100);
    }

    #[test]
    fn test_render_with_voice() {
        let mut mixer = RtMixer::new(2);
        mixer.play(0, 0, create_test_sample(2, 10, 0.5));

        let mut output = vec![0.0; 20]; // 10 frames of stereo
        mixer.render(&mut output, |_| {});

        assert!(output.iter().all(|&s| (s - 0.5).abs() < f32::EPSILON));
    }

    #[test]
    fn test_render_reports_finished_voice() {
        let mut mixer = RtMixer::new(1);
        mixer.play(9, 0, create_test_sample(1, 5, 0.5));

        let mut events = Vec::new();
        let mut output = vec![0.0; 20];
        mixer.render(&mut output, |event| events.push(event));

        assert_eq!(events, vec![AudioMessage::ChannelEnded { channel: 9 }]);
        assert!(output[..5].iter().all(|&s| s == 0.5));
        assert!(output[5..].iter().all(|&s| s == 0.0));
        assert!(!mixer.is_channel_active(9));
    }

    #[test]
    fn test_render_loop_window() {
        let mut mixer = RtMixer::new(1);
        mixer.play(0, 0, create_test_sample(1, 5, 0.5));
        mixer.handle(ControlMessage::SetLoop {
            channel: 0,
            iterations: 4,
            start_frame: 0,
            end_frame: 5,
        });

        let mut output = vec![0.0; 20];
        mixer.render(&mut output, |_| {});

        // Four passes over five frames fill the whole buffer
        assert!(output.iter().all(|&s| s == 0.5));
    }

    #[test]
    fn test_render_applies_fade_envelope() {
        let mut mixer = RtMixer::new(1);
        mixer.play(0, 0, create_test_sample(1, 100, 1.0));
        mixer.handle(ControlMessage::AddFadePoint {
            channel: 0,
            clock: 0,
            volume: 0.0,
        });
        mixer.handle(ControlMessage::AddFadePoint {
            channel: 0,
            clock: 10,
            volume: 1.0,
        });

        let mut output = vec![0.0; 20];
        mixer.render(&mut output, |_| {});

        assert!((output[0] - 0.0).abs() < 1e-6);
        assert!((output[5] - 0.5).abs() < 1e-6);
        assert!((output[15] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_group_volume_scales_output() {
        let mut mixer = RtMixer::new(1);
        mixer.set_group_volume(1, 0.5);
        mixer.play(0, 1, create_test_sample(1, 10, 1.0));

        let mut output = vec![0.0; 10];
        mixer.render(&mut output, |_| {});

        assert!(output.iter().all(|&s| (s - 0.5).abs() < f32::EPSILON));
    }

    #[test]
    fn test_group_volume_rejects_invalid() {
        let mut mixer = RtMixer::new(1);
        mixer.set_group_volume(0, f32::NAN);
        mixer.set_group_volume(0, 2.0);
        mixer.play(0, 0, create_test_sample(1, 10, 1.0));

        let mut output = vec![0.0; 10];
        mixer.render(&mut output, |_| {});

        assert!(output.iter().all(|&s| (s - 1.0).abs() < f32::EPSILON));
    }

    #[test]
    fn test_multiple_voices_mixing() {
        let mut mixer = RtMixer::new(2);
        mixer.play(0, 0, create_test_sample(2, 10, 0.3));
        mixer.play(1, 0, create_test_sample(2, 10, 0.2));

        let mut output = vec![0.0; 20]; // 10 frames of stereo
        mixer.render(&mut output, |_| {});

        // Output should contain mixed samples (0.3 + 0.2 = 0.5 per channel)
        assert!(output.iter().all(|&s| (s - 0.5).abs() < 1e-6));
    }

    #[test]
    fn test_voice_limit() {
        let mut mixer = RtMixer::new(1);

        for i in 0..(MAX_VOICES + 5) {
            mixer.play(i as u64, 0, create_test_sample(1, 10, 0.5));
        }

        assert_eq!(mixer.active_voices(), MAX_VOICES);
        assert_eq!(
            mixer.handle(ControlMessage::Play {
                channel: 999,
                group: 0,
                sample: create_test_sample(1, 10, 0.5),
            }),
            Some(AudioMessage::VoiceDropped { channel: 999 })
        );
    }
}
