//! Message definitions for communication between the scheduler thread and the audio thread.
//!
//! This module defines the enums that serve as the wire format for messages passed through the
//! ring buffers between the thread driving the scheduler and the real-time audio thread.

use std::sync::Arc;

/// Decoded, immutable, interleaved sample data shared between a clip and its voices.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    pub channels: usize,
    pub samples: Arc<[f32]>,
}

impl SampleBuffer {
    /// Number of frames (samples per channel) in the buffer.
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels
    }
}

/// Message that is emitted from the audio thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioMessage {
    /// A voice reached the end of its loop passes and went silent.
    ChannelEnded { channel: u64 },

    /// A play request was dropped because every voice slot was busy.
    VoiceDropped { channel: u64 },
}

/// Message that is emitted from the scheduler side.
#[derive(Debug, Clone)]
pub enum ControlMessage {
    /// Start a voice for `channel` on the given group.
    ///
    /// # Parameters
    /// * `channel` - Engine-assigned channel id
    /// * `group` - Channel group slot the voice is mixed into
    /// * `sample` - Pre-decoded immutable sample buffer (shared handle)
    Play {
        channel: u64,
        group: usize,
        sample: SampleBuffer,
    },

    /// Configure the loop window of a playing channel.
    ///
    /// The window is expressed in frames; `iterations` is the number of passes over it.
    SetLoop {
        channel: u64,
        iterations: u32,
        start_frame: usize,
        end_frame: usize,
    },

    /// Add a volume breakpoint at an absolute mixer clock tick.
    AddFadePoint {
        channel: u64,
        clock: u64,
        volume: f32,
    },

    /// Stop a playing channel and free its voice.
    Stop { channel: u64 },

    /// Set the gain of a channel group.
    SetGroupVolume { group: usize, volume: f32 },

    /// Stop all currently active voices.
    StopAll(),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_buffer_frames() {
        let sample = SampleBuffer {
            channels: 2,
            samples: Arc::from(vec![0.0; 8].into_boxed_slice()),
        };
        assert_eq!(sample.frames(), 4);
    }

    #[test]
    fn test_sample_buffer_frames_without_channels() {
        let sample = SampleBuffer {
            channels: 0,
            samples: Arc::from(vec![0.0; 8].into_boxed_slice()),
        };
        assert_eq!(sample.frames(), 0);
    }
}
