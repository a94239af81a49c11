//! Audio Stream Module
//!
//! This module handles CPAL audio stream management including:
//! - Stream initialization and configuration
//! - Audio callback setup
//! - Real-time message processing
//! - Error handling for audio stream operations
//!
//! [`CpalBackend`] is the real-time [`AudioBackend`]: commands are buffered in a
//! [`HandleRegistry`] and pushed onto the command ring on [`AudioBackend::update`], the callback
//! applies them before mixing each block, and the mixer clock is published through an atomic.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Stream, StreamConfig};
use env_logger::{Builder, Env};
use log::{debug, warn};
use rtrb::{Consumer, Producer, RingBuffer};

use crate::audio_engine::constants::{DSP_BLOCK_FRAMES, RING_CAPACITY};
use crate::audio_engine::errors::BackendError;
use crate::audio_engine::mixer::RtMixer;
use crate::audio_engine::registry::HandleRegistry;
use crate::audio_engine::{AudioBackend, ChannelHandle, ClipHandle, GroupHandle};
use crate::messages::{AudioMessage, ControlMessage};

/// Setup and configure the logger for audio operations
pub fn setup_logger() {
    // Users can override via `RUST_LOG`, e.g. `RUST_LOG=debug` to see playlist decisions.
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .try_init()
        .unwrap_or(()); // Ignore initialization errors
}

/// Real-time backend playing through the default output device.
pub struct CpalBackend {
    stream: Stream,
    registry: HandleRegistry,
    producer: Producer<ControlMessage>,
    consumer: Consumer<AudioMessage>,
    clock: Arc<AtomicU64>,
}

impl CpalBackend {
    /// Open the default output device and start the stream.
    ///
    /// This function:
    /// 1. Sets up the default audio device
    /// 2. Configures the stream with a fixed block size
    /// 3. Creates ring buffers for message passing
    /// 4. Moves a mixer into the audio callback
    /// 5. Starts the stream
    pub fn open() -> Result<Self, BackendError> {
        setup_logger();

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(BackendError::NoOutputDevice)?;

        let config = device.default_output_config()?;
        let sample_rate = config.sample_rate();
        let channels = config.channels();

        log::info!(
            "Starting ambient engine... ({} ch@{} Hz)",
            channels,
            sample_rate
        );

        // Commands towards the audio thread
        let (producer_in, mut consumer_in) = RingBuffer::<ControlMessage>::new(RING_CAPACITY);

        // Voice events back from the audio thread
        let (mut producer_out, consumer_out) = RingBuffer::<AudioMessage>::new(RING_CAPACITY);

        let mut mixer = RtMixer::new(channels as usize);
        let clock = Arc::new(AtomicU64::new(0));
        let callback_clock = Arc::clone(&clock);

        let stream_config = StreamConfig {
            channels,
            sample_rate,
            buffer_size: BufferSize::Fixed(DSP_BLOCK_FRAMES),
        };

        let stream = device.build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                while let Ok(message) = consumer_in.pop() {
                    if let Some(event) = mixer.handle(message) {
                        let _ = producer_out.push(event);
                    }
                }

                mixer.render(data, |event| {
                    let _ = producer_out.push(event);
                });
                callback_clock.store(mixer.clock(), Ordering::Release);
            },
            |err| {
                log::error!("Audio stream error: {}", err);
            },
            None,
        )?;

        stream.play()?;

        Ok(Self {
            stream,
            registry: HandleRegistry::new(sample_rate, channels as usize),
            producer: producer_in,
            consumer: consumer_out,
            clock,
        })
    }

    pub fn channels(&self) -> usize {
        self.registry.channels()
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.consumer.pop() {
            match event {
                AudioMessage::ChannelEnded { channel } => {
                    debug!("Channel {channel} finished");
                    self.registry.channel_ended(channel);
                }
                AudioMessage::VoiceDropped { channel } => {
                    warn!("No free voice for channel {channel}, dropped");
                    self.registry.channel_ended(channel);
                }
            }
        }
    }
}

impl AudioBackend for CpalBackend {
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
        Ok(self.clock.load(Ordering::Acquire))
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
        let mut pending = self.registry.take_pending().into_iter();
        let mut deferred = Vec::new();
        while let Some(message) = pending.next() {
            if let Err(rtrb::PushError::Full(message)) = self.producer.push(message) {
                deferred.push(message);
                deferred.extend(pending.by_ref());
            }
        }

        self.drain_events();

        if deferred.is_empty() {
            return Ok(());
        }
        let count = deferred.len();
        self.registry.requeue(deferred);
        Err(BackendError::QueueFull(count))
    }
}

impl Drop for CpalBackend {
    fn drop(&mut self) {
        let _ = self.producer.push(ControlMessage::StopAll());
        let _ = self.stream.pause();
    }
}
