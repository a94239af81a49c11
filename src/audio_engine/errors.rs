//! Audio-specific error types.

use thiserror::Error;

/// Errors that can occur while loading audio files.
#[derive(Debug, Error)]
pub enum SampleLoadError {
    /// Failed to open the audio file.
    #[error("failed to open file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode the audio file.
    #[error("failed to decode audio file: {0}")]
    Decode(#[from] symphonia::core::errors::Error),

    /// Failed to create resampler.
    #[error("failed to create resampler: {0}")]
    ResamplerConstruction(#[from] rubato::ResamplerConstructionError),

    /// Failed to resample audio.
    #[error("failed to resample audio: {0}")]
    Resample(#[from] rubato::ResampleError),

    /// Audio file has no default track.
    #[error("audio file has no default track")]
    NoDefaultTrack,

    /// Audio file is missing sample rate information.
    #[error("audio file is missing a sample rate")]
    MissingSampleRate,

    /// Audio file is missing channel information.
    #[error("audio file is missing channel information")]
    MissingChannels,

    /// Unsupported channel mapping configuration.
    #[error(
        "unsupported channel mapping: file has {file_channels} channels, output has {output_channels} channels (only mono↔stereo supported)"
    )]
    UnsupportedChannels {
        /// Number of channels in the source file.
        file_channels: usize,
        /// Number of channels expected for output.
        output_channels: usize,
    },
}

/// Errors reported by an [`AudioBackend`](crate::audio_engine::AudioBackend).
#[derive(Debug, Error)]
pub enum BackendError {
    /// The host exposes no output device.
    #[error("no audio output device found")]
    NoOutputDevice,

    /// The output device has no usable default configuration.
    #[error("no default output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    /// The output stream could not be built.
    #[error("failed to create audio stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    /// The output stream could not be started.
    #[error("failed to play audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    /// A clip could not be loaded.
    #[error("failed to load clip: {0}")]
    Load(#[from] SampleLoadError),

    /// The clip handle does not belong to this engine or was released.
    #[error("unknown clip handle {0}")]
    UnknownClip(u64),

    /// The channel handle does not belong to this engine or was stopped.
    #[error("unknown channel handle {0}")]
    UnknownChannel(u64),

    /// The group handle does not belong to this engine.
    #[error("unknown channel group {0}")]
    UnknownGroup(usize),

    /// Every channel group slot is already in use.
    #[error("channel group limit reached ({0})")]
    GroupLimit(usize),

    /// The command ring to the audio thread is full; the remaining commands stay queued.
    #[error("command queue full, {0} messages deferred")]
    QueueFull(usize),
}
