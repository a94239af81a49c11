//! The per-frame driver: retires overdue tracks and keeps the playlist topped up.

use std::path::Path;

use log::{error, info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::ambient::active::ActiveSet;
use crate::ambient::category::{Category, CategoryTable};
use crate::ambient::config::{ConfigError, SchedulerConfig};
use crate::ambient::constants::CHANNEL_GROUP_NAME;
use crate::ambient::pool::ClipPool;
use crate::ambient::source::{ClipSource, DirectoryClipSource};
use crate::ambient::track::{Clip, Track, display_name};
use crate::audio_engine::{AudioBackend, BackendError, ChannelHandle, CpalBackend, GroupHandle};

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid scheduler config: {0}")]
    Config(#[from] ConfigError),

    #[error("audio engine error: {0}")]
    Backend(#[from] BackendError),
}

/// Plays a randomly rotating selection of loops from a categorized library.
///
/// Every loaded track is either pooled or active, never both. Call [`LoopScheduler::start`] once
/// and [`LoopScheduler::frame`] on every render tick.
pub struct LoopScheduler<B: AudioBackend, R: Rng = ChaCha8Rng> {
    pub(crate) backend: B,
    pub(crate) rng: R,
    pub(crate) config: SchedulerConfig,
    pub(crate) group: GroupHandle,
    pub(crate) pool: ClipPool,
    pub(crate) active: ActiveSet,
    loaded: CategoryTable<usize>,
}

impl<B: AudioBackend> LoopScheduler<B, ChaCha8Rng> {
    /// Loads every clip `source` lists, seeding the random source from the OS.
    pub fn new(
        backend: B,
        source: &impl ClipSource,
        config: SchedulerConfig,
    ) -> Result<Self, SchedulerError> {
        Self::with_rng(backend, source, config, ChaCha8Rng::from_os_rng())
    }

    /// Same as [`LoopScheduler::new`] with a reproducible selection sequence.
    pub fn with_seed(
        backend: B,
        source: &impl ClipSource,
        config: SchedulerConfig,
        seed: u64,
    ) -> Result<Self, SchedulerError> {
        Self::with_rng(backend, source, config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl LoopScheduler<CpalBackend, ChaCha8Rng> {
    /// Opens the default output device and loads the clip library under `root`.
    ///
    /// Returns `None` when no engine can be opened; the caller should carry on without ambient
    /// audio.
    pub fn try_open_default(root: impl AsRef<Path>) -> Option<Self> {
        let backend = match CpalBackend::open() {
            Ok(backend) => backend,
            Err(err) => {
                error!("Ambient audio disabled, could not open output: {err}");
                return None;
            }
        };

        let source = DirectoryClipSource::new(root.as_ref());
        match Self::new(backend, &source, SchedulerConfig::default()) {
            Ok(scheduler) => Some(scheduler),
            Err(err) => {
                error!("Ambient audio disabled: {err}");
                None
            }
        }
    }
}

impl<B: AudioBackend, R: Rng> LoopScheduler<B, R> {
    pub fn with_rng(
        mut backend: B,
        source: &impl ClipSource,
        config: SchedulerConfig,
        rng: R,
    ) -> Result<Self, SchedulerError> {
        config.validate()?;
        let group = backend.create_channel_group(CHANNEL_GROUP_NAME)?;

        let mut pool = ClipPool::new();
        let mut loaded = CategoryTable::<usize>::default();
        for category in Category::ALL {
            for path in source.list_clip_paths(category) {
                match backend.create_streaming_clip(&path) {
                    Ok(handle) => {
                        let length = backend.clip_length_ms(&handle).unwrap_or(0);
                        let name = display_name(&path);
                        info!("Loaded {category} loop {name} ({length} ms)");
                        pool.give(Track::new(Clip::new(handle, name, category)));
                        loaded[category] += 1;
                    }
                    Err(err) => error!("Failed to load {}: {err}", path.display()),
                }
            }
        }
        info!("Initializing mixer with {} files", pool.total());

        Ok(Self {
            backend,
            rng,
            config,
            group,
            pool,
            active: ActiveSet::new(),
            loaded,
        })
    }

    /// Builds the first playlist.
    pub fn start(&mut self) {
        self.build_playlist();
    }

    /// One scheduling step: retire overdue tracks, refill if anything was retired, then let the
    /// engine run its own update. Engine errors are logged, never returned.
    pub fn frame(&mut self) {
        if self.retire_overdue() > 0 {
            self.build_playlist();
        }
        if let Err(err) = self.backend.update() {
            warn!("Audio engine update failed: {err}");
        }
    }

    /// Stops overdue tracks and returns them to the pool.
    fn retire_overdue(&mut self) -> usize {
        let backend = &self.backend;
        let retired = self.active.retire_where(self.config.retirement, |track| {
            is_overdue(backend, track.channel(), track.stop_deadline())
        });

        let count = retired.len();
        for mut track in retired {
            if let Some(channel) = track.unbind() {
                self.backend.stop(channel);
            }
            info!("Exit: {}", track.name());
            self.pool.give(track);
        }
        count
    }

    pub fn set_master_volume(&mut self, volume: f32) -> Result<(), BackendError> {
        self.backend.set_group_volume(&self.group, volume)
    }

    pub fn pool(&self) -> &ClipPool {
        &self.pool
    }

    pub fn active(&self) -> &ActiveSet {
        &self.active
    }

    /// Number of clips loaded for `category` at startup.
    pub fn loaded(&self, category: Category) -> usize {
        self.loaded[category]
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

/// A track is overdue once the clock passed its deadline. A channel the engine no longer knows
/// about has ended on its own and counts as overdue too.
fn is_overdue<B: AudioBackend>(
    backend: &B,
    channel: Option<&ChannelHandle>,
    deadline: u64,
) -> bool {
    let Some(channel) = channel else {
        return true;
    };
    match backend.playback_clock(channel) {
        Ok(clock) => clock > deadline,
        Err(_) => true,
    }
}

impl<B: AudioBackend, R: Rng> Drop for LoopScheduler<B, R> {
    fn drop(&mut self) {
        for mut track in self.active.drain() {
            if let Some(channel) = track.unbind() {
                self.backend.stop(channel);
            }
            self.pool.give(track);
        }
        for track in self.pool.drain() {
            self.backend.release_clip(track.into_clip().into_handle());
        }
        if let Err(err) = self.backend.update() {
            warn!("Audio engine update failed during shutdown: {err}");
        }
    }
}
