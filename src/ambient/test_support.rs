//! Recording engine double for scheduler tests.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::ambient::category::Category;
use crate::audio_engine::{AudioBackend, BackendError, ChannelHandle, ClipHandle, GroupHandle};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopCall {
    pub channel: u64,
    pub iterations: u32,
    pub start_ms: u32,
    pub end_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeCall {
    pub channel: u64,
    pub clock: u64,
    pub volume: f32,
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub sample_rate: u32,
    pub clock: u64,
    pub next_id: u64,
    pub clips: HashMap<u64, PathBuf>,
    pub live: HashMap<u64, u64>,
    pub groups: Vec<String>,
    pub unloadable: HashSet<PathBuf>,
    pub fail_play: bool,
    pub fail_fades: bool,
    pub played: Vec<u64>,
    pub loops: Vec<LoopCall>,
    pub fades: Vec<FadeCall>,
    pub stopped: Vec<u64>,
    pub released: Vec<u64>,
    pub updates: usize,
}

/// Shares its state so tests can inspect it after the scheduler consumed (or dropped) the
/// backend.
#[derive(Debug, Clone)]
pub struct FakeBackend(pub Rc<RefCell<FakeState>>);

impl FakeBackend {
    pub fn new(sample_rate: u32) -> Self {
        Self(Rc::new(RefCell::new(FakeState {
            sample_rate,
            next_id: 1,
            ..FakeState::default()
        })))
    }

    pub fn state(&self) -> std::cell::RefMut<'_, FakeState> {
        self.0.borrow_mut()
    }

    pub fn advance(&self, ticks: u64) {
        self.0.borrow_mut().clock += ticks;
    }

    /// Pretends the engine finished `channel` on its own.
    pub fn end_channel(&self, channel: u64) {
        self.0.borrow_mut().live.remove(&channel);
    }
}

impl AudioBackend for FakeBackend {
    fn sample_rate(&self) -> u32 {
        self.0.borrow().sample_rate
    }

    fn create_streaming_clip(&mut self, path: &Path) -> Result<ClipHandle, BackendError> {
        let mut state = self.0.borrow_mut();
        if state.unloadable.contains(path) {
            return Err(BackendError::UnknownClip(0));
        }
        let id = state.next_id;
        state.next_id += 1;
        state.clips.insert(id, path.to_path_buf());
        Ok(ClipHandle::new(id))
    }

    fn clip_length_ms(&self, clip: &ClipHandle) -> Option<u64> {
        self.0.borrow().clips.get(&clip.id()).map(|_| 16_000)
    }

    fn release_clip(&mut self, clip: ClipHandle) {
        let mut state = self.0.borrow_mut();
        state.clips.remove(&clip.id());
        state.released.push(clip.id());
    }

    fn create_channel_group(&mut self, name: &str) -> Result<GroupHandle, BackendError> {
        let mut state = self.0.borrow_mut();
        state.groups.push(name.to_string());
        Ok(GroupHandle::new(state.groups.len() - 1))
    }

    fn set_group_volume(&mut self, group: &GroupHandle, _volume: f32) -> Result<(), BackendError> {
        if group.index() < self.0.borrow().groups.len() {
            Ok(())
        } else {
            Err(BackendError::UnknownGroup(group.index()))
        }
    }

    fn play(
        &mut self,
        clip: &ClipHandle,
        _group: &GroupHandle,
    ) -> Result<ChannelHandle, BackendError> {
        let mut state = self.0.borrow_mut();
        if state.fail_play || !state.clips.contains_key(&clip.id()) {
            return Err(BackendError::UnknownClip(clip.id()));
        }
        let id = state.next_id;
        state.next_id += 1;
        state.live.insert(id, clip.id());
        state.played.push(clip.id());
        Ok(ChannelHandle::new(id))
    }

    fn set_loop(
        &mut self,
        channel: &ChannelHandle,
        iterations: u32,
        start_ms: u32,
        end_ms: u32,
    ) -> Result<(), BackendError> {
        let mut state = self.0.borrow_mut();
        if !state.live.contains_key(&channel.id()) {
            return Err(BackendError::UnknownChannel(channel.id()));
        }
        state.loops.push(LoopCall {
            channel: channel.id(),
            iterations,
            start_ms,
            end_ms,
        });
        Ok(())
    }

    fn playback_clock(&self, channel: &ChannelHandle) -> Result<u64, BackendError> {
        let state = self.0.borrow();
        if state.live.contains_key(&channel.id()) {
            Ok(state.clock)
        } else {
            Err(BackendError::UnknownChannel(channel.id()))
        }
    }

    fn add_fade_point(
        &mut self,
        channel: &ChannelHandle,
        clock: u64,
        volume: f32,
    ) -> Result<(), BackendError> {
        let mut state = self.0.borrow_mut();
        if state.fail_fades || !state.live.contains_key(&channel.id()) {
            return Err(BackendError::UnknownChannel(channel.id()));
        }
        state.fades.push(FadeCall {
            channel: channel.id(),
            clock,
            volume,
        });
        Ok(())
    }

    fn stop(&mut self, channel: ChannelHandle) {
        let mut state = self.0.borrow_mut();
        state.live.remove(&channel.id());
        state.stopped.push(channel.id());
    }

    fn update(&mut self) -> Result<(), BackendError> {
        self.0.borrow_mut().updates += 1;
        Ok(())
    }
}

/// Source listing `per_category` made-up paths for each category.
pub fn fake_source(per_category: usize) -> impl Fn(Category) -> Vec<PathBuf> {
    move |category: Category| {
        (0..per_category)
            .map(|i| PathBuf::from(category.name()).join(format!("loop_{i}.wav")))
            .collect()
    }
}
