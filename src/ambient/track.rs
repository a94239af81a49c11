//! Clips and the tracks that carry them between the pool and the active set.

use std::path::Path;

use crate::ambient::category::Category;
use crate::audio_engine::{ChannelHandle, ClipHandle};

/// An immutable loaded loop.
#[derive(Debug)]
pub struct Clip {
    handle: ClipHandle,
    name: String,
    category: Category,
}

impl Clip {
    pub fn new(handle: ClipHandle, name: impl Into<String>, category: Category) -> Self {
        Self {
            handle,
            name: name.into(),
            category,
        }
    }

    pub fn handle(&self) -> &ClipHandle {
        &self.handle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub(crate) fn into_handle(self) -> ClipHandle {
        self.handle
    }
}

/// Display name for a clip loaded from `path`: the file stem, or the whole path if it has none.
pub fn display_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Runtime record of one clip. Owned by either the pool or the active set.
#[derive(Debug)]
pub struct Track {
    clip: Clip,
    channel: Option<ChannelHandle>,
    stop_deadline: u64,
}

impl Track {
    pub fn new(clip: Clip) -> Self {
        Self {
            clip,
            channel: None,
            stop_deadline: 0,
        }
    }

    pub fn clip(&self) -> &Clip {
        &self.clip
    }

    pub fn name(&self) -> &str {
        self.clip.name()
    }

    pub fn category(&self) -> Category {
        self.clip.category()
    }

    pub fn channel(&self) -> Option<&ChannelHandle> {
        self.channel.as_ref()
    }

    /// Playback-clock tick after which the track is force-stopped.
    pub fn stop_deadline(&self) -> u64 {
        self.stop_deadline
    }

    pub(crate) fn bind(&mut self, channel: ChannelHandle, stop_deadline: u64) {
        self.channel = Some(channel);
        self.stop_deadline = stop_deadline;
    }

    /// Detaches the channel, leaving the track ready to go back to the pool.
    pub(crate) fn unbind(&mut self) -> Option<ChannelHandle> {
        self.stop_deadline = 0;
        self.channel.take()
    }

    pub(crate) fn into_clip(self) -> Clip {
        self.clip
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_display_name_uses_stem() {
        let path = PathBuf::from("Background").join("Low").join("drone_a.ogg");
        assert_eq!(display_name(&path), "drone_a");
    }

    #[test]
    fn test_display_name_falls_back_to_path() {
        assert_eq!(display_name(Path::new("..")), "..");
    }

    #[test]
    fn test_bind_and_unbind() {
        let mut track = Track::new(Clip::new(ClipHandle::new(3), "pad", Category::High));
        assert!(track.channel().is_none());

        track.bind(ChannelHandle::new(11), 500);
        assert_eq!(track.channel().map(ChannelHandle::id), Some(11));
        assert_eq!(track.stop_deadline(), 500);

        let channel = track.unbind();
        assert_eq!(channel.map(|c| c.id()), Some(11));
        assert!(track.channel().is_none());
        assert_eq!(track.category(), Category::High);
        assert_eq!(track.name(), "pad");
    }
}
