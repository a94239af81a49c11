//! Tracks that are loaded but not playing, grouped by category.

use crate::ambient::category::{Category, CategoryTable};
use crate::ambient::track::Track;

#[derive(Debug, Default)]
pub struct ClipPool {
    tracks: CategoryTable<Vec<Track>>,
}

impl ClipPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns the track at `index` in `category`.
    ///
    /// Returns `None` when the category is empty or `index` is out of range. Order inside a
    /// category is not preserved.
    pub fn take(&mut self, category: Category, index: usize) -> Option<Track> {
        let tracks = &mut self.tracks[category];
        if index >= tracks.len() {
            return None;
        }
        Some(tracks.swap_remove(index))
    }

    /// Returns a track to its category.
    pub fn give(&mut self, track: Track) {
        self.tracks[track.category()].push(track);
    }

    pub fn len(&self, category: Category) -> usize {
        self.tracks[category].len()
    }

    pub fn is_empty(&self, category: Category) -> bool {
        self.tracks[category].is_empty()
    }

    pub fn total(&self) -> usize {
        self.tracks.values().map(Vec::len).sum()
    }

    pub fn iter(&self, category: Category) -> impl Iterator<Item = &Track> {
        self.tracks[category].iter()
    }

    /// Empties every category.
    pub fn drain(&mut self) -> Vec<Track> {
        self.tracks.values_mut().flat_map(std::mem::take).collect()
    }
}
