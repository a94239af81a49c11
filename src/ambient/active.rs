//! Tracks that are currently playing.

use crate::ambient::category::{Category, CategoryTable};
use crate::ambient::config::RetirementPolicy;
use crate::ambient::track::Track;

#[derive(Debug, Default)]
pub struct ActiveSet {
    tracks: Vec<Track>,
}

impl ActiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, track: Track) {
        self.tracks.push(track);
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    pub fn count(&self, category: Category) -> usize {
        self.tracks
            .iter()
            .filter(|t| t.category() == category)
            .count()
    }

    pub fn count_by_category(&self) -> CategoryTable<usize> {
        let mut counts = CategoryTable::default();
        for track in &self.tracks {
            counts[track.category()] += 1;
        }
        counts
    }

    /// Removes the tracks `is_overdue` selects and returns them in scan order.
    ///
    /// Every remaining track is visited exactly once even while entries are removed. With
    /// [`RetirementPolicy::OnePerTick`] the scan stops after the first removal.
    pub fn retire_where(
        &mut self,
        policy: RetirementPolicy,
        mut is_overdue: impl FnMut(&Track) -> bool,
    ) -> Vec<Track> {
        let mut retired = Vec::new();
        let mut index = 0;
        while index < self.tracks.len() {
            if !is_overdue(&self.tracks[index]) {
                index += 1;
                continue;
            }
            retired.push(self.tracks.remove(index));
            if policy == RetirementPolicy::OnePerTick {
                break;
            }
        }
        retired
    }

    /// Removes every track.
    pub fn drain(&mut self) -> Vec<Track> {
        std::mem::take(&mut self.tracks)
    }
}
