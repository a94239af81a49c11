//! Playlist building: topping the active set back up after retirements.

use log::{debug, warn};
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::ambient::category::{Category, CategoryTable};
use crate::ambient::config::SchedulerConfig;
use crate::ambient::pool::ClipPool;
use crate::ambient::scheduler::LoopScheduler;
use crate::audio_engine::AudioBackend;

/// Categories that can take one more track: below their limit, with something pooled, and not
/// excluded for the current build.
pub fn eligible_categories(
    config: &SchedulerConfig,
    active: &CategoryTable<usize>,
    pool: &ClipPool,
    excluded: &CategoryTable<bool>,
) -> Vec<Category> {
    Category::ALL
        .into_iter()
        .filter(|&c| !excluded[c] && active[c] < config.limit(c) && !pool.is_empty(c))
        .collect()
}

impl<B: AudioBackend, R: Rng> LoopScheduler<B, R> {
    /// Rerolls the concurrency target and activates tracks until it is reached.
    ///
    /// Stops early when no category can take another track. A category whose activation fails
    /// is left out for the rest of this build. Returns the number of tracks started.
    pub fn build_playlist(&mut self) -> usize {
        let target = self.rng.random_range(1..=self.config.max_concurrent_loops.max(1));
        let mut counts = self.active.count_by_category();
        let mut excluded = CategoryTable::<bool>::default();
        let mut started = 0;

        debug!("Building playlist: target {target}, {} active", self.active.len());

        while self.active.len() < target {
            let eligible = eligible_categories(&self.config, &counts, &self.pool, &excluded);
            let Some(&category) = eligible.choose(&mut self.rng) else {
                if self.active.is_empty() {
                    warn!("No playable clips left, skipping until the next retirement");
                } else {
                    debug!(
                        "No category can take another track ({} of {target} active)",
                        self.active.len()
                    );
                }
                break;
            };

            let index = self.rng.random_range(0..self.pool.len(category));
            if self.activate(category, index) {
                counts[category] += 1;
                started += 1;
            } else {
                excluded[category] = true;
            }
        }

        started
    }
}
