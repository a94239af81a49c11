//! Scheduler defaults and fixed envelope parameters.

use crate::ambient::category::CategoryTable;
use crate::audio_engine::constants::DSP_BLOCK_FRAMES;

/// Shortest loop window in seconds; windows are 1-4 multiples of this.
pub const MIN_LOOP_LENGTH_SECONDS: u32 = 4;

/// Number of loop-window multiples a track can draw from.
pub const LOOP_LENGTH_STEPS: u32 = 4;

/// Upper bound for the number of passes over a loop window.
pub const MAX_LOOP_ITERATIONS: u32 = 1;

/// Upper bound for the rerolled total concurrency target.
pub const MAX_CONCURRENT_LOOPS: usize = 1;

/// Maximum simultaneous tracks per category.
pub const CATEGORY_LIMITS: CategoryTable<usize> = CategoryTable::new([1, 1, 1, 1, 1]);

/// Relative playback volume per category.
pub const CATEGORY_VOLUMES: CategoryTable<f32> = CategoryTable::new([0.2, 0.3, 0.7, 0.8, 1.0]);

/// Volume at the start and end of every envelope; quiet but not silent.
pub const FADE_FLOOR: f32 = 0.1;

/// How far below the category volume the envelope sits when the fade-out starts.
pub const FADE_OUT_DIP: f32 = 0.1;

/// Length of the fade-in ramp in seconds.
pub const FADE_IN_SECONDS: u32 = 5;

/// Length of the fade-out ramp in seconds.
pub const FADE_OUT_SECONDS: u32 = 2;

/// Clock ticks added after the envelope end before a track is retired: two engine blocks.
pub const STOP_SLACK_TICKS: u64 = 2 * DSP_BLOCK_FRAMES as u64;

/// Name of the channel group every ambient track plays on.
pub const CHANNEL_GROUP_NAME: &str = "Background";

