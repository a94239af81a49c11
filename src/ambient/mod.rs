//! Ambient loop scheduling.
//!
//! Loops are filed under five [`Category`] roles. A [`LoopScheduler`] keeps a small random
//! selection of them playing: each activation draws a loop length and pass count, schedules a
//! fade envelope on the engine, and records the tick after which the track must be stopped. On
//! every frame overdue tracks go back to the [`ClipPool`] and the playlist is rebuilt.
//!
//! - [`category`]: the categories and a per-category table type
//! - [`config`]: limits, volumes and envelope parameters
//! - [`source`]: where clip files are found
//! - [`track`], [`pool`], [`active`]: ownership of loaded clips
//! - [`envelope`]: loop plans, fade plans and activation
//! - [`playlist`]: category selection and rebuilding
//! - [`scheduler`]: construction, the per-frame driver and shutdown

pub mod active;
pub mod category;
pub mod config;
pub mod constants;
pub mod envelope;
pub mod playlist;
pub mod pool;
pub mod scheduler;
pub mod source;
pub mod track;

#[cfg(test)]
pub(crate) mod test_support;

pub use active::ActiveSet;
pub use category::{Category, CategoryTable};
pub use config::{CategoryPolicy, ConfigError, RetirementPolicy, SchedulerConfig};
pub use envelope::{Breakpoint, FadePlan, LoopPlan};
pub use pool::ClipPool;
pub use scheduler::{LoopScheduler, SchedulerError};
pub use source::{ClipSource, DirectoryClipSource};
pub use track::{Clip, Track};
