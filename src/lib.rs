//! Randomized ambient loop playback.
//!
//! [`ambient`] decides which loops play and for how long; [`audio_engine`] decodes, mixes and
//! outputs them. The two meet at the [`AudioBackend`] trait, so the scheduler can run against the
//! real-time [`CpalBackend`] or the manually clocked [`OfflineBackend`].
//!
//! ```no_run
//! use ambient_loops::{LoopScheduler, setup_logger};
//!
//! setup_logger();
//! if let Some(mut scheduler) = LoopScheduler::try_open_default("Background") {
//!     scheduler.start();
//!     loop {
//!         scheduler.frame();
//!         std::thread::sleep(std::time::Duration::from_millis(16));
//!     }
//! }
//! ```

pub mod ambient;
pub mod audio_engine;
pub mod messages;

pub use ambient::{Category, LoopScheduler, SchedulerConfig, SchedulerError};
pub use audio_engine::{AudioBackend, BackendError, CpalBackend, OfflineBackend, setup_logger};
