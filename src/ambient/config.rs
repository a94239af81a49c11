//! Scheduler configuration.

use thiserror::Error;

use crate::ambient::category::{Category, CategoryTable};
use crate::ambient::constants::{
    CATEGORY_LIMITS, CATEGORY_VOLUMES, FADE_FLOOR, FADE_IN_SECONDS, FADE_OUT_DIP,
    FADE_OUT_SECONDS, LOOP_LENGTH_STEPS, MAX_CONCURRENT_LOOPS, MAX_LOOP_ITERATIONS,
    MIN_LOOP_LENGTH_SECONDS, STOP_SLACK_TICKS,
};

/// Errors reported when a [`SchedulerConfig`] cannot be used.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("max concurrent loops must be at least 1")]
    NoConcurrency,

    #[error("max concurrent loops ({target}) exceeds the sum of category limits ({limits})")]
    TargetExceedsLimits { target: usize, limits: usize },

    #[error("minimum loop length must be at least one second")]
    EmptyLoop,

    #[error("loop length steps and loop iterations must be at least 1")]
    NoIterations,

    #[error("volume for {category} must be within 0.0..=1.0, got {volume}")]
    CategoryVolume { category: Category, volume: f32 },

    #[error("fade floor must be within 0.0..1.0, got {0}")]
    FadeFloor(f32),

    #[error("fade-in and fade-out must each last at least one second")]
    EmptyRamp,

    #[error("longest loop window ({min_secs} s x {steps}) does not fit in u32 milliseconds")]
    LoopTooLong { min_secs: u32, steps: u32 },
}

/// Concurrency limit and relative volume of one category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryPolicy {
    pub limit: usize,
    pub volume: f32,
}

/// How many overdue tracks one frame retires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetirementPolicy {
    /// Retire every overdue track found in the scan.
    #[default]
    AllOverdue,

    /// Retire at most the first overdue track per frame.
    OnePerTick,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    pub policies: CategoryTable<CategoryPolicy>,
    pub min_loop_length_secs: u32,
    pub loop_length_steps: u32,
    pub max_loop_iterations: u32,
    pub max_concurrent_loops: usize,
    pub fade_floor: f32,
    pub fade_out_dip: f32,
    pub fade_in_secs: u32,
    pub fade_out_secs: u32,
    pub stop_slack_ticks: u64,
    pub retirement: RetirementPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            policies: CategoryTable::from_fn(|c| CategoryPolicy {
                limit: CATEGORY_LIMITS[c],
                volume: CATEGORY_VOLUMES[c],
            }),
            min_loop_length_secs: MIN_LOOP_LENGTH_SECONDS,
            loop_length_steps: LOOP_LENGTH_STEPS,
            max_loop_iterations: MAX_LOOP_ITERATIONS,
            max_concurrent_loops: MAX_CONCURRENT_LOOPS,
            fade_floor: FADE_FLOOR,
            fade_out_dip: FADE_OUT_DIP,
            fade_in_secs: FADE_IN_SECONDS,
            fade_out_secs: FADE_OUT_SECONDS,
            stop_slack_ticks: STOP_SLACK_TICKS,
            retirement: RetirementPolicy::default(),
        }
    }
}

impl SchedulerConfig {
    pub fn limit(&self, category: Category) -> usize {
        self.policies[category].limit
    }

    pub fn volume(&self, category: Category) -> f32 {
        self.policies[category].volume
    }

    pub fn limit_total(&self) -> usize {
        self.policies.values().map(|p| p.limit).sum()
    }

    /// Longest loop window in milliseconds, `None` if it overflows.
    pub fn longest_loop_ms(&self) -> Option<u32> {
        self.min_loop_length_secs
            .checked_mul(self.loop_length_steps)?
            .checked_mul(1000)
    }

    /// Checks the preconditions the playlist builder relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_loops == 0 {
            return Err(ConfigError::NoConcurrency);
        }
        let limits = self.limit_total();
        if self.max_concurrent_loops > limits {
            return Err(ConfigError::TargetExceedsLimits {
                target: self.max_concurrent_loops,
                limits,
            });
        }
        if self.min_loop_length_secs == 0 {
            return Err(ConfigError::EmptyLoop);
        }
        if self.loop_length_steps == 0 || self.max_loop_iterations == 0 {
            return Err(ConfigError::NoIterations);
        }
        if self.longest_loop_ms().is_none() {
            return Err(ConfigError::LoopTooLong {
                min_secs: self.min_loop_length_secs,
                steps: self.loop_length_steps,
            });
        }
        if self.fade_in_secs == 0 || self.fade_out_secs == 0 {
            return Err(ConfigError::EmptyRamp);
        }
        for (category, policy) in self.policies.iter() {
            if !policy.volume.is_finite() || !(0.0..=1.0).contains(&policy.volume) {
                return Err(ConfigError::CategoryVolume {
                    category,
                    volume: policy.volume,
                });
            }
        }
        if !self.fade_floor.is_finite() || !(0.0..1.0).contains(&self.fade_floor) {
            return Err(ConfigError::FadeFloor(self.fade_floor));
        }
        Ok(())
    }
}
