//! Loop lengths and fade envelopes for newly activated tracks.
//!
//! Every track gets a trapezoid: ramp up from the fade floor to its category volume, hold (dipping
//! slightly), ramp back down to the floor at the end of its last loop pass. The stop deadline sits
//! one slack interval after the last breakpoint.

use log::{error, info};
use rand::Rng;

use crate::ambient::category::Category;
use crate::ambient::config::SchedulerConfig;
use crate::ambient::scheduler::LoopScheduler;
use crate::audio_engine::{AudioBackend, BackendError, ChannelHandle};

/// Randomly drawn loop window and pass count for one activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopPlan {
    pub loop_length_ms: u32,
    pub iterations: u32,
}

impl LoopPlan {
    /// Draws a window of 1 to `loop_length_steps` minimum lengths and a pass count.
    ///
    /// A window longer than the clip is shortened to the largest whole multiple of the minimum
    /// length that fits, or to the clip itself when even one minimum length does not fit.
    pub fn draw(
        config: &SchedulerConfig,
        clip_length_ms: Option<u64>,
        rng: &mut impl Rng,
    ) -> Self {
        let steps = rng.random_range(1..=config.loop_length_steps.max(1));
        let iterations = rng.random_range(1..=config.max_loop_iterations.max(1));

        let step_ms = u64::from(config.min_loop_length_secs) * 1000;
        let mut loop_length_ms = step_ms * u64::from(steps);
        if let Some(clip_ms) = clip_length_ms.filter(|&ms| ms > 0 && ms < loop_length_ms) {
            loop_length_ms = match clip_ms / step_ms {
                0 => clip_ms,
                fitting => fitting * step_ms,
            };
        }

        Self {
            loop_length_ms: u32::try_from(loop_length_ms).unwrap_or(u32::MAX),
            iterations,
        }
    }

    /// Frames one pass covers at `rate`, rounded the way the engine converts the window.
    pub fn pass_ticks(&self, rate: u32) -> u64 {
        u64::from(self.loop_length_ms) * u64::from(rate) / 1000
    }

    /// Intended lifetime of the track in clock ticks.
    pub fn total_ticks(&self, rate: u32) -> u64 {
        self.pass_ticks(rate) * u64::from(self.iterations)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    pub clock: u64,
    pub volume: f32,
}

/// Four envelope breakpoints plus the tick the track must be stopped after.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadePlan {
    pub breakpoints: [Breakpoint; 4],
    pub stop_deadline: u64,
}

impl FadePlan {
    /// Lays the envelope out from `t0` over `total` clock ticks at `rate` ticks per second.
    ///
    /// Ramps keep their configured lengths when they fit; otherwise both are scaled down in
    /// proportion so the fade-in end never passes the fade-out start.
    pub fn compute(t0: u64, rate: u32, total: u64, volume: f32, config: &SchedulerConfig) -> Self {
        let rate = u64::from(rate);
        let mut fade_in = rate * u64::from(config.fade_in_secs);
        let mut fade_out = rate * u64::from(config.fade_out_secs);

        let ramps = fade_in + fade_out;
        if ramps > total && ramps > 0 {
            fade_in = total * fade_in / ramps;
            fade_out = total - fade_in;
        }

        let floor = config.fade_floor;
        let hold = (volume - config.fade_out_dip).max(floor);
        let end = t0 + total;

        Self {
            breakpoints: [
                Breakpoint {
                    clock: t0,
                    volume: floor,
                },
                Breakpoint {
                    clock: t0 + fade_in,
                    volume,
                },
                Breakpoint {
                    clock: end - fade_out,
                    volume: hold,
                },
                Breakpoint {
                    clock: end,
                    volume: floor,
                },
            ],
            stop_deadline: end + config.stop_slack_ticks,
        }
    }
}

impl<B: AudioBackend, R: Rng> LoopScheduler<B, R> {
    /// Moves the pooled track at `index` in `category` into the active set and starts it.
    ///
    /// Returns `false` if there was no such track or the engine refused to start it; a refused
    /// track goes back to the pool untouched.
    pub(crate) fn activate(&mut self, category: Category, index: usize) -> bool {
        let Some(mut track) = self.pool.take(category, index) else {
            return false;
        };

        let clip_length_ms = self.backend.clip_length_ms(track.clip().handle());
        let plan = LoopPlan::draw(&self.config, clip_length_ms, &mut self.rng);
        let channel = match self.backend.play(track.clip().handle(), &self.group) {
            Ok(channel) => channel,
            Err(err) => {
                error!("Failed to play {}: {err}", track.name());
                self.pool.give(track);
                return false;
            }
        };

        let fade = match self.configure_channel(&channel, category, &plan) {
            Ok(fade) => fade,
            Err(err) => {
                error!("Failed to schedule {}: {err}", track.name());
                self.backend.stop(channel);
                self.pool.give(track);
                return false;
            }
        };

        let start = fade.breakpoints[0].clock;
        let end = fade.breakpoints[3].clock;
        info!(
            "{start} - Playing loop: {} (loops: {}, length: {} ms, end: {end})",
            track.name(),
            plan.iterations,
            plan.loop_length_ms,
        );

        track.bind(channel, fade.stop_deadline);
        self.active.push(track);
        true
    }

    fn configure_channel(
        &mut self,
        channel: &ChannelHandle,
        category: Category,
        plan: &LoopPlan,
    ) -> Result<FadePlan, BackendError> {
        self.backend.set_loop(channel, plan.iterations, 0, plan.loop_length_ms)?;

        let t0 = self.backend.playback_clock(channel)?;
        let rate = self.backend.sample_rate();
        let fade = FadePlan::compute(
            t0,
            rate,
            plan.total_ticks(rate),
            self.config.volume(category),
            &self.config,
        );

        for point in fade.breakpoints {
            self.backend.add_fade_point(channel, point.clock, point.volume)?;
        }
        Ok(fade)
    }
}
