//! Per-voice volume envelopes keyed on the mixer clock.
//!
//! Breakpoints are stored in a fixed-size array so adding one on the audio thread never allocates.

use crate::audio_engine::constants::{MAX_FADE_POINTS, VOLUME_MAX, VOLUME_MIN};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadePoint {
    pub clock: u64,
    pub volume: f32,
}

/// Piecewise-linear volume curve over absolute clock ticks.
///
/// Before the first point the first volume holds, after the last point the last volume holds.
/// With no points the envelope is unity gain.
#[derive(Debug, Clone)]
pub struct FadeEnvelope {
    points: [FadePoint; MAX_FADE_POINTS],
    len: usize,
}

impl Default for FadeEnvelope {
    fn default() -> Self {
        Self {
            points: [FadePoint {
                clock: 0,
                volume: VOLUME_MAX,
            }; MAX_FADE_POINTS],
            len: 0,
        }
    }
}

impl FadeEnvelope {
    /// Inserts a breakpoint keeping the points sorted by clock.
    ///
    /// A point at an existing clock replaces that point's volume. Returns `false` if the envelope
    /// is full or the volume is not finite.
    pub fn add_point(&mut self, clock: u64, volume: f32) -> bool {
        if !volume.is_finite() {
            return false;
        }
        let volume = volume.clamp(VOLUME_MIN, VOLUME_MAX);

        let points = &mut self.points[..self.len];
        match points.binary_search_by_key(&clock, |p| p.clock) {
            Ok(existing) => {
                points[existing].volume = volume;
                true
            }
            Err(insert_at) => {
                if self.len == MAX_FADE_POINTS {
                    return false;
                }
                self.points.copy_within(insert_at..self.len, insert_at + 1);
                self.points[insert_at] = FadePoint { clock, volume };
                self.len += 1;
                true
            }
        }
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn points(&self) -> &[FadePoint] {
        &self.points[..self.len]
    }

    /// Gain at `clock`, linearly interpolated between the surrounding breakpoints.
    pub fn gain_at(&self, clock: u64) -> f32 {
        let points = self.points();
        let Some(first) = points.first() else {
            return VOLUME_MAX;
        };
        if clock <= first.clock {
            return first.volume;
        }

        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if clock <= b.clock {
                let span = (b.clock - a.clock) as f64;
                let t = ((clock - a.clock) as f64 / span) as f32;
                return a.volume + (b.volume - a.volume) * t;
            }
        }

        points[points.len() - 1].volume
    }
}
