//! Fixed-timestep tick scheduling.
//!
//! Converts variable wall-clock frame deltas into a whole number of
//! simulation ticks. The fractional remainder is carried into the next call
//! so no time is ever dropped or duplicated, with one exception: after a
//! long stall the number of ticks returned per call is capped and the excess
//! whole ticks are discarded instead of being replayed in a burst.

use std::collections::VecDeque;

use tracing::warn;

/// Default cap on ticks run for a single frame.
pub const DEFAULT_MAX_TICKS_PER_FRAME: u32 = 8;

/// Upper bound for the debug time scale.
pub const MAX_TIME_SCALE: f64 = 8.0;

/// Fixed-timestep accumulator.
#[derive(Debug, Clone)]
pub struct TickScheduler {
    tick_step: f64,
    accumulator: f64,
    time_scale: f64,
    max_ticks_per_frame: u32,
    /// Ticks produced by recent `advance` calls (newest last).
    history: VecDeque<u32>,
    history_len: usize,
    dropped_ticks: u64,
}

impl TickScheduler {
    /// Create a scheduler running at `ticks_per_second`.
    pub fn new(ticks_per_second: u32) -> Self {
        let tps = ticks_per_second.max(1);
        Self {
            tick_step: 1.0 / tps as f64,
            accumulator: 0.0,
            time_scale: 1.0,
            max_ticks_per_frame: DEFAULT_MAX_TICKS_PER_FRAME,
            history: VecDeque::with_capacity(tps as usize),
            history_len: tps as usize,
            dropped_ticks: 0,
        }
    }

    /// Override the catch-up cap (minimum 1).
    pub fn with_max_ticks_per_frame(mut self, max_ticks: u32) -> Self {
        self.max_ticks_per_frame = max_ticks.max(1);
        self
    }

    /// Duration of a single tick in seconds.
    pub fn tick_step(&self) -> f64 {
        self.tick_step
    }

    /// Seconds currently waiting in the accumulator (always below one step
    /// after `advance` returns).
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Fraction of the next tick already accumulated, for render interpolation.
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.tick_step) as f32
    }

    /// Current debug time scale.
    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Set the debug time scale, clamped to `[0, MAX_TIME_SCALE]`.
    pub fn set_time_scale(&mut self, scale: f64) {
        self.time_scale = if scale.is_finite() {
            scale.clamp(0.0, MAX_TIME_SCALE)
        } else {
            1.0
        };
    }

    /// Queue exactly one tick for the next `advance`, regardless of time scale.
    pub fn step_once(&mut self) {
        self.accumulator += self.tick_step;
    }

    /// Total whole ticks discarded by the catch-up cap.
    pub fn dropped_ticks(&self) -> u64 {
        self.dropped_ticks
    }

    /// Feed elapsed wall time and return how many ticks to run.
    pub fn advance(&mut self, elapsed_seconds: f64) -> u32 {
        if elapsed_seconds.is_finite() && elapsed_seconds > 0.0 {
            self.accumulator += elapsed_seconds * self.time_scale;
        }

        let mut ticks = 0;
        while self.accumulator >= self.tick_step && ticks < self.max_ticks_per_frame {
            self.accumulator -= self.tick_step;
            ticks += 1;
        }

        if self.accumulator >= self.tick_step {
            let excess = (self.accumulator / self.tick_step).floor();
            self.accumulator -= excess * self.tick_step;
            self.dropped_ticks += excess as u64;
            warn!(
                dropped = excess as u64,
                cap = self.max_ticks_per_frame,
                "Frame stall exceeded catch-up cap, discarding ticks"
            );
        }

        if self.history.len() == self.history_len {
            self.history.pop_front();
        }
        self.history.push_back(ticks);

        ticks
    }

    /// Rolling mean of ticks produced per `advance` call.
    pub fn average_ticks_per_frame(&self) -> f32 {
        if self.history.is_empty() {
            return 0.0;
        }
        let total: u32 = self.history.iter().sum();
        total as f32 / self.history.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn whole_steps_produce_ticks() {
        let mut sched = TickScheduler::new(32);
        assert_eq!(sched.advance(1.0 / 32.0), 1);
        assert_eq!(sched.advance(3.0 / 32.0), 3);
        assert_eq!(sched.advance(0.0), 0);
    }

    #[test]
    fn remainder_carries_over() {
        let mut sched = TickScheduler::new(32);
        let step = sched.tick_step();
        assert_eq!(sched.advance(step * 0.6), 0);
        assert_eq!(sched.advance(step * 0.6), 1);
        assert!((sched.accumulator() - step * 0.2).abs() < 1e-9);
    }

    #[test]
    fn stall_is_capped_and_excess_discarded() {
        let mut sched = TickScheduler::new(32).with_max_ticks_per_frame(4);
        let step = sched.tick_step();
        assert_eq!(sched.advance(step * 10.5), 4);
        assert_eq!(sched.dropped_ticks(), 6);
        assert!(sched.accumulator() < step);
        // Next normal frame runs normally.
        assert_eq!(sched.advance(step * 0.5), 1);
    }

    #[test]
    fn negative_and_nan_deltas_are_ignored() {
        let mut sched = TickScheduler::new(32);
        assert_eq!(sched.advance(-1.0), 0);
        assert_eq!(sched.advance(f64::NAN), 0);
        assert_eq!(sched.accumulator(), 0.0);
    }

    #[test]
    fn time_scale_scales_elapsed() {
        let mut sched = TickScheduler::new(32);
        sched.set_time_scale(2.0);
        assert_eq!(sched.advance(1.0 / 32.0), 2);
        sched.set_time_scale(0.0);
        assert_eq!(sched.advance(1.0), 0);
        sched.set_time_scale(100.0);
        assert_eq!(sched.time_scale(), MAX_TIME_SCALE);
    }

    #[test]
    fn step_once_queues_one_tick_even_when_frozen() {
        let mut sched = TickScheduler::new(32);
        sched.set_time_scale(0.0);
        sched.step_once();
        assert_eq!(sched.advance(0.5), 1);
    }

    #[test]
    fn average_ticks_per_frame_tracks_history() {
        let mut sched = TickScheduler::new(4);
        sched.advance(0.25);
        sched.advance(0.0);
        assert!((sched.average_ticks_per_frame() - 0.5).abs() < f32::EPSILON);
    }

    proptest! {
        #[test]
        fn advance_is_delta_additive(a in 0.0f64..2.0, b in 0.0f64..2.0) {
            let mut split = TickScheduler::new(32).with_max_ticks_per_frame(u32::MAX);
            let mut joined = TickScheduler::new(32).with_max_ticks_per_frame(u32::MAX);

            let split_ticks = split.advance(a) + split.advance(b);
            let joined_ticks = joined.advance(a + b);

            prop_assert!((split_ticks as i64 - joined_ticks as i64).abs() <= 1);
        }

        #[test]
        fn accumulator_stays_below_one_step(deltas in prop::collection::vec(0.0f64..0.5, 1..50)) {
            let mut sched = TickScheduler::new(32);
            for delta in deltas {
                sched.advance(delta);
                prop_assert!(sched.accumulator() < sched.tick_step());
                prop_assert!(sched.accumulator() >= 0.0);
            }
        }
    }
}
