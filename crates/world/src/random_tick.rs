//! Random block updates.
//!
//! Each tick a fixed number of cells is sampled uniformly (with replacement)
//! and the update rule of the block found there is run.

use rand::{rngs::StdRng, Rng};
use tilecraft_core::{scoped_rng, SimTick};
use tracing::trace;

use crate::block::update_block;
use crate::grid::{Grid, TilePos};

const RANDOM_TICK_DOMAIN: u64 = 0x7261_6e64;

/// Number of update attempts per tick: `floor(width * height * fraction / tps)`.
pub fn attempts_per_tick(width: u32, height: u32, update_fraction: f32, ticks_per_second: u32) -> usize {
    let cells = width as f64 * height as f64;
    let attempts = cells * update_fraction as f64 / ticks_per_second.max(1) as f64;
    if attempts.is_finite() && attempts > 0.0 {
        attempts.floor() as usize
    } else {
        0
    }
}

/// Samples cells and dispatches their update rules.
#[derive(Debug, Clone)]
pub struct RandomTicker {
    attempts: usize,
    rng: StdRng,
}

impl RandomTicker {
    pub fn new(grid: &Grid, update_fraction: f32, ticks_per_second: u32, seed: u64) -> Self {
        Self {
            attempts: attempts_per_tick(grid.width(), grid.height(), update_fraction, ticks_per_second),
            rng: scoped_rng(seed, RANDOM_TICK_DOMAIN, SimTick::ZERO),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Draw one uniformly distributed cell.
    pub fn sample(&mut self, width: u32, height: u32) -> TilePos {
        TilePos::new(
            self.rng.gen_range(0..width) as i32,
            self.rng.gen_range(0..height) as i32,
        )
    }

    /// Run one tick of random updates. Returns the number of attempts made.
    /// Cells for which `occupied` returns true are never filled.
    pub fn run_tick(&mut self, grid: &mut Grid, occupied: &dyn Fn(TilePos) -> bool) -> usize {
        for _ in 0..self.attempts {
            let pos = self.sample(grid.width(), grid.height());
            update_block(pos, grid, occupied);
        }
        trace!(attempts = self.attempts, "random block updates");
        self.attempts
    }
}
