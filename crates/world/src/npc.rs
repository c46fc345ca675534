//! NPC wandering behaviour.
//!
//! An NPC alternates between standing still and walking toward a random
//! column. A countdown drawn from `[3s, 5s]` toggles between the two; reaching
//! the goal also ends a walk early.

use std::ops::RangeInclusive;

use rand::Rng;
use tilecraft_physics::{TileSolidity, EPSILON};
use tracing::debug;

use crate::entity::Body;
use crate::grid::Grid;

/// Horizontal distance at which a goal counts as reached.
pub const GOAL_DISTANCE_MIN: f32 = 0.5;

/// Countdown range in ticks for a given tick rate.
pub fn think_ticks(ticks_per_second: u32) -> RangeInclusive<u32> {
    let tps = ticks_per_second.max(1);
    tps * 3..=tps * 5
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NpcState {
    Idle,
    Seeking { goal_x: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpcBrain {
    state: NpcState,
    timer: u32,
}

impl NpcBrain {
    /// Idle brain with a freshly drawn countdown.
    pub fn new<R: Rng>(rng: &mut R, ticks_per_second: u32) -> Self {
        Self {
            state: NpcState::Idle,
            timer: rng.gen_range(think_ticks(ticks_per_second)),
        }
    }

    /// Brain in an explicit state.
    pub fn with_state(state: NpcState, timer: u32) -> Self {
        Self {
            state,
            timer: timer.max(1),
        }
    }

    pub fn state(&self) -> NpcState {
        self.state
    }

    pub fn timer(&self) -> u32 {
        self.timer
    }

    fn reset_timer<R: Rng>(&mut self, rng: &mut R, ticks_per_second: u32) {
        self.timer = rng.gen_range(think_ticks(ticks_per_second));
    }

    /// Update the state machine and write movement intent into `body`.
    pub fn think<R: Rng>(&mut self, body: &mut Body, grid: &Grid, rng: &mut R, ticks_per_second: u32) {
        self.timer = self.timer.saturating_sub(1);
        if self.timer == 0 {
            self.state = match self.state {
                NpcState::Seeking { .. } => NpcState::Idle,
                NpcState::Idle => NpcState::Seeking {
                    goal_x: rng.gen_range(0..grid.width() as i32),
                },
            };
            self.reset_timer(rng, ticks_per_second);
            debug!(state = ?self.state, "npc changed its mind");
        }

        let NpcState::Seeking { goal_x } = self.state else {
            body.raw_velocity.x = 0.0;
            return;
        };

        let offset = goal_x as f32 - body.position.x;
        if offset.abs() <= GOAL_DISTANCE_MIN {
            self.state = NpcState::Idle;
            self.reset_timer(rng, ticks_per_second);
            body.raw_velocity.x = 0.0;
            return;
        }

        let direction = offset.signum();
        body.raw_velocity.x = direction;

        let aabb = body.aabb();
        let (left, right) = aabb.tile_columns();
        let side = if direction < 0.0 { left - 1 } else { right + 1 };
        let foot_row = (aabb.min.y + EPSILON).floor() as i32;
        if grid.is_solid(side, foot_row) {
            body.jump();
        }
    }
}
