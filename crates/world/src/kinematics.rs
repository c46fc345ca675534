//! Per-tick motion integration against the tile grid.
//!
//! Living entities: intent has already been written into `raw_velocity`;
//! gravity is applied unless grounded, the raw velocity is scaled by move
//! speed (and the run multiplier horizontally), and the resulting
//! displacement is resolved horizontally then vertically.
//!
//! Projectiles ignore gravity and reflect whichever axis was blocked.

use glam::Vec2;
use tilecraft_physics::{is_supported, move_and_collide};

use crate::entity::{Body, ProjectileState};
use crate::grid::Grid;

/// Lowest raw vertical velocity reachable by falling.
pub const MAX_FALL_RAW_SPEED: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    pub gravity: f32,
    pub tick_step: f32,
}

impl Kinematics {
    pub fn new(gravity: f32, tick_step: f32) -> Self {
        Self { gravity, tick_step }
    }

    fn effective_velocity(body: &Body) -> Vec2 {
        let run = if body.running { body.run_multiplier } else { 1.0 };
        Vec2::new(
            body.raw_velocity.x * body.move_speed * run,
            body.raw_velocity.y * body.move_speed,
        )
    }

    /// Advance a player or NPC body by one tick.
    pub fn step_living(&self, body: &mut Body, grid: &Grid) {
        if body.grounded {
            body.raw_velocity.y = body.raw_velocity.y.max(0.0);
        } else {
            body.raw_velocity.y =
                (body.raw_velocity.y - self.gravity * self.tick_step).max(-MAX_FALL_RAW_SPEED);
        }

        let delta = Self::effective_velocity(body) * self.tick_step;
        let hit = move_and_collide(&body.aabb(), delta, grid);
        body.position += hit.delta;

        if hit.hit_x {
            body.raw_velocity.x = 0.0;
        }
        if hit.landed || hit.bumped_head {
            body.raw_velocity.y = 0.0;
        }
        body.grounded =
            hit.landed || (body.raw_velocity.y <= 0.0 && is_supported(&body.aabb(), grid));
        body.velocity = hit.delta / self.tick_step;
    }

    /// Advance a projectile by one tick. Kills it when it runs out of bounces
    /// or lifetime.
    pub fn step_projectile(&self, body: &mut Body, state: &mut ProjectileState, grid: &Grid) {
        let delta = Self::effective_velocity(body) * self.tick_step;
        let hit = move_and_collide(&body.aabb(), delta, grid);
        body.position += hit.delta;
        body.velocity = hit.delta / self.tick_step;

        let mut bounces = 0;
        if hit.hit_x {
            body.raw_velocity.x = -body.raw_velocity.x;
            bounces += 1;
        }
        if hit.landed || hit.bumped_head {
            body.raw_velocity.y = -body.raw_velocity.y;
            bounces += 1;
        }
        if bounces > 0 {
            if state.bounces_left < bounces {
                state.bounces_left = 0;
                body.alive = false;
            } else {
                state.bounces_left -= bounces;
            }
        }

        state.age += 1;
        if state.age >= state.lifetime {
            body.alive = false;
        }
    }
}
