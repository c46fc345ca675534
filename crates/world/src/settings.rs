//! Tunable simulation parameters.

use serde::{Deserialize, Serialize};
use tilecraft_core::{DEFAULT_MAX_TICKS_PER_FRAME, TICKS_PER_SECOND};

/// Simulation settings. Missing fields fall back to [`SimSettings::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    /// World width in tiles.
    pub width: u32,
    /// World height in tiles.
    pub height: u32,
    /// Seed for terrain, the random block updater and NPC decisions.
    pub seed: u64,
    pub ticks_per_second: u32,
    /// Fraction of all cells the random updater samples per simulated second.
    pub update_fraction: f32,
    /// Downward acceleration applied to raw vertical velocity (per second).
    pub gravity: f32,
    /// Catch-up cap for a single frame.
    pub max_ticks_per_frame: u32,
    pub time_scale: f64,
    /// Maximum distance from the player centre for mining and placing.
    pub interaction_reach: f32,
    /// Projectile speed in tiles per second.
    pub projectile_speed: f32,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 512,
            seed: 0x5EED,
            ticks_per_second: TICKS_PER_SECOND,
            update_fraction: 1.0 / 32.0,
            gravity: 10.0,
            max_ticks_per_frame: DEFAULT_MAX_TICKS_PER_FRAME,
            time_scale: 1.0,
            interaction_reach: 8.0,
            projectile_speed: 12.0,
        }
    }
}

impl SimSettings {
    /// Seconds per tick.
    pub fn tick_step(&self) -> f32 {
        1.0 / self.ticks_per_second.max(1) as f32
    }

    /// Clamp values that would make the simulation meaningless.
    pub fn sanitized(mut self) -> Self {
        self.width = self.width.max(2);
        self.height = self.height.max(2);
        self.ticks_per_second = self.ticks_per_second.max(1);
        if !self.update_fraction.is_finite() || self.update_fraction < 0.0 {
            self.update_fraction = 0.0;
        }
        if !self.gravity.is_finite() {
            self.gravity = Self::default().gravity;
        }
        self.max_ticks_per_frame = self.max_ticks_per_frame.max(1);
        if !self.interaction_reach.is_finite() || self.interaction_reach < 0.0 {
            self.interaction_reach = 0.0;
        }
        if !self.projectile_speed.is_finite() || self.projectile_speed <= 0.0 {
            self.projectile_speed = Self::default().projectile_speed;
        }
        self
    }
}
