#![warn(missing_docs)]
//! Physics primitives (AABB, tile collisions, etc.).
//!
//! The world is a grid of unit tiles where tile `(x, y)` covers
//! `[x, x + 1) × [y, y + 1)` with +Y pointing up. Boxes may sit at any
//! fractional position; touching a tile edge is not an overlap.

mod sweep;

use glam::Vec2;

pub use sweep::{is_supported, move_and_collide, sweep_x, sweep_y, Collision, SweepResult};

/// Tolerance used when mapping box edges to tile indices.
pub const EPSILON: f32 = 1e-4;

/// Answers whether a tile blocks movement.
///
/// Implementations must report coordinates outside the world as solid.
pub trait TileSolidity {
    /// Returns true if the tile at `(x, y)` cannot be entered.
    fn is_solid(&self, x: i32, y: i32) -> bool;
}

/// Axis-aligned bounding box used for collisions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner (left, bottom).
    pub min: Vec2,
    /// Maximum corner (right, top).
    pub max: Vec2,
}

impl Aabb {
    /// Create a new AABB ensuring min <= max per axis.
    pub fn new(min: Vec2, max: Vec2) -> Self {
        debug_assert!(min.x <= max.x && min.y <= max.y);
        Self { min, max }
    }

    /// Box of `size` whose bottom edge is centred on `feet`.
    pub fn from_feet(feet: Vec2, size: Vec2) -> Self {
        let half = size.x * 0.5;
        Self::new(
            Vec2::new(feet.x - half, feet.y),
            Vec2::new(feet.x + half, feet.y + size.y),
        )
    }

    /// Box extents.
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Box centre.
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Copy of this box moved by `delta`.
    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    /// Tests intersection with another AABB.
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Inclusive range of tile columns the box overlaps.
    pub fn tile_columns(&self) -> (i32, i32) {
        (
            (self.min.x + EPSILON).floor() as i32,
            (self.max.x - EPSILON).floor() as i32,
        )
    }

    /// Inclusive range of tile rows the box overlaps.
    pub fn tile_rows(&self) -> (i32, i32) {
        (
            (self.min.y + EPSILON).floor() as i32,
            (self.max.y - EPSILON).floor() as i32,
        )
    }

    /// Returns true if the box overlaps tile `(x, y)`.
    pub fn overlaps_tile(&self, x: i32, y: i32) -> bool {
        let (c0, c1) = self.tile_columns();
        let (r0, r1) = self.tile_rows();
        (c0..=c1).contains(&x) && (r0..=r1).contains(&y)
    }

    /// Returns true if any tile under the box is solid.
    pub fn overlaps_solid<W: TileSolidity + ?Sized>(&self, world: &W) -> bool {
        let (c0, c1) = self.tile_columns();
        let (r0, r1) = self.tile_rows();
        (r0..=r1).any(|y| (c0..=c1).any(|x| world.is_solid(x, y)))
    }
}
