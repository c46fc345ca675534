//! Axis-separated sweeps of a box through the tile grid.

use glam::Vec2;

use crate::{Aabb, TileSolidity, EPSILON};

/// Outcome of a single-axis sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepResult {
    /// Distance actually travelled along the axis.
    pub delta: f32,
    /// Whether a solid tile stopped the movement.
    pub blocked: bool,
}

impl SweepResult {
    fn free(delta: f32) -> Self {
        Self {
            delta,
            blocked: false,
        }
    }

    fn blocked(delta: f32) -> Self {
        Self {
            delta,
            blocked: true,
        }
    }
}

/// Outcome of a full horizontal-then-vertical move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    /// Displacement actually applied.
    pub delta: Vec2,
    /// Horizontal movement was stopped by a wall.
    pub hit_x: bool,
    /// Downward movement was stopped by a floor.
    pub landed: bool,
    /// Upward movement was stopped by a ceiling.
    pub bumped_head: bool,
}

/// Sweep `aabb` horizontally by `dx`, stopping flush against the first solid
/// column entered.
pub fn sweep_x<W: TileSolidity + ?Sized>(aabb: &Aabb, dx: f32, world: &W) -> SweepResult {
    let (r0, r1) = aabb.tile_rows();
    let column_blocked = |x: i32| (r0..=r1).any(|y| world.is_solid(x, y));

    if dx > 0.0 {
        let first = (aabb.max.x - EPSILON).floor() as i32 + 1;
        let last = (aabb.max.x + dx - EPSILON).floor() as i32;
        for x in first..=last {
            if column_blocked(x) {
                return SweepResult::blocked(x as f32 - aabb.max.x);
            }
        }
    } else if dx < 0.0 {
        let first = (aabb.min.x + EPSILON).floor() as i32 - 1;
        let last = (aabb.min.x + dx + EPSILON).floor() as i32;
        for x in (last..=first).rev() {
            if column_blocked(x) {
                return SweepResult::blocked((x + 1) as f32 - aabb.min.x);
            }
        }
    }

    SweepResult::free(dx)
}

/// Sweep `aabb` vertically by `dy`, stopping flush against the first solid
/// row entered.
pub fn sweep_y<W: TileSolidity + ?Sized>(aabb: &Aabb, dy: f32, world: &W) -> SweepResult {
    let (c0, c1) = aabb.tile_columns();
    let row_blocked = |y: i32| (c0..=c1).any(|x| world.is_solid(x, y));

    if dy > 0.0 {
        let first = (aabb.max.y - EPSILON).floor() as i32 + 1;
        let last = (aabb.max.y + dy - EPSILON).floor() as i32;
        for y in first..=last {
            if row_blocked(y) {
                return SweepResult::blocked(y as f32 - aabb.max.y);
            }
        }
    } else if dy < 0.0 {
        let first = (aabb.min.y + EPSILON).floor() as i32 - 1;
        let last = (aabb.min.y + dy + EPSILON).floor() as i32;
        for y in (last..=first).rev() {
            if row_blocked(y) {
                return SweepResult::blocked((y + 1) as f32 - aabb.min.y);
            }
        }
    }

    SweepResult::free(dy)
}

/// Move `aabb` by `delta`, resolving the horizontal axis first and then the
/// vertical axis from the horizontally resolved position.
pub fn move_and_collide<W: TileSolidity + ?Sized>(aabb: &Aabb, delta: Vec2, world: &W) -> Collision {
    let horizontal = sweep_x(aabb, delta.x, world);
    let shifted = aabb.translated(Vec2::new(horizontal.delta, 0.0));
    let vertical = sweep_y(&shifted, delta.y, world);

    Collision {
        delta: Vec2::new(horizontal.delta, vertical.delta),
        hit_x: horizontal.blocked,
        landed: vertical.blocked && delta.y < 0.0,
        bumped_head: vertical.blocked && delta.y > 0.0,
    }
}

/// Returns true if the box rests exactly on top of a solid row.
pub fn is_supported<W: TileSolidity + ?Sized>(aabb: &Aabb, world: &W) -> bool {
    let floor = aabb.min.y.round();
    if (aabb.min.y - floor).abs() > EPSILON {
        return false;
    }
    let below = floor as i32 - 1;
    let (c0, c1) = aabb.tile_columns();
    (c0..=c1).any(|x| world.is_solid(x, below))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Small fixed-size grid; everything outside is solid.
    struct TestGrid {
        width: i32,
        height: i32,
        solid: Vec<bool>,
    }

    impl TestGrid {
        fn open(width: i32, height: i32) -> Self {
            Self {
                width,
                height,
                solid: vec![false; (width * height) as usize],
            }
        }

        fn set(&mut self, x: i32, y: i32) {
            self.solid[(y * self.width + x) as usize] = true;
        }
    }

    impl TileSolidity for TestGrid {
        fn is_solid(&self, x: i32, y: i32) -> bool {
            if x < 0 || y < 0 || x >= self.width || y >= self.height {
                return true;
            }
            self.solid[(y * self.width + x) as usize]
        }
    }

    fn player_box(feet: Vec2) -> Aabb {
        Aabb::from_feet(feet, Vec2::new(0.8, 1.8))
    }

    #[test]
    fn free_movement_is_unchanged() {
        let grid = TestGrid::open(10, 10);
        let aabb = player_box(Vec2::new(5.0, 3.0));
        let hit = move_and_collide(&aabb, Vec2::new(0.3, -0.2), &grid);
        assert_eq!(hit.delta, Vec2::new(0.3, -0.2));
        assert!(!hit.hit_x && !hit.landed && !hit.bumped_head);
    }

    #[test]
    fn wall_stops_flush() {
        let mut grid = TestGrid::open(10, 10);
        for y in 0..10 {
            grid.set(6, y);
        }
        let aabb = player_box(Vec2::new(5.0, 3.0));
        let hit = move_and_collide(&aabb, Vec2::new(0.9, 0.0), &grid);
        assert!(hit.hit_x);
        let moved = aabb.translated(hit.delta);
        assert!((moved.max.x - 6.0).abs() < 1e-5);
        assert!(!moved.overlaps_solid(&grid));
    }

    #[test]
    fn falling_lands_on_floor() {
        let mut grid = TestGrid::open(10, 10);
        for x in 0..10 {
            grid.set(x, 2);
        }
        let aabb = player_box(Vec2::new(5.0, 3.4));
        let hit = move_and_collide(&aabb, Vec2::new(0.0, -0.9), &grid);
        assert!(hit.landed);
        let moved = aabb.translated(hit.delta);
        assert!((moved.min.y - 3.0).abs() < 1e-5);
        assert!(is_supported(&moved, &grid));
    }

    #[test]
    fn ceiling_bumps_head() {
        let mut grid = TestGrid::open(10, 10);
        grid.set(5, 6);
        let aabb = player_box(Vec2::new(5.5, 3.5));
        let hit = move_and_collide(&aabb, Vec2::new(0.0, 0.9), &grid);
        assert!(hit.bumped_head);
        let moved = aabb.translated(hit.delta);
        assert!((moved.max.y - 6.0).abs() < 1e-5);
    }

    #[test]
    fn world_edges_are_solid() {
        let grid = TestGrid::open(4, 4);
        let aabb = player_box(Vec2::new(0.5, 0.0));
        let hit = move_and_collide(&aabb, Vec2::new(-0.5, -0.5), &grid);
        assert!(hit.hit_x);
        assert!(hit.landed);
        let moved = aabb.translated(hit.delta);
        assert!(moved.min.x.abs() < 1e-5);
        assert!(moved.min.y.abs() < 1e-5);
    }

    #[test]
    fn unsupported_box_in_air() {
        let grid = TestGrid::open(10, 10);
        assert!(!is_supported(&player_box(Vec2::new(5.0, 4.0)), &grid));
        assert!(!is_supported(&player_box(Vec2::new(5.0, 0.5)), &grid));
        assert!(is_supported(&player_box(Vec2::new(5.0, 0.0)), &grid));
    }

    proptest! {
        #[test]
        fn move_never_ends_inside_solid(
            cells in prop::collection::vec(any::<bool>(), 64),
            fx in 0.5f32..7.5,
            fy in 0.0f32..6.0,
            dx in -0.99f32..0.99,
            dy in -0.99f32..0.99,
        ) {
            let mut grid = TestGrid::open(8, 8);
            for (i, solid) in cells.iter().enumerate() {
                if *solid && i % 5 == 0 {
                    grid.set(i as i32 % 8, i as i32 / 8);
                }
            }
            let aabb = player_box(Vec2::new(fx, fy));
            prop_assume!(!aabb.overlaps_solid(&grid));

            let hit = move_and_collide(&aabb, Vec2::new(dx, dy), &grid);
            let moved = aabb.translated(hit.delta);
            prop_assert!(!moved.overlaps_solid(&grid));
        }
    }
}
