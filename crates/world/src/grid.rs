//! Dense 2D block grid.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tilecraft_physics::TileSolidity;

use crate::block::{block_type, blocks, is_known, BlockId};

/// Integer cell coordinate. `y` grows upwards; row 0 is the bottom of the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Cell containing the continuous world point `point`.
    pub fn containing(point: Vec2) -> Self {
        Self {
            x: point.x.floor() as i32,
            y: point.y.floor() as i32,
        }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Centre of the cell in world units.
    pub fn center(self) -> Vec2 {
        Vec2::new(self.x as f32 + 0.5, self.y as f32 + 0.5)
    }
}

/// Rectangular range of cells, `[x, x + width) x [y, y + height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl TileRect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of `width` x `height` cells centred on `center`.
    pub fn around(center: Vec2, width: u32, height: u32) -> Self {
        Self {
            x: (center.x - width as f32 / 2.0).floor() as i32,
            y: (center.y - height as f32 / 2.0).floor() as i32,
            width,
            height,
        }
    }

    pub fn contains(&self, pos: TilePos) -> bool {
        pos.x >= self.x
            && pos.y >= self.y
            && pos.x < self.x + self.width as i32
            && pos.y < self.y + self.height as i32
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.x as f32
            && point.y >= self.y as f32
            && point.x < (self.x + self.width as i32) as f32
            && point.y < (self.y + self.height as i32) as f32
    }
}

/// Fixed-size grid of block ids stored row-major from the bottom row up.
///
/// Every cell always holds a registered block id. Reads and writes outside
/// the grid are programming errors and panic; callers that deal with
/// untrusted coordinates check [`Grid::contains`] first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<BlockId>,
}

impl Grid {
    /// Create a grid filled with air.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, blocks::AIR)
    }

    /// Create a grid with every cell set to `block`.
    pub fn filled(width: u32, height: u32, block: BlockId) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be non-zero");
        assert!(is_known(block), "unknown block id {block}");
        Self {
            width,
            height,
            cells: vec![block; width as usize * height as usize],
        }
    }

    /// Wrap existing row-major cell data. Returns `None` when the length does
    /// not match the dimensions or a cell holds an unknown id.
    pub fn from_cells(width: u32, height: u32, cells: Vec<BlockId>) -> Option<Self> {
        if width == 0 || height == 0 || cells.len() != width as usize * height as usize {
            return None;
        }
        if !cells.iter().all(|&id| is_known(id)) {
            return None;
        }
        Some(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major cell data.
    pub fn cells(&self) -> &[BlockId] {
        &self.cells
    }

    #[inline]
    pub fn contains(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    #[inline]
    fn index(&self, pos: TilePos) -> usize {
        assert!(
            self.contains(pos),
            "cell ({}, {}) outside {}x{} grid",
            pos.x,
            pos.y,
            self.width,
            self.height
        );
        pos.y as usize * self.width as usize + pos.x as usize
    }

    /// Block at `pos`.
    ///
    /// # Panics
    /// Panics if `pos` lies outside the grid.
    #[inline]
    pub fn get(&self, pos: TilePos) -> BlockId {
        self.cells[self.index(pos)]
    }

    /// Block at `pos`, or `None` outside the grid.
    #[inline]
    pub fn try_get(&self, pos: TilePos) -> Option<BlockId> {
        self.contains(pos).then(|| self.get(pos))
    }

    /// Overwrite the block at `pos`.
    ///
    /// # Panics
    /// Panics if `pos` lies outside the grid or `block` is not registered.
    #[inline]
    pub fn set(&mut self, pos: TilePos, block: BlockId) {
        assert!(is_known(block), "unknown block id {block}");
        let index = self.index(pos);
        self.cells[index] = block;
    }

    /// Fill the rows `[y0, y1)` of every column with `block`.
    pub fn fill_rows(&mut self, y0: i32, y1: i32, block: BlockId) {
        for y in y0.max(0)..y1.min(self.height as i32) {
            for x in 0..self.width as i32 {
                self.set(TilePos::new(x, y), block);
            }
        }
    }

    /// Highest non-walkable row in column `x`, if any.
    pub fn top_solid(&self, x: i32) -> Option<i32> {
        if x < 0 || x as u32 >= self.width {
            return None;
        }
        (0..self.height as i32)
            .rev()
            .find(|&y| !block_type(self.get(TilePos::new(x, y))).walkable)
    }

    /// Number of cells holding `block`.
    pub fn count(&self, block: BlockId) -> usize {
        self.cells.iter().filter(|&&id| id == block).count()
    }
}

impl TileSolidity for Grid {
    fn is_solid(&self, x: i32, y: i32) -> bool {
        match self.try_get(TilePos::new(x, y)) {
            Some(id) => !block_type(id).walkable,
            None => true,
        }
    }
}

/// Standing position (feet) for a 2-column wide body centred on column `x`.
///
/// The body straddles columns `x - 1` and `x`, so it is placed one row above
/// the taller of the two.
pub fn spawn_point(grid: &Grid, x: i32) -> Vec2 {
    let x = x.clamp(1, (grid.width() as i32 - 1).max(1));
    let top = grid.top_solid(x - 1).max(grid.top_solid(x));
    let y = top.map_or(0, |row| row + 1);
    Vec2::new(x as f32, y as f32)
}
