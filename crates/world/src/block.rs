//! Block type table and update rules.
//!
//! Every block type is described once in a static table indexed by its
//! [`BlockId`]. Grid cells store only the id; behaviour is looked up here.

use crate::grid::{Grid, TilePos};

/// Block identifier stored in each grid cell.
pub type BlockId = u8;

/// Block ids understood by the simulation.
pub mod blocks {
    use super::BlockId;

    pub const AIR: BlockId = 0;
    pub const DIRT: BlockId = 1;
    pub const GRASS: BlockId = 2;
    pub const STONE: BlockId = 3;
    pub const WOOD: BlockId = 4;
    pub const LEAVES: BlockId = 5;
    pub const SAND: BlockId = 6;
    pub const BEDROCK: BlockId = 7;
}

/// Radius searched for wood before leaves decay.
pub const LEAF_SUPPORT_RADIUS: i32 = 4;

/// Behaviour run when the random updater samples a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateRule {
    /// Nothing happens.
    Inert,
    /// Covered grass turns to dirt; exposed grass converts neighbouring dirt.
    GrassSpread,
    /// Falls one cell when there is air below.
    Gravity,
    /// Turns to air when no wood is nearby.
    LeafDecay,
}

/// Immutable descriptor shared by every cell of one block type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockType {
    pub name: &'static str,
    /// Display colour (RGB) for the render collaborator.
    pub color: [u8; 3],
    /// Entities may occupy and pass through this block.
    pub walkable: bool,
    /// Consecutive hits required to mine the block; `None` = unbreakable.
    pub hits_to_break: Option<u32>,
    pub update: UpdateRule,
}

const BLOCK_TYPES: [BlockType; 8] = [
    BlockType {
        name: "air",
        color: [135, 206, 235],
        walkable: true,
        hits_to_break: None,
        update: UpdateRule::Inert,
    },
    BlockType {
        name: "dirt",
        color: [134, 96, 67],
        walkable: false,
        hits_to_break: Some(2),
        update: UpdateRule::Inert,
    },
    BlockType {
        name: "grass",
        color: [95, 159, 53],
        walkable: false,
        hits_to_break: Some(2),
        update: UpdateRule::GrassSpread,
    },
    BlockType {
        name: "stone",
        color: [125, 125, 125],
        walkable: false,
        hits_to_break: Some(3),
        update: UpdateRule::Inert,
    },
    BlockType {
        name: "wood",
        color: [102, 81, 51],
        walkable: true,
        hits_to_break: Some(3),
        update: UpdateRule::Inert,
    },
    BlockType {
        name: "leaves",
        color: [60, 120, 40],
        walkable: true,
        hits_to_break: Some(1),
        update: UpdateRule::LeafDecay,
    },
    BlockType {
        name: "sand",
        color: [219, 207, 163],
        walkable: false,
        hits_to_break: Some(1),
        update: UpdateRule::Gravity,
    },
    BlockType {
        name: "bedrock",
        color: [40, 40, 40],
        walkable: false,
        hits_to_break: None,
        update: UpdateRule::Inert,
    },
];

/// Number of registered block types.
pub const BLOCK_TYPE_COUNT: usize = BLOCK_TYPES.len();

/// Look up the descriptor for `id`.
///
/// # Panics
/// Panics if `id` is not a registered block; grids only ever hold known ids.
#[inline]
pub fn block_type(id: BlockId) -> &'static BlockType {
    &BLOCK_TYPES[id as usize]
}

/// Returns true if `id` names a registered block type.
#[inline]
pub fn is_known(id: BlockId) -> bool {
    (id as usize) < BLOCK_TYPE_COUNT
}

/// Find a block id by its name.
pub fn block_by_name(name: &str) -> Option<BlockId> {
    BLOCK_TYPES
        .iter()
        .position(|ty| ty.name.eq_ignore_ascii_case(name.trim()))
        .map(|index| index as BlockId)
}

impl UpdateRule {
    /// Run this rule for the cell at `pos`. `occupied` reports cells covered
    /// by a living body; rules never turn such a cell solid.
    pub fn apply(self, pos: TilePos, grid: &mut Grid, occupied: &dyn Fn(TilePos) -> bool) {
        match self {
            UpdateRule::Inert => {}
            UpdateRule::GrassSpread => grass_spread(pos, grid),
            UpdateRule::Gravity => fall(pos, grid, occupied),
            UpdateRule::LeafDecay => leaf_decay(pos, grid),
        }
    }
}

/// Dispatch the update rule of whatever block occupies `pos`.
pub fn update_block(pos: TilePos, grid: &mut Grid, occupied: &dyn Fn(TilePos) -> bool) {
    let rule = block_type(grid.get(pos)).update;
    rule.apply(pos, grid, occupied);
}

fn open_above(pos: TilePos, grid: &Grid) -> bool {
    let above = pos.offset(0, 1);
    !grid.contains(above) || block_type(grid.get(above)).walkable
}

fn grass_spread(pos: TilePos, grid: &mut Grid) {
    if !open_above(pos, grid) {
        grid.set(pos, blocks::DIRT);
        return;
    }

    for dx in [-1, 1] {
        for dy in [-1, 0, 1] {
            let neighbour = pos.offset(dx, dy);
            if grid.contains(neighbour)
                && grid.get(neighbour) == blocks::DIRT
                && open_above(neighbour, grid)
            {
                grid.set(neighbour, blocks::GRASS);
            }
        }
    }
}

fn fall(pos: TilePos, grid: &mut Grid, occupied: &dyn Fn(TilePos) -> bool) {
    let below = pos.offset(0, -1);
    if grid.contains(below) && grid.get(below) == blocks::AIR && !occupied(below) {
        let id = grid.get(pos);
        grid.set(below, id);
        grid.set(pos, blocks::AIR);
    }
}

fn leaf_decay(pos: TilePos, grid: &mut Grid) {
    let r = LEAF_SUPPORT_RADIUS;
    let supported = (-r..=r).any(|dy| {
        (-r..=r).any(|dx| {
            let p = pos.offset(dx, dy);
            grid.contains(p) && grid.get(p) == blocks::WOOD
        })
    });
    if !supported {
        grid.set(pos, blocks::AIR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_ids_match_constants() {
        assert_eq!(block_type(blocks::AIR).name, "air");
        assert_eq!(block_type(blocks::STONE).name, "stone");
        assert_eq!(block_type(blocks::BEDROCK).name, "bedrock");
        assert_eq!(block_by_name("Sand"), Some(blocks::SAND));
        assert_eq!(block_by_name("lava"), None);
        assert!(!is_known(BLOCK_TYPE_COUNT as BlockId));
    }

    #[test]
    fn air_and_bedrock_are_unbreakable() {
        assert_eq!(block_type(blocks::AIR).hits_to_break, None);
        assert_eq!(block_type(blocks::BEDROCK).hits_to_break, None);
        assert_eq!(block_type(blocks::STONE).hits_to_break, Some(3));
    }

    #[test]
    fn covered_grass_decays() {
        let mut grid = Grid::new(4, 4);
        grid.set(TilePos::new(1, 1), blocks::GRASS);
        grid.set(TilePos::new(1, 2), blocks::STONE);
        update_block(TilePos::new(1, 1), &mut grid, &|_| false);
        assert_eq!(grid.get(TilePos::new(1, 1)), blocks::DIRT);
    }

    #[test]
    fn grass_spreads_to_exposed_dirt() {
        let mut grid = Grid::new(5, 5);
        grid.set(TilePos::new(2, 1), blocks::GRASS);
        grid.set(TilePos::new(3, 1), blocks::DIRT);
        grid.set(TilePos::new(1, 0), blocks::DIRT);
        // Covered dirt stays dirt.
        grid.set(TilePos::new(3, 0), blocks::DIRT);

        update_block(TilePos::new(2, 1), &mut grid, &|_| false);

        assert_eq!(grid.get(TilePos::new(3, 1)), blocks::GRASS);
        assert_eq!(grid.get(TilePos::new(1, 0)), blocks::GRASS);
        assert_eq!(grid.get(TilePos::new(3, 0)), blocks::DIRT);
    }

    #[test]
    fn sand_falls_into_air() {
        let mut grid = Grid::new(3, 3);
        grid.set(TilePos::new(1, 2), blocks::SAND);
        update_block(TilePos::new(1, 2), &mut grid, &|_| false);
        assert_eq!(grid.get(TilePos::new(1, 1)), blocks::SAND);
        assert_eq!(grid.get(TilePos::new(1, 2)), blocks::AIR);

        // Resting on the bottom row, nothing happens.
        grid.set(TilePos::new(0, 0), blocks::SAND);
        update_block(TilePos::new(0, 0), &mut grid, &|_| false);
        assert_eq!(grid.get(TilePos::new(0, 0)), blocks::SAND);
    }

    #[test]
    fn sand_does_not_fall_into_occupied_cell() {
        let mut grid = Grid::new(3, 3);
        grid.set(TilePos::new(1, 2), blocks::SAND);
        let below = TilePos::new(1, 1);
        update_block(TilePos::new(1, 2), &mut grid, &|pos| pos == below);
        assert_eq!(grid.get(TilePos::new(1, 2)), blocks::SAND);
        assert_eq!(grid.get(below), blocks::AIR);
    }

    #[test]
    fn leaves_need_wood_nearby() {
        let mut grid = Grid::new(12, 12);
        grid.set(TilePos::new(2, 2), blocks::WOOD);
        grid.set(TilePos::new(5, 5), blocks::LEAVES);
        grid.set(TilePos::new(10, 10), blocks::LEAVES);

        update_block(TilePos::new(5, 5), &mut grid, &|_| false);
        update_block(TilePos::new(10, 10), &mut grid, &|_| false);

        assert_eq!(grid.get(TilePos::new(5, 5)), blocks::LEAVES);
        assert_eq!(grid.get(TilePos::new(10, 10)), blocks::AIR);
    }
}
