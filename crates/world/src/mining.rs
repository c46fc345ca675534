//! Progressive block mining.

use tracing::debug;

use crate::block::{block_type, blocks, BlockId};
use crate::grid::{Grid, TilePos};
use crate::inventory::Inventory;

/// Result of a single hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiningOutcome {
    /// The block took damage but is still standing.
    Progress { hits: u32, required: u32 },
    /// The block broke. `collected` is false when the inventory had no room.
    Broken { block: BlockId, collected: bool },
    /// The target cannot be mined (air, bedrock).
    Unbreakable,
}

/// Counts consecutive hits against one cell.
///
/// Hitting a different cell restarts the count at one. When the count
/// reaches the block's `hits_to_break` the block is moved into the inventory,
/// the cell becomes air and the count resets to zero, keeping the position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockHit {
    position: Option<TilePos>,
    hits: u32,
}

impl BlockHit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Option<TilePos> {
        self.position
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    /// Register one hit at `target`.
    ///
    /// # Panics
    /// Panics if `target` lies outside the grid.
    pub fn register_hit(
        &mut self,
        grid: &mut Grid,
        inventory: &mut Inventory,
        target: TilePos,
    ) -> MiningOutcome {
        if self.position == Some(target) {
            self.hits += 1;
        } else {
            self.position = Some(target);
            self.hits = 1;
        }

        let block = grid.get(target);
        let Some(required) = block_type(block).hits_to_break else {
            return MiningOutcome::Unbreakable;
        };

        if self.hits < required {
            return MiningOutcome::Progress {
                hits: self.hits,
                required,
            };
        }

        let collected = inventory.add(block, 1) == 0;
        grid.set(target, blocks::AIR);
        self.hits = 0;
        debug!(x = target.x, y = target.y, block, collected, "block broken");
        MiningOutcome::Broken { block, collected }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_hits_break_stone() {
        let mut grid = Grid::new(10, 10);
        let target = TilePos::new(5, 5);
        grid.set(target, blocks::STONE);
        let mut inv = Inventory::new();
        let mut hit = BlockHit::new();

        assert_eq!(
            hit.register_hit(&mut grid, &mut inv, target),
            MiningOutcome::Progress { hits: 1, required: 3 }
        );
        assert_eq!(
            hit.register_hit(&mut grid, &mut inv, target),
            MiningOutcome::Progress { hits: 2, required: 3 }
        );
        assert_eq!(grid.get(target), blocks::STONE);
        assert_eq!(
            hit.register_hit(&mut grid, &mut inv, target),
            MiningOutcome::Broken {
                block: blocks::STONE,
                collected: true
            }
        );
        assert_eq!(grid.get(target), blocks::AIR);
        assert_eq!(inv.count(blocks::STONE), 1);
        assert_eq!(hit.hits(), 0);
        assert_eq!(hit.position(), Some(target));
    }

    #[test]
    fn switching_target_restarts_count() {
        let mut grid = Grid::new(10, 10);
        grid.set(TilePos::new(1, 1), blocks::STONE);
        grid.set(TilePos::new(2, 1), blocks::STONE);
        let mut inv = Inventory::new();
        let mut hit = BlockHit::new();

        hit.register_hit(&mut grid, &mut inv, TilePos::new(1, 1));
        hit.register_hit(&mut grid, &mut inv, TilePos::new(1, 1));
        hit.register_hit(&mut grid, &mut inv, TilePos::new(2, 1));
        assert_eq!(hit.hits(), 1);
        hit.register_hit(&mut grid, &mut inv, TilePos::new(1, 1));
        assert_eq!(hit.hits(), 1);
        assert_eq!(grid.count(blocks::STONE), 2);
    }

    #[test]
    fn air_never_breaks() {
        let mut grid = Grid::new(4, 4);
        let mut inv = Inventory::new();
        let mut hit = BlockHit::new();
        for _ in 0..10 {
            assert_eq!(
                hit.register_hit(&mut grid, &mut inv, TilePos::new(0, 0)),
                MiningOutcome::Unbreakable
            );
        }
        assert!(inv.is_empty());
        assert_eq!(grid.count(blocks::AIR), 16);
    }

    #[test]
    fn bedrock_is_unbreakable() {
        let mut grid = Grid::new(4, 4);
        grid.fill_rows(0, 1, blocks::BEDROCK);
        let mut inv = Inventory::new();
        let mut hit = BlockHit::new();
        for _ in 0..10 {
            hit.register_hit(&mut grid, &mut inv, TilePos::new(2, 0));
        }
        assert_eq!(grid.get(TilePos::new(2, 0)), blocks::BEDROCK);
    }

    #[test]
    fn full_inventory_still_breaks_block() {
        let mut grid = Grid::new(4, 4);
        grid.set(TilePos::new(1, 1), blocks::SAND);
        let mut inv = Inventory::new();
        inv.add(blocks::DIRT, 255 * 9);
        let mut hit = BlockHit::new();

        let outcome = hit.register_hit(&mut grid, &mut inv, TilePos::new(1, 1));
        assert_eq!(
            outcome,
            MiningOutcome::Broken {
                block: blocks::SAND,
                collected: false
            }
        );
        assert_eq!(grid.get(TilePos::new(1, 1)), blocks::AIR);
        assert_eq!(inv.count(blocks::SAND), 0);
    }
}
