//! Read-only views handed to renderers and tooling.

use serde::{Deserialize, Serialize};

use crate::block::{block_type, BlockId};
use crate::entity::{Archetype, Entity, EntityId};
use crate::grid::{Grid, TilePos, TileRect};
use crate::inventory::{Inventory, INVENTORY_SLOTS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub id: EntityId,
    pub archetype: Archetype,
    /// Box min corner (x, y).
    pub min: [f32; 2],
    /// Box size (w, h).
    pub size: [f32; 2],
    pub life: f32,
    pub max_life: f32,
}

impl EntityView {
    pub fn of(entity: &Entity) -> Self {
        let aabb = entity.body.aabb();
        Self {
            id: entity.id,
            archetype: entity.archetype(),
            min: aabb.min.to_array(),
            size: aabb.size().to_array(),
            life: entity.body.life,
            max_life: entity.body.max_life,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotView {
    pub block: Option<BlockId>,
    pub count: u8,
}

/// Everything needed to draw one frame of a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub tick: u64,
    /// Region clipped to the grid.
    pub region: TileRect,
    /// Row-major block ids of `region`, bottom row first.
    pub cells: Vec<BlockId>,
    pub player: Option<EntityView>,
    pub entities: Vec<EntityView>,
    pub hotbar: [SlotView; INVENTORY_SLOTS],
    pub active_slot: usize,
    /// Render interpolation factor between the last two ticks.
    pub alpha: f32,
}

impl RenderSnapshot {
    /// Block at `pos`, if it lies inside the captured region.
    pub fn block_at(&self, pos: TilePos) -> Option<BlockId> {
        if !self.region.contains(pos) {
            return None;
        }
        let dx = (pos.x - self.region.x) as usize;
        let dy = (pos.y - self.region.y) as usize;
        self.cells.get(dy * self.region.width as usize + dx).copied()
    }

    /// Display colour at `pos`.
    pub fn color_at(&self, pos: TilePos) -> Option<[u8; 3]> {
        self.block_at(pos).map(|id| block_type(id).color)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Clip `region` to the grid.
pub fn clip_region(grid: &Grid, region: TileRect) -> TileRect {
    let x0 = region.x.clamp(0, grid.width() as i32);
    let y0 = region.y.clamp(0, grid.height() as i32);
    let x1 = (i64::from(region.x) + i64::from(region.width))
        .clamp(i64::from(x0), i64::from(grid.width())) as i32;
    let y1 = (i64::from(region.y) + i64::from(region.height))
        .clamp(i64::from(y0), i64::from(grid.height())) as i32;
    TileRect::new(x0, y0, (x1 - x0) as u32, (y1 - y0) as u32)
}

/// Copy the cells of an already clipped region.
pub fn capture_cells(grid: &Grid, region: TileRect) -> Vec<BlockId> {
    let mut cells = Vec::with_capacity(region.width as usize * region.height as usize);
    for y in region.y..region.y + region.height as i32 {
        for x in region.x..region.x + region.width as i32 {
            cells.push(grid.get(TilePos::new(x, y)));
        }
    }
    cells
}

pub fn hotbar_view(inventory: &Inventory) -> [SlotView; INVENTORY_SLOTS] {
    let mut view = [SlotView {
        block: None,
        count: 0,
    }; INVENTORY_SLOTS];
    for (slot, stack) in view.iter_mut().zip(inventory.slots()) {
        if let Some(stack) = stack {
            slot.block = Some(stack.block);
            slot.count = stack.count();
        }
    }
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::blocks;

    #[test]
    fn clip_keeps_region_inside_grid() {
        let grid = Grid::new(10, 8);
        assert_eq!(
            clip_region(&grid, TileRect::new(-3, -2, 6, 4)),
            TileRect::new(0, 0, 3, 2)
        );
        assert_eq!(
            clip_region(&grid, TileRect::new(8, 6, 10, 10)),
            TileRect::new(8, 6, 2, 2)
        );
        assert_eq!(
            clip_region(&grid, TileRect::new(20, 20, 5, 5)).width,
            0
        );
    }

    #[test]
    fn clip_handles_extreme_regions() {
        let grid = Grid::new(10, 8);
        assert_eq!(
            clip_region(&grid, TileRect::new(i32::MAX, i32::MAX, u32::MAX, u32::MAX)),
            TileRect::new(10, 8, 0, 0)
        );
        assert_eq!(
            clip_region(&grid, TileRect::new(i32::MIN, i32::MIN, u32::MAX, u32::MAX)),
            TileRect::new(0, 0, 10, 8)
        );
    }

    #[test]
    fn captured_cells_are_row_major() {
        let mut grid = Grid::new(4, 4);
        grid.set(TilePos::new(2, 1), blocks::STONE);
        let region = TileRect::new(1, 1, 2, 2);
        let cells = capture_cells(&grid, region);
        assert_eq!(cells, vec![blocks::AIR, blocks::STONE, blocks::AIR, blocks::AIR]);
    }

    #[test]
    fn hotbar_view_mirrors_inventory() {
        let mut inv = Inventory::new();
        inv.add(blocks::DIRT, 3);
        let view = hotbar_view(&inv);
        assert_eq!(view[0].block, Some(blocks::DIRT));
        assert_eq!(view[0].count, 3);
        assert_eq!(view[1].block, None);
    }
}
