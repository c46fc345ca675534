//! Hotbar inventory.
//!
//! Nine slots, each either empty or holding a stack of one block type with
//! 1..=255 units. Block ids double as item ids.

use serde::{Deserialize, Serialize};
use tilecraft_physics::Aabb;
use tracing::debug;

use crate::block::{blocks, is_known, BlockId};
use crate::grid::{Grid, TilePos};

/// Maximum units a single slot holds.
pub const SLOT_CAPACITY: u8 = 255;

/// Number of hotbar slots.
pub const INVENTORY_SLOTS: usize = 9;

/// A non-empty stack of one block type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub block: BlockId,
    count: u8,
}

impl ItemStack {
    /// Create a stack of up to `SLOT_CAPACITY` units, returning the stack and
    /// the amount that did not fit. `None` when `amount` is zero.
    pub fn new(block: BlockId, amount: u32) -> Option<(Self, u32)> {
        if amount == 0 {
            return None;
        }
        let mut stack = Self { block, count: 0 };
        let remainder = stack.add(amount);
        Some((stack, remainder))
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    pub fn is_full(&self) -> bool {
        self.count >= SLOT_CAPACITY
    }

    pub fn remaining_space(&self) -> u8 {
        SLOT_CAPACITY - self.count
    }

    /// Add up to the remaining capacity and return what did not fit.
    pub fn add(&mut self, amount: u32) -> u32 {
        let added = amount.min(self.remaining_space() as u32);
        self.count += added as u8;
        amount - added
    }
}

/// What happened when the player tried to place a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceOutcome {
    Placed(BlockId),
    /// The active slot holds nothing.
    EmptySlot,
    /// The target cell is already occupied.
    Occupied,
    /// The new block would overlap the placer.
    Obstructed,
}

/// Fixed hotbar with an active slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inventory {
    slots: [Option<ItemStack>; INVENTORY_SLOTS],
    active: usize,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new()
    }
}

impl Inventory {
    pub fn new() -> Self {
        Self {
            slots: [None; INVENTORY_SLOTS],
            active: 0,
        }
    }

    pub fn slots(&self) -> &[Option<ItemStack>; INVENTORY_SLOTS] {
        &self.slots
    }

    pub fn get(&self, slot: usize) -> Option<&ItemStack> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    pub fn active_slot(&self) -> usize {
        self.active
    }

    pub fn active_stack(&self) -> Option<&ItemStack> {
        self.get(self.active)
    }

    /// Select the active slot. Out-of-range indices are ignored.
    pub fn set_active_slot(&mut self, slot: usize) -> bool {
        if slot >= INVENTORY_SLOTS {
            return false;
        }
        self.active = slot;
        true
    }

    /// Move the active slot by `delta`, wrapping around the hotbar.
    pub fn cycle_active(&mut self, delta: i32) {
        let len = INVENTORY_SLOTS as i32;
        self.active = (self.active as i32 + delta).rem_euclid(len) as usize;
    }

    /// Add `amount` units of `block`, merging into matching stacks first and
    /// then filling empty slots. Returns the amount that did not fit.
    pub fn add(&mut self, block: BlockId, amount: u32) -> u32 {
        let mut remaining = amount;

        for stack in self.slots.iter_mut().flatten() {
            if remaining == 0 {
                return 0;
            }
            if stack.block == block && !stack.is_full() {
                remaining = stack.add(remaining);
            }
        }

        for slot in &mut self.slots {
            if remaining == 0 {
                break;
            }
            if slot.is_none() {
                if let Some((stack, rest)) = ItemStack::new(block, remaining) {
                    *slot = Some(stack);
                    remaining = rest;
                }
            }
        }

        remaining
    }

    /// Remove one unit from `slot`; the slot empties when it reaches zero.
    /// Returns the block removed, if any.
    pub fn decrement(&mut self, slot: usize) -> Option<BlockId> {
        let entry = self.slots.get_mut(slot)?;
        let stack = entry.as_mut()?;
        let block = stack.block;
        stack.count -= 1;
        if stack.count == 0 {
            *entry = None;
        }
        Some(block)
    }

    /// Total units of `block` across all slots.
    pub fn count(&self, block: BlockId) -> u32 {
        self.slots
            .iter()
            .flatten()
            .filter(|stack| stack.block == block)
            .map(|stack| stack.count as u32)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Place one unit from the active slot at `target`.
    ///
    /// The target must be in bounds and hold air, and the new block must not
    /// overlap `placer`. The grid is untouched unless the result is `Placed`.
    pub fn place(&mut self, grid: &mut Grid, target: TilePos, placer: &Aabb) -> PlaceOutcome {
        let Some(stack) = self.active_stack() else {
            return PlaceOutcome::EmptySlot;
        };
        let block = stack.block;

        if grid.try_get(target) != Some(blocks::AIR) {
            return PlaceOutcome::Occupied;
        }
        if placer.overlaps_tile(target.x, target.y) {
            return PlaceOutcome::Obstructed;
        }

        self.decrement(self.active);
        grid.set(target, block);
        debug!(x = target.x, y = target.y, block, "placed block");
        PlaceOutcome::Placed(block)
    }
}

impl Serialize for Inventory {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        (&self.slots[..], self.active).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Inventory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let (slots, active): (Vec<Option<ItemStack>>, usize) = Deserialize::deserialize(deserializer)?;
        if slots.len() != INVENTORY_SLOTS {
            return Err(serde::de::Error::custom(format!(
                "expected {} slots, got {}",
                INVENTORY_SLOTS,
                slots.len()
            )));
        }
        if active >= INVENTORY_SLOTS {
            return Err(serde::de::Error::custom(format!("active slot {active} out of range")));
        }
        for stack in slots.iter().flatten() {
            if stack.count == 0 {
                return Err(serde::de::Error::custom("empty stack stored in slot"));
            }
            if !is_known(stack.block) {
                return Err(serde::de::Error::custom(format!("unknown block id {}", stack.block)));
            }
        }

        let slots: [Option<ItemStack>; INVENTORY_SLOTS] = slots
            .try_into()
            .map_err(|_| serde::de::Error::custom("failed to convert slots"))?;

        Ok(Self { slots, active })
    }
}
