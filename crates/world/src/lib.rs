//! 2D tile world simulation.
//!
//! The [`Simulation`] owns a [`Grid`] of blocks, the player, NPCs and
//! projectiles, and advances them in fixed ticks driven by
//! [`tilecraft_core::TickScheduler`].

pub mod block;
pub mod entity;
pub mod grid;
pub mod input;
pub mod inventory;
pub mod kinematics;
pub mod mining;
pub mod npc;
pub mod persist;
pub mod random_tick;
pub mod settings;
pub mod sim;
pub mod snapshot;
pub mod terrain;

pub use block::{block_by_name, block_type, blocks, BlockId, BlockType, UpdateRule};
pub use entity::{Archetype, Body, Entity, EntityArena, EntityId, EntityKind, ProjectileState};
pub use grid::{spawn_point, Grid, TilePos, TileRect};
pub use input::{Binding, InputSnapshot, InputSource};
pub use inventory::{Inventory, ItemStack, PlaceOutcome, INVENTORY_SLOTS, SLOT_CAPACITY};
pub use kinematics::Kinematics;
pub use mining::{BlockHit, MiningOutcome};
pub use npc::{NpcBrain, NpcState};
pub use persist::{decode_grid, decode_player, encode_grid, encode_player, PersistError, PlayerSave};
pub use random_tick::{attempts_per_tick, RandomTicker};
pub use settings::SimSettings;
pub use sim::{InteractionReport, Simulation};
pub use snapshot::{EntityView, RenderSnapshot, SlotView};
pub use terrain::{FlatGenerator, GeneratedWorld, TerrainGenerator, WorldGenerator};
