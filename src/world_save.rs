//! Save slots on disk.
//!
//! A slot is a directory holding `world.grid`, `player.bin` and `meta.json`.
//! Every file is written next to its destination and renamed into place so an
//! interrupted save never leaves a half-written file behind.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tilecraft_world::{
    decode_grid, decode_player, encode_grid, encode_player, GeneratedWorld, SimSettings,
    Simulation,
};

const GRID_FILE: &str = "world.grid";
const PLAYER_FILE: &str = "player.bin";
const META_FILE: &str = "meta.json";

/// Slot metadata stored as JSON for quick inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotMetadata {
    pub seed: u64,
    pub width: u32,
    pub height: u32,
    /// Tick count at save time.
    pub tick: u64,
    /// Seconds since the Unix epoch.
    pub saved_at: u64,
}

/// Get the path for a specific save slot.
pub fn slot_path(save_dir: &Path, slot: &str) -> PathBuf {
    save_dir.join(slot)
}

fn current_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes).with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("failed to move {} into place", path.display()))?;
    Ok(())
}

/// Save the grid, the player and slot metadata.
pub fn save_slot(save_dir: &Path, slot: &str, sim: &Simulation) -> Result<SlotMetadata> {
    let slot_dir = slot_path(save_dir, slot);
    fs::create_dir_all(&slot_dir)
        .with_context(|| format!("failed to create slot directory {}", slot_dir.display()))?;

    let grid = encode_grid(sim.grid()).context("failed to encode grid")?;
    let player = encode_player(&sim.player_save()).context("failed to encode player")?;
    let meta = SlotMetadata {
        seed: sim.settings().seed,
        width: sim.grid().width(),
        height: sim.grid().height(),
        tick: sim.tick().0,
        saved_at: current_timestamp(),
    };
    let meta_json = serde_json::to_vec_pretty(&meta).context("failed to serialize metadata")?;

    write_atomic(&slot_dir.join(GRID_FILE), &grid)?;
    write_atomic(&slot_dir.join(PLAYER_FILE), &player)?;
    write_atomic(&slot_dir.join(META_FILE), &meta_json)?;

    tracing::info!(
        slot,
        path = %slot_dir.display(),
        tick = meta.tick,
        grid_bytes = grid.len(),
        "saved slot"
    );
    Ok(meta)
}

/// Read slot metadata without loading the world.
pub fn read_metadata(save_dir: &Path, slot: &str) -> Result<SlotMetadata> {
    let path = slot_path(save_dir, slot).join(META_FILE);
    let json = fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&json).with_context(|| format!("invalid metadata in {}", path.display()))
}

/// Rebuild a simulation from a slot. The grid dimensions come from the file;
/// the remaining settings come from `settings`.
pub fn load_slot(save_dir: &Path, slot: &str, settings: SimSettings) -> Result<Simulation> {
    let slot_dir = slot_path(save_dir, slot);
    if !slot_dir.exists() {
        anyhow::bail!("save slot '{}' does not exist", slot_dir.display());
    }

    let grid_path = slot_dir.join(GRID_FILE);
    let grid_bytes =
        fs::read(&grid_path).with_context(|| format!("failed to read {}", grid_path.display()))?;
    let grid = decode_grid(&grid_bytes)
        .with_context(|| format!("failed to decode {}", grid_path.display()))?;

    let player_path = slot_dir.join(PLAYER_FILE);
    let player_bytes = fs::read(&player_path)
        .with_context(|| format!("failed to read {}", player_path.display()))?;
    let player = decode_player(&player_bytes)
        .with_context(|| format!("failed to decode {}", player_path.display()))?;

    let meta = read_metadata(save_dir, slot)?;
    if (meta.width, meta.height) != (grid.width(), grid.height()) {
        tracing::warn!(
            meta_width = meta.width,
            meta_height = meta.height,
            grid_width = grid.width(),
            grid_height = grid.height(),
            "slot metadata disagrees with grid, using grid dimensions"
        );
    }

    let settings = SimSettings {
        width: grid.width(),
        height: grid.height(),
        ..settings
    };
    let mut sim = Simulation::new(settings, GeneratedWorld::from_grid(grid));
    sim.restore_player(player);

    tracing::info!(slot, path = %slot_dir.display(), saved_tick = meta.tick, "loaded slot");
    Ok(sim)
}
