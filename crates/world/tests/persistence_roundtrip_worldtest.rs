//! Persistence Round-Trip Worldtest
//!
//! Generates a world, plays it for a while, encodes grid and player, then
//! rebuilds a fresh simulation from the bytes and checks nothing was lost.

use tilecraft_world::{
    blocks, decode_grid, decode_player, encode_grid, encode_player, Binding, GeneratedWorld,
    InputSnapshot, PersistError, SimSettings, Simulation, TerrainGenerator, TilePos,
};

const WORLD_SEED: u64 = 55667788;

fn settings() -> SimSettings {
    SimSettings {
        width: 192,
        height: 96,
        seed: WORLD_SEED,
        ..SimSettings::default()
    }
}

#[test]
fn persistence_roundtrip_worldtest() {
    let mut sim = Simulation::generate(settings(), &TerrainGenerator::new(WORLD_SEED));

    // Let the player land, then dig straight down a few times.
    for _ in 0..64 {
        sim.step(&InputSnapshot::new());
    }
    for _ in 0..24 {
        let feet = sim.player().body.position;
        let below = [-0.5f32, 0.5]
            .into_iter()
            .map(|dx| TilePos::containing(feet + glam::Vec2::new(dx, -0.5)))
            .find(|pos| sim.grid().try_get(*pos).is_some_and(|id| id != blocks::AIR));
        let Some(below) = below else {
            break;
        };
        let click = InputSnapshot::new().press(Binding::Mine).with_cursor(below.center());
        sim.step(&click);
        for _ in 0..8 {
            sim.step(&InputSnapshot::new());
        }
    }
    assert!(!sim.inventory().is_empty(), "digging should collect blocks");

    let grid_bytes = encode_grid(sim.grid()).expect("encode grid");
    let player_bytes = encode_player(&sim.player_save()).expect("encode player");
    assert!(grid_bytes.len() < sim.grid().cells().len(), "grid should compress");

    let grid = decode_grid(&grid_bytes).expect("decode grid");
    assert_eq!(&grid, sim.grid());
    let player = decode_player(&player_bytes).expect("decode player");
    assert_eq!(player, sim.player_save());

    let mut restored = Simulation::new(settings(), GeneratedWorld::from_grid(grid));
    restored.restore_player(player);
    assert_eq!(restored.grid(), sim.grid());
    assert_eq!(restored.inventory(), sim.inventory());
    assert_eq!(restored.player().body.position, sim.player().body.position);
    assert_eq!(restored.player().body.life, sim.player().body.life);
}

#[test]
fn corrupted_save_is_rejected() {
    let sim = Simulation::generate(settings(), &TerrainGenerator::new(WORLD_SEED));
    let mut bytes = encode_grid(sim.grid()).expect("encode");
    let mid = bytes.len() / 2;
    bytes[mid] = bytes[mid].wrapping_add(1);
    assert!(matches!(
        decode_grid(&bytes),
        Err(PersistError::CrcMismatch { .. })
    ));

    let player = encode_player(&sim.player_save()).expect("encode");
    assert!(matches!(
        decode_grid(&player),
        Err(PersistError::BadMagic { .. })
    ));
    assert!(matches!(
        decode_player(&[]),
        Err(PersistError::Truncated { .. })
    ));
}

#[test]
fn bedrock_survives_roundtrip() {
    let sim = Simulation::generate(settings(), &TerrainGenerator::new(WORLD_SEED));
    let grid = decode_grid(&encode_grid(sim.grid()).expect("encode")).expect("decode");
    for x in 0..grid.width() as i32 {
        assert_eq!(grid.get(TilePos::new(x, 0)), blocks::BEDROCK);
    }
}
