//! Collision Worldtest
//!
//! Bodies driven through generated terrain by arbitrary input never end a
//! tick overlapping a solid tile.

use proptest::prelude::*;
use tilecraft_world::{
    Binding, InputSnapshot, SimSettings, Simulation, TerrainGenerator,
};

fn small_world(seed: u64) -> Simulation {
    let settings = SimSettings {
        width: 96,
        height: 64,
        seed,
        update_fraction: 0.0,
        ..SimSettings::default()
    };
    Simulation::generate(settings, &TerrainGenerator::new(seed))
}

fn input_from(bits: u8) -> InputSnapshot {
    let mut input = InputSnapshot::new();
    if bits & 1 != 0 {
        input = input.hold(Binding::MoveLeft);
    }
    if bits & 2 != 0 {
        input = input.hold(Binding::MoveRight);
    }
    if bits & 4 != 0 {
        input = input.hold(Binding::Jump);
    }
    if bits & 8 != 0 {
        input = input.hold(Binding::Run);
    }
    input
}

#[test]
fn player_walks_across_terrain_without_clipping() {
    let mut sim = small_world(3);
    let right = InputSnapshot::new().hold(Binding::MoveRight).hold(Binding::Jump);
    for _ in 0..600 {
        sim.step(&right);
        assert!(!sim.player().body.aabb().overlaps_solid(sim.grid()));
    }
    assert!(sim.player().body.position.x > sim.spawn().x);
}

#[test]
fn npcs_stay_out_of_walls() {
    let mut sim = small_world(4);
    let spawn = sim.spawn();
    for dx in [-12.0, -6.0, 6.0, 12.0] {
        let feet = glam::Vec2::new(spawn.x + dx, spawn.y + 8.0);
        sim.spawn_npc(feet);
    }
    for _ in 0..32 * 20 {
        sim.step(&InputSnapshot::new());
        for npc in sim.entities().iter() {
            assert!(!npc.body.aabb().overlaps_solid(sim.grid()));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn random_input_never_overlaps_solid(
        seed in 0u64..1000,
        script in prop::collection::vec(0u8..16, 1..200),
    ) {
        let mut sim = small_world(seed);
        for bits in script {
            let input = input_from(bits);
            sim.step(&input);
            prop_assert!(!sim.player().body.aabb().overlaps_solid(sim.grid()));
        }
    }
}
