//! World generation.
//!
//! [`TerrainGenerator`] builds a side-on landscape from layered Perlin noise:
//! a bedrock floor, stone, a few rows of dirt capped with grass, sand where a
//! second noise layer is high, and scattered trees. Output depends only on
//! the seed and the grid size.

use glam::Vec2;
use noise::{NoiseFn, Perlin};
use rand::Rng;
use tilecraft_core::{scoped_rng, SimTick};
use tracing::info;

use crate::block::{blocks, BlockId};
use crate::grid::{spawn_point, Grid, TilePos};

const TREE_DOMAIN: u64 = 0x7472_6565;

/// A freshly generated world and where the player starts.
#[derive(Debug, Clone)]
pub struct GeneratedWorld {
    pub grid: Grid,
    pub spawn: Vec2,
}

impl GeneratedWorld {
    /// Wrap a grid, spawning at the centre column.
    pub fn from_grid(grid: Grid) -> Self {
        let spawn = spawn_point(&grid, grid.width() as i32 / 2);
        Self { grid, spawn }
    }
}

/// Produces the initial world.
pub trait WorldGenerator {
    fn generate(&self, width: u32, height: u32) -> GeneratedWorld;
}

/// Multi-octave Perlin sampler along one axis.
struct Octaves {
    perlin: Perlin,
    octaves: u32,
    frequency: f64,
    persistence: f64,
    lacunarity: f64,
}

impl Octaves {
    fn new(seed: u32, octaves: u32, frequency: f64) -> Self {
        Self {
            perlin: Perlin::new(seed),
            octaves,
            frequency,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }

    /// Value in roughly `[-1, 1]`.
    fn sample(&self, x: f64) -> f64 {
        let mut value = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = self.frequency;
        let mut max_value = 0.0;
        for _ in 0..self.octaves {
            // Off-lattice second coordinate; Perlin is zero on integer points.
            value += self.perlin.get([x * frequency, 0.371]) * amplitude;
            max_value += amplitude;
            amplitude *= self.persistence;
            frequency *= self.lacunarity;
        }
        value / max_value
    }
}

/// Seeded noise landscape.
#[derive(Debug, Clone)]
pub struct TerrainGenerator {
    seed: u64,
    /// Surface height as a fraction of world height.
    pub base_level: f32,
    /// Surface variation as a fraction of world height.
    pub variation: f32,
    pub dirt_depth: i32,
    /// One tree per this many grass columns on average.
    pub tree_rarity: u32,
}

impl TerrainGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            base_level: 0.5,
            variation: 0.12,
            dirt_depth: 4,
            tree_rarity: 12,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Fold the 64-bit seed so the high half still changes the noise.
    fn noise_seed(&self) -> u32 {
        (self.seed ^ (self.seed >> 32)) as u32
    }

    fn surface_heights(&self, width: u32, height: u32) -> Vec<i32> {
        let hills = Octaves::new(self.noise_seed(), 4, 0.01);
        let base = height as f64 * self.base_level as f64;
        let variation = height as f64 * self.variation as f64;
        let top = height as i32 - 1;
        let max_surface = (height as i32 - 8).clamp(1, top.max(1));
        let min_surface = 2.min(max_surface);
        (0..width)
            .map(|x| {
                let surface = base + hills.sample(x as f64) * variation;
                (surface as i32).clamp(min_surface, max_surface)
            })
            .collect()
    }

    fn plant_tree(grid: &mut Grid, x: i32, ground: i32, trunk: i32) {
        for dy in 1..=trunk {
            let pos = TilePos::new(x, ground + dy);
            if grid.contains(pos) {
                grid.set(pos, blocks::WOOD);
            }
        }
        let crown = ground + trunk;
        for dy in -1..=2 {
            let radius = if dy == 2 { 1 } else { 2 };
            for dx in -radius..=radius {
                let pos = TilePos::new(x + dx, crown + dy);
                if grid.contains(pos) && grid.get(pos) == blocks::AIR {
                    grid.set(pos, blocks::LEAVES);
                }
            }
        }
    }
}

impl WorldGenerator for TerrainGenerator {
    fn generate(&self, width: u32, height: u32) -> GeneratedWorld {
        let mut grid = Grid::new(width, height);
        let surfaces = self.surface_heights(width, height);
        let sand = Octaves::new(self.noise_seed().wrapping_add(1000), 2, 0.03);

        for (x, &surface) in surfaces.iter().enumerate() {
            let x = x as i32;
            let sandy = sand.sample(x as f64) > 0.35;
            for y in 0..=surface {
                let block = if y == 0 {
                    blocks::BEDROCK
                } else if y == surface {
                    if sandy {
                        blocks::SAND
                    } else {
                        blocks::GRASS
                    }
                } else if y > surface - self.dirt_depth {
                    if sandy {
                        blocks::SAND
                    } else {
                        blocks::DIRT
                    }
                } else {
                    blocks::STONE
                };
                grid.set(TilePos::new(x, y), block);
            }
        }

        let mut rng = scoped_rng(self.seed, TREE_DOMAIN, SimTick::ZERO);
        let mut last_tree = i32::MIN / 2;
        let mut trees = 0;
        for (x, &surface) in surfaces.iter().enumerate() {
            let x = x as i32;
            let roll = rng.gen_range(0..self.tree_rarity.max(1));
            let trunk = rng.gen_range(4..=6);
            if roll != 0 || x - last_tree < 4 {
                continue;
            }
            if grid.get(TilePos::new(x, surface)) != blocks::GRASS {
                continue;
            }
            Self::plant_tree(&mut grid, x, surface, trunk);
            last_tree = x;
            trees += 1;
        }

        let world = GeneratedWorld::from_grid(grid);
        info!(
            seed = self.seed,
            width,
            height,
            trees,
            spawn_x = world.spawn.x,
            spawn_y = world.spawn.y,
            "generated terrain"
        );
        world
    }
}

/// Flat world: solid rows of `block` up to `ground_height`. Used by tests and
/// small headless runs.
#[derive(Debug, Clone, Copy)]
pub struct FlatGenerator {
    pub ground_height: i32,
    pub block: BlockId,
}

impl WorldGenerator for FlatGenerator {
    fn generate(&self, width: u32, height: u32) -> GeneratedWorld {
        let mut grid = Grid::new(width, height);
        grid.fill_rows(0, self.ground_height, self.block);
        if self.ground_height > 0 {
            grid.fill_rows(0, 1, blocks::BEDROCK);
        }
        GeneratedWorld::from_grid(grid)
    }
}
