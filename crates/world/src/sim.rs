//! The simulation: owns the world state and orders each tick.
//!
//! A tick runs, in order: random block updates, the player, every NPC
//! (brain then kinematics), every projectile, player interactions (hotbar,
//! mining, placing, spawning, firing) and finally compaction of dead
//! entities. Frames feed wall time into the [`TickScheduler`], which decides
//! how many ticks to run.

use glam::Vec2;
use rand::rngs::StdRng;
use tilecraft_core::{scoped_rng, SimTick, TickScheduler};
use tilecraft_physics::Aabb;
use tracing::{debug, info, trace};

use crate::entity::{Archetype, Body, Entity, EntityArena, EntityId, EntityKind, ProjectileState};
use crate::grid::{Grid, TilePos, TileRect};
use crate::input::{Binding, InputSnapshot, InputSource};
use crate::inventory::{Inventory, PlaceOutcome, INVENTORY_SLOTS};
use crate::kinematics::Kinematics;
use crate::mining::{BlockHit, MiningOutcome};
use crate::npc::NpcBrain;
use crate::persist::PlayerSave;
use crate::random_tick::RandomTicker;
use crate::settings::SimSettings;
use crate::snapshot::{capture_cells, clip_region, hotbar_view, EntityView, RenderSnapshot};
use crate::terrain::{GeneratedWorld, WorldGenerator};

const NPC_DOMAIN: u64 = 0x6e70_63;
const PLAYER_ID: EntityId = EntityId(0);

/// Bounces a projectile survives.
pub const PROJECTILE_BOUNCES: u32 = 3;
/// Projectile lifetime in seconds.
pub const PROJECTILE_LIFETIME_SECS: u32 = 4;
/// Damage dealt by a projectile hit.
pub const PROJECTILE_DAMAGE: f32 = 1.0;

/// What the player's interactions did this tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionReport {
    pub mined: Option<MiningOutcome>,
    pub placed: Option<PlaceOutcome>,
    pub spawned: Option<EntityId>,
    pub fired: Option<EntityId>,
}

pub struct Simulation {
    settings: SimSettings,
    grid: Grid,
    spawn: Vec2,
    scheduler: TickScheduler,
    random_ticker: RandomTicker,
    kinematics: Kinematics,
    player: Entity,
    entities: EntityArena,
    inventory: Inventory,
    block_hit: BlockHit,
    npc_rng: StdRng,
    tick: SimTick,
    paused: bool,
    last_report: InteractionReport,
}

impl Simulation {
    /// Build a simulation around an already generated world.
    pub fn new(settings: SimSettings, world: GeneratedWorld) -> Self {
        let settings = settings.sanitized();
        let GeneratedWorld { grid, spawn } = world;

        let mut scheduler = TickScheduler::new(settings.ticks_per_second)
            .with_max_ticks_per_frame(settings.max_ticks_per_frame);
        scheduler.set_time_scale(settings.time_scale);

        let random_ticker = RandomTicker::new(
            &grid,
            settings.update_fraction,
            settings.ticks_per_second,
            settings.seed,
        );
        let kinematics = Kinematics::new(settings.gravity, settings.tick_step());

        info!(
            width = grid.width(),
            height = grid.height(),
            seed = settings.seed,
            tps = settings.ticks_per_second,
            update_attempts = random_ticker.attempts(),
            "simulation created"
        );

        Self {
            npc_rng: scoped_rng(settings.seed, NPC_DOMAIN, SimTick::ZERO),
            player: Entity {
                id: PLAYER_ID,
                body: Body::new(Archetype::Player, spawn),
                kind: EntityKind::Player,
            },
            entities: EntityArena::with_reserved_ids(PLAYER_ID.0 + 1),
            inventory: Inventory::new(),
            block_hit: BlockHit::new(),
            tick: SimTick::ZERO,
            paused: false,
            last_report: InteractionReport::default(),
            settings,
            grid,
            spawn,
            scheduler,
            random_ticker,
            kinematics,
        }
    }

    /// Generate a world with `generator` and build a simulation around it.
    pub fn generate<G: WorldGenerator + ?Sized>(settings: SimSettings, generator: &G) -> Self {
        let world = generator.generate(settings.width.max(2), settings.height.max(2));
        Self::new(settings, world)
    }

    pub fn settings(&self) -> &SimSettings {
        &self.settings
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn spawn(&self) -> Vec2 {
        self.spawn
    }

    pub fn tick(&self) -> SimTick {
        self.tick
    }

    pub fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    pub fn player(&self) -> &Entity {
        &self.player
    }

    pub fn entities(&self) -> &EntityArena {
        &self.entities
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn block_hit(&self) -> &BlockHit {
        &self.block_hit
    }

    /// Interactions performed by the most recent tick.
    pub fn last_report(&self) -> &InteractionReport {
        &self.last_report
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// While paused, frames run no ticks and wall time is not accumulated.
    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            info!(paused, tick = self.tick.0, "pause toggled");
        }
        self.paused = paused;
    }

    pub fn set_time_scale(&mut self, scale: f64) {
        self.scheduler.set_time_scale(scale);
    }

    /// Queue one tick for the next frame, even when the time scale is zero.
    pub fn step_once(&mut self) {
        self.scheduler.step_once();
    }

    /// Feed one frame of wall time and run the resulting ticks. Returns the
    /// number of ticks run. One-shot presses apply to the first tick only.
    pub fn advance_frame(&mut self, elapsed_seconds: f64, input: &InputSnapshot) -> u32 {
        if self.paused {
            return 0;
        }
        let ticks = self.scheduler.advance(elapsed_seconds);
        if ticks == 0 {
            return 0;
        }
        self.step(input);
        if ticks > 1 {
            let held = input.held_only();
            for _ in 1..ticks {
                self.step(&held);
            }
        }
        ticks
    }

    /// Run exactly one tick.
    pub fn step<I: InputSource + ?Sized>(&mut self, input: &I) {
        let bodies: Vec<Aabb> = std::iter::once(&self.player)
            .chain(self.entities.iter())
            .filter(|e| e.body.alive)
            .map(|e| e.body.aabb())
            .collect();
        let occupied = |pos: TilePos| bodies.iter().any(|b| b.overlaps_tile(pos.x, pos.y));
        self.random_ticker.run_tick(&mut self.grid, &occupied);

        if self.player.body.alive {
            self.apply_player_intent(input);
            self.kinematics.step_living(&mut self.player.body, &self.grid);
        }

        self.update_npcs();
        self.update_projectiles();
        self.last_report = self.handle_interactions(input);

        let removed = self.entities.compact();
        self.tick = self.tick.advance(1);
        trace!(
            tick = self.tick.0,
            entities = self.entities.len(),
            removed,
            "tick complete"
        );
    }

    fn apply_player_intent<I: InputSource + ?Sized>(&mut self, input: &I) {
        let body = &mut self.player.body;
        body.raw_velocity.x = 0.0;
        if input.key_held(Binding::MoveLeft) {
            body.raw_velocity.x -= 1.0;
        }
        if input.key_held(Binding::MoveRight) {
            body.raw_velocity.x += 1.0;
        }
        body.running = input.key_held(Binding::Run);
        if input.key_held(Binding::Jump) {
            body.jump();
        }
    }

    fn update_npcs(&mut self) {
        let tps = self.settings.ticks_per_second;
        for entity in self.entities.iter_mut() {
            let EntityKind::Npc(brain) = &mut entity.kind else {
                continue;
            };
            if !entity.body.alive {
                continue;
            }
            brain.think(&mut entity.body, &self.grid, &mut self.npc_rng, tps);
            self.kinematics.step_living(&mut entity.body, &self.grid);
        }
    }

    fn update_projectiles(&mut self) {
        let entities = self.entities.as_mut_slice();
        for i in 0..entities.len() {
            let hitbox = {
                let Entity { body, kind, .. } = &mut entities[i];
                let EntityKind::Projectile(state) = kind else {
                    continue;
                };
                if !body.alive {
                    continue;
                }
                self.kinematics.step_projectile(body, state, &self.grid);
                if !body.alive {
                    continue;
                }
                body.aabb()
            };

            let target = entities.iter_mut().enumerate().find(|(j, other)| {
                *j != i && other.is_npc() && other.body.alive && other.body.aabb().intersects(&hitbox)
            });
            if let Some((_, npc)) = target {
                let killed = npc.body.damage(PROJECTILE_DAMAGE);
                debug!(npc = npc.id.0, killed, "projectile hit npc");
                entities[i].body.alive = false;
            }
        }
    }

    fn handle_interactions<I: InputSource + ?Sized>(&mut self, input: &I) -> InteractionReport {
        let mut report = InteractionReport::default();
        if !self.player.body.alive {
            return report;
        }

        for slot in 0..INVENTORY_SLOTS {
            if input.key_first_down(Binding::Hotbar(slot as u8)) {
                self.inventory.set_active_slot(slot);
            }
        }
        let scroll = input.scroll_delta();
        if scroll != 0 {
            self.inventory.cycle_active(scroll);
        }

        let Some(cursor) = input.cursor() else {
            return report;
        };
        let target = TilePos::containing(cursor);

        if input.key_first_down(Binding::Fire) {
            report.fired = self.fire_projectile(cursor);
        }
        if input.key_first_down(Binding::SpawnNpc) {
            report.spawned = self.spawn_npc(cursor);
        }

        let in_reach = self.player.body.center().distance(target.center())
            <= self.settings.interaction_reach;
        if !in_reach || !self.grid.contains(target) {
            return report;
        }

        if input.key_first_down(Binding::Mine) {
            report.mined = Some(self.block_hit.register_hit(
                &mut self.grid,
                &mut self.inventory,
                target,
            ));
        }
        if input.key_first_down(Binding::Place) {
            let placer = self.player.body.aabb();
            let blocked_by_npc = self
                .entities
                .iter()
                .any(|e| e.is_npc() && e.body.alive && e.body.aabb().overlaps_tile(target.x, target.y));
            report.placed = Some(if blocked_by_npc {
                PlaceOutcome::Obstructed
            } else {
                self.inventory.place(&mut self.grid, target, &placer)
            });
        }
        report
    }

    /// Spawn an NPC standing at `feet`. Returns `None` if it would overlap
    /// solid tiles.
    pub fn spawn_npc(&mut self, feet: Vec2) -> Option<EntityId> {
        let body = Body::new(Archetype::Npc, feet);
        if body.aabb().overlaps_solid(&self.grid) {
            debug!(x = feet.x, y = feet.y, "npc spawn blocked");
            return None;
        }
        let brain = NpcBrain::new(&mut self.npc_rng, self.settings.ticks_per_second);
        let id = self.entities.spawn(body, EntityKind::Npc(brain));
        info!(id = id.0, x = feet.x, y = feet.y, "spawned npc");
        Some(id)
    }

    /// Fire a projectile from the player's centre toward `target`.
    pub fn fire_projectile(&mut self, target: Vec2) -> Option<EntityId> {
        if !self.player.body.alive {
            return None;
        }
        let origin = self.player.body.center();
        let direction = (target - origin).normalize_or_zero();
        if direction == Vec2::ZERO {
            return None;
        }

        let mut body = Body::new(Archetype::Projectile, Vec2::ZERO);
        body.position = origin - Vec2::new(0.0, body.size.y * 0.5);
        body.raw_velocity = direction;
        body.move_speed = self.settings.projectile_speed;
        if body.aabb().overlaps_solid(&self.grid) {
            return None;
        }

        let state = ProjectileState {
            bounces_left: PROJECTILE_BOUNCES,
            age: 0,
            lifetime: PROJECTILE_LIFETIME_SECS * self.settings.ticks_per_second,
        };
        let id = self.entities.spawn(body, EntityKind::Projectile(state));
        debug!(id = id.0, dx = direction.x, dy = direction.y, "fired projectile");
        Some(id)
    }

    /// Damage the player. Returns true if the player died.
    pub fn damage_player(&mut self, amount: f32) -> bool {
        let died = self.player.body.damage(amount);
        if died {
            info!(tick = self.tick.0, "player died");
        }
        died
    }

    /// Bring the player back at the spawn point with full life.
    pub fn respawn_player(&mut self) {
        self.player.body.revive_at(self.spawn);
        info!(x = self.spawn.x, y = self.spawn.y, "player respawned");
    }

    /// Persistent player state.
    pub fn player_save(&self) -> PlayerSave {
        PlayerSave {
            position: self.player.body.position.to_array(),
            life: self.player.body.life,
            max_life: self.player.body.max_life,
            inventory: self.inventory.clone(),
        }
    }

    /// Restore player state. Positions that would bury the player fall back
    /// to the spawn point.
    pub fn restore_player(&mut self, save: PlayerSave) {
        let body = &mut self.player.body;
        let position = save.position();
        body.revive_at(if position.is_finite() { position } else { self.spawn });
        if body.aabb().overlaps_solid(&self.grid) {
            body.position = self.spawn;
        }
        if save.max_life.is_finite() {
            body.max_life = save.max_life.max(f32::EPSILON);
        }
        body.life = if save.life.is_finite() {
            save.life.clamp(0.0, body.max_life)
        } else {
            body.max_life
        };
        body.alive = body.life > 0.0;
        self.inventory = save.inventory;
        info!(x = body.position.x, y = body.position.y, life = body.life, "player restored");
    }

    /// Capture `region` (clipped to the grid) for rendering.
    pub fn snapshot(&self, region: TileRect) -> RenderSnapshot {
        let region = clip_region(&self.grid, region);
        let player = self.player.body.alive.then(|| EntityView::of(&self.player));
        let entities = self
            .entities
            .iter()
            .filter(|e| e.body.alive && region_touches(region, e))
            .map(EntityView::of)
            .collect();

        RenderSnapshot {
            tick: self.tick.0,
            region,
            cells: capture_cells(&self.grid, region),
            player,
            entities,
            hotbar: hotbar_view(&self.inventory),
            active_slot: self.inventory.active_slot(),
            alpha: self.scheduler.alpha(),
        }
    }
}

fn region_touches(region: TileRect, entity: &Entity) -> bool {
    let aabb = entity.body.aabb();
    aabb.max.x >= region.x as f32
        && aabb.min.x <= (region.x + region.width as i32) as f32
        && aabb.max.y >= region.y as f32
        && aabb.min.y <= (region.y + region.height as i32) as f32
}
