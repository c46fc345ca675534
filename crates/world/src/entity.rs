//! Entities: the shared kinematic body plus per-variant state.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tilecraft_physics::Aabb;

use crate::npc::NpcBrain;

/// Stable identifier for an entity within one simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Entity variants. Each archetype has fixed body parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    Player,
    Npc,
    Projectile,
}

impl Archetype {
    /// Box size in tiles (width, height).
    pub fn size(&self) -> Vec2 {
        match self {
            Archetype::Player => Vec2::new(1.8, 2.8),
            Archetype::Npc => Vec2::new(1.5, 2.2),
            Archetype::Projectile => Vec2::new(0.4, 0.4),
        }
    }

    /// Tiles per second at unit raw velocity.
    pub fn move_speed(&self) -> f32 {
        match self {
            Archetype::Player => 5.0,
            Archetype::Npc => 3.0,
            Archetype::Projectile => 12.0,
        }
    }

    /// Raw vertical velocity set by a jump.
    pub fn jump_impulse(&self) -> f32 {
        match self {
            Archetype::Player => 3.5,
            Archetype::Npc => 3.0,
            Archetype::Projectile => 0.0,
        }
    }

    /// Horizontal speed multiplier while running.
    pub fn run_multiplier(&self) -> f32 {
        match self {
            Archetype::Player => 1.5,
            Archetype::Npc | Archetype::Projectile => 1.0,
        }
    }

    pub fn max_life(&self) -> f32 {
        match self {
            Archetype::Player => 10.0,
            Archetype::Npc => 2.0,
            Archetype::Projectile => 1.0,
        }
    }
}

/// Kinematic state shared by every entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Bottom-centre of the bounding box.
    pub position: Vec2,
    /// Displacement per second actually applied on the last tick.
    pub velocity: Vec2,
    /// Unscaled movement intent.
    pub raw_velocity: Vec2,
    pub size: Vec2,
    pub life: f32,
    pub max_life: f32,
    pub alive: bool,
    pub move_speed: f32,
    pub jump_impulse: f32,
    pub run_multiplier: f32,
    pub running: bool,
    pub grounded: bool,
}

impl Body {
    pub fn new(archetype: Archetype, position: Vec2) -> Self {
        let max_life = archetype.max_life();
        Self {
            position,
            velocity: Vec2::ZERO,
            raw_velocity: Vec2::ZERO,
            size: archetype.size(),
            life: max_life,
            max_life,
            alive: true,
            move_speed: archetype.move_speed(),
            jump_impulse: archetype.jump_impulse(),
            run_multiplier: archetype.run_multiplier(),
            running: false,
            grounded: false,
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_feet(self.position, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.position + Vec2::new(0.0, self.size.y * 0.5)
    }

    /// Start a jump if standing on something.
    pub fn jump(&mut self) {
        if self.grounded {
            self.raw_velocity.y = self.jump_impulse;
            self.grounded = false;
        }
    }

    /// Apply damage. Returns true if this hit killed the entity.
    pub fn damage(&mut self, amount: f32) -> bool {
        if !self.alive {
            return false;
        }
        self.life = (self.life - amount).max(0.0);
        if self.life <= 0.0 {
            self.alive = false;
            return true;
        }
        false
    }

    /// Restore full life and place the body at `position` at rest.
    pub fn revive_at(&mut self, position: Vec2) {
        self.position = position;
        self.velocity = Vec2::ZERO;
        self.raw_velocity = Vec2::ZERO;
        self.life = self.max_life;
        self.alive = true;
        self.running = false;
        self.grounded = false;
    }
}

/// Projectile bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectileState {
    /// Wall bounces left before the projectile dies.
    pub bounces_left: u32,
    /// Ticks lived so far.
    pub age: u32,
    /// Ticks the projectile may live.
    pub lifetime: u32,
}

/// Behaviour attached to a body.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Player,
    Npc(NpcBrain),
    Projectile(ProjectileState),
}

impl EntityKind {
    pub fn archetype(&self) -> Archetype {
        match self {
            EntityKind::Player => Archetype::Player,
            EntityKind::Npc(_) => Archetype::Npc,
            EntityKind::Projectile(_) => Archetype::Projectile,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub body: Body,
    pub kind: EntityKind,
}

impl Entity {
    pub fn archetype(&self) -> Archetype {
        self.kind.archetype()
    }

    pub fn is_npc(&self) -> bool {
        matches!(self.kind, EntityKind::Npc(_))
    }
}

/// Active non-player entities.
///
/// Entities are never removed mid-tick; dead ones are dropped by
/// [`EntityArena::compact`] at the end of the tick.
#[derive(Debug, Clone, Default)]
pub struct EntityArena {
    entities: Vec<Entity>,
    next_id: u32,
}

impl EntityArena {
    /// Arena whose ids start after `reserved` (used for the player).
    pub fn with_reserved_ids(reserved: u32) -> Self {
        Self {
            entities: Vec::new(),
            next_id: reserved,
        }
    }

    pub fn spawn(&mut self, body: Body, kind: EntityKind) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.push(Entity { id, body, kind });
        id
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn as_mut_slice(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    /// Living NPC count.
    pub fn npc_count(&self) -> usize {
        self.entities
            .iter()
            .filter(|entity| entity.is_npc() && entity.body.alive)
            .count()
    }

    /// Drop dead entities, preserving the order of the rest. Returns how many
    /// were removed.
    pub fn compact(&mut self) -> usize {
        let before = self.entities.len();
        self.entities.retain(|entity| entity.body.alive);
        before - self.entities.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projectile(bounces: u32) -> EntityKind {
        EntityKind::Projectile(ProjectileState {
            bounces_left: bounces,
            age: 0,
            lifetime: 10,
        })
    }

    #[test]
    fn body_uses_archetype_parameters() {
        let body = Body::new(Archetype::Player, Vec2::new(4.0, 2.0));
        assert_eq!(body.size, Vec2::new(1.8, 2.8));
        assert_eq!(body.life, 10.0);
        assert!((body.center().y - 3.4).abs() < 1e-6);
        let aabb = body.aabb();
        assert!((aabb.min.x - 3.1).abs() < 1e-6);
    }

    #[test]
    fn jump_requires_ground() {
        let mut body = Body::new(Archetype::Npc, Vec2::ZERO);
        body.jump();
        assert_eq!(body.raw_velocity.y, 0.0);
        body.grounded = true;
        body.jump();
        assert_eq!(body.raw_velocity.y, 3.0);
    }

    #[test]
    fn damage_kills_at_zero_life() {
        let mut body = Body::new(Archetype::Npc, Vec2::ZERO);
        assert!(!body.damage(1.0));
        assert!(body.alive);
        assert!(body.damage(1.5));
        assert!(!body.alive);
        assert_eq!(body.life, 0.0);
        assert!(!body.damage(1.0));

        body.revive_at(Vec2::new(3.0, 3.0));
        assert!(body.alive);
        assert_eq!(body.life, body.max_life);
    }

    #[test]
    fn compact_removes_only_dead() {
        let mut arena = EntityArena::with_reserved_ids(1);
        let a = arena.spawn(Body::new(Archetype::Projectile, Vec2::ZERO), projectile(1));
        let b = arena.spawn(Body::new(Archetype::Projectile, Vec2::ZERO), projectile(2));
        let c = arena.spawn(Body::new(Archetype::Projectile, Vec2::ZERO), projectile(3));
        assert_eq!(a, EntityId(1));

        for entity in arena.iter_mut() {
            if entity.id == b {
                entity.body.alive = false;
            }
        }
        assert_eq!(arena.compact(), 1);
        let ids: Vec<_> = arena.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![a, c]);
        assert!(arena.get(b).is_none());
    }
}
