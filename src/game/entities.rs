use bevy::prelude::*;

use super::effects::{BulletTrail, Particle};
use super::types::{EntityId, IdAllocator, Millis};
use crate::config::tuning::Tuning;

// ── Player ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Player {
    pub position: Vec3,
    /// Current bank angle around the depth axis (smoothed toward its target).
    pub bank: f32,
    pub visible: bool,
    /// Phase accumulator for the engine glow pulse.
    pub engine_phase: f32,
}

impl Player {
    pub fn spawn(tuning: &Tuning) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, tuning.player_depth),
            bank: 0.0,
            visible: true,
            engine_phase: 0.0,
        }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_z(self.bank)
    }

    /// Forward-facing direction in world space (ships fly toward -Z).
    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }

    pub fn engine_pulse(&self) -> f32 {
        (self.engine_phase * 5.0).sin().abs() * 2.0
    }
}

// ── Enemies ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Asteroid,
    AlienShip,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnemyLife {
    Active,
    /// Hit by a bullet; shrinking until removed.
    Destroying { since: Millis },
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: EntityId,
    pub kind: EnemyKind,
    pub position: Vec3,
    /// Euler angles (x, y, z).
    pub rotation: Vec3,
    pub speed: f32,
    pub spin: Option<f32>,
    pub danger_zone: Option<EntityId>,
    pub life: EnemyLife,
    pub scale: f32,
}

impl Enemy {
    pub fn is_active(&self) -> bool {
        self.life == EnemyLife::Active
    }

    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// World-space half extents of the rotated, scaled bounding volume.
    pub fn half_extents(&self, tuning: &Tuning) -> Vec3 {
        let local = match self.kind {
            EnemyKind::Asteroid => Vec3::from_array(tuning.asteroid_half_extents),
            EnemyKind::AlienShip => Vec3::from_array(tuning.alien_half_extents),
        } * self.scale;
        let m = Mat3::from_quat(self.quat());
        Mat3::from_cols(m.x_axis.abs(), m.y_axis.abs(), m.z_axis.abs()) * local
    }
}

// ── Bullets ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Bullet {
    pub id: EntityId,
    pub position: Vec3,
    pub fired_at: Millis,
    pub trail: BulletTrail,
    /// Thrust particles, positioned relative to the bullet.
    pub thrust: Vec<Particle>,
}

// ── Registry ────────────────────────────────────────────────────────

/// Live enemies and bullets of one session.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    ids: IdAllocator,
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
}

impl EntityRegistry {
    pub fn spawn_enemy(
        &mut self,
        kind: EnemyKind,
        position: Vec3,
        rotation: Vec3,
        speed: f32,
        spin: Option<f32>,
    ) -> EntityId {
        let id = self.ids.allocate();
        self.enemies.push(Enemy {
            id,
            kind,
            position,
            rotation,
            speed,
            spin,
            danger_zone: None,
            life: EnemyLife::Active,
            scale: 1.0,
        });
        debug!("spawned {kind:?} {id:?} at x={:.2}", position.x);
        id
    }

    pub fn spawn_bullet(&mut self, position: Vec3, now: Millis, thrust: Vec<Particle>) -> EntityId {
        let id = self.ids.allocate();
        self.bullets.push(Bullet {
            id,
            position,
            fired_at: now,
            trail: BulletTrail::default(),
            thrust,
        });
        id
    }

    pub fn enemy(&self, id: EntityId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn enemy_mut(&mut self, id: EntityId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    pub fn active_enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|e| e.is_active())
    }

    /// Remove an enemy. Removing an unknown id is a no-op.
    pub fn remove_enemy(&mut self, id: EntityId) -> Option<Enemy> {
        let index = self.enemies.iter().position(|e| e.id == id)?;
        Some(self.enemies.remove(index))
    }

    /// Remove a bullet. Removing an unknown id is a no-op.
    pub fn remove_bullet(&mut self, id: EntityId) -> Option<Bullet> {
        let index = self.bullets.iter().position(|b| b.id == id)?;
        Some(self.bullets.remove(index))
    }
}
