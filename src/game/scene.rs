//! Flat description of what should be on screen for the current session.
//!
//! The renderer diffs successive snapshots by `NodeKey`; nothing here knows
//! about meshes or materials beyond a coarse `Shape` and a color.

use bevy::prelude::*;

use super::effects::{ExplosionKind, ParticleKind};
use super::entities::EnemyKind;
use super::session::Session;
use super::targeting::Signal;
use super::types::EntityId;

pub const RED: u32 = 0xff0000;
pub const GREEN: u32 = 0x00ff00;
const PLAYER_COLOR: u32 = 0x3399ff;
const ENGINE_COLOR: u32 = 0x00ccff;
const ASTEROID_COLOR: u32 = 0x8b7355;
const ALIEN_COLOR: u32 = 0x66ff66;
const BULLET_COLOR: u32 = 0xffff00;
const TRAIL_COLOR: u32 = 0xffaa00;
const THRUST_COLOR: u32 = 0x00aaff;
const DEBRIS_COLOR: u32 = 0xcccccc;
const FINAL_BURST_COLOR: u32 = 0xff6600;
const EXPLOSION_COLOR: u32 = 0xff6600;
const DANGER_COLOR: u32 = 0xff0000;

/// Distance ahead of the player at which the aim reticle floats.
const AIM_DEPTH: f32 = 15.0;
const TRAIL_OFFSET: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKey {
    Player,
    Engine,
    Enemy(EntityId),
    Bullet(EntityId),
    Trail(EntityId),
    Particle(EntityId),
    Explosion(EntityId),
    DangerZone(EntityId),
    AimIndicator,
    Trajectory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Ship,
    Engine,
    Asteroid,
    AlienShip,
    Bullet,
    Trail,
    Particle,
    Explosion,
    DangerZone,
    Reticle,
    Beam,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Visual {
    pub key: NodeKey,
    pub shape: Shape,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    /// 0xRRGGBB
    pub color: u32,
    pub opacity: f32,
    pub emissive: f32,
}

impl Visual {
    fn new(key: NodeKey, shape: Shape, translation: Vec3, color: u32) -> Self {
        Self {
            key,
            shape,
            translation,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            color,
            opacity: 1.0,
            emissive: 0.0,
        }
    }
}

/// Split a packed 0xRRGGBB color into linear-ish float channels.
pub fn rgb(color: u32) -> [f32; 3] {
    let channel = |shift: u32| ((color >> shift) & 0xff) as f32 / 255.0;
    [channel(16), channel(8), channel(0)]
}

fn signal_color(signal: Signal) -> u32 {
    match signal {
        Signal::Red => RED,
        Signal::Green => GREEN,
    }
}

impl Session {
    pub fn visuals(&self) -> Vec<Visual> {
        let mut out = Vec::new();
        let player = &self.player;

        // Player and engine glow
        if player.visible {
            let mut ship = Visual::new(NodeKey::Player, Shape::Ship, player.position, PLAYER_COLOR);
            ship.rotation = player.rotation();
            out.push(ship);

            let pulse = player.engine_pulse();
            let mut engine = Visual::new(
                NodeKey::Engine,
                Shape::Engine,
                player.position + player.rotation() * Vec3::new(0.0, 0.0, 0.6),
                ENGINE_COLOR,
            );
            engine.rotation = player.rotation();
            engine.scale = Vec3::new(1.0, 1.0, 0.8 + pulse * 0.4);
            engine.emissive = pulse;
            out.push(engine);
        }

        for enemy in &self.registry.enemies {
            let (shape, color) = match enemy.kind {
                EnemyKind::Asteroid => (Shape::Asteroid, ASTEROID_COLOR),
                EnemyKind::AlienShip => (Shape::AlienShip, ALIEN_COLOR),
            };
            let mut v = Visual::new(NodeKey::Enemy(enemy.id), shape, enemy.position, color);
            v.rotation = enemy.quat();
            v.scale = Vec3::splat(enemy.scale);
            out.push(v);
        }

        for bullet in &self.registry.bullets {
            let mut v = Visual::new(NodeKey::Bullet(bullet.id), Shape::Bullet, bullet.position, BULLET_COLOR);
            v.emissive = 1.0;
            out.push(v);

            let mut trail = Visual::new(
                NodeKey::Trail(bullet.id),
                Shape::Trail,
                bullet.position + Vec3::Z * TRAIL_OFFSET,
                TRAIL_COLOR,
            );
            trail.opacity = bullet.trail.opacity;
            out.push(trail);

            for p in &bullet.thrust {
                let mut v = Visual::new(
                    NodeKey::Particle(p.id),
                    Shape::Particle,
                    bullet.position + p.position,
                    THRUST_COLOR,
                );
                v.opacity = p.opacity();
                out.push(v);
            }
        }

        for p in &self.effects.particles {
            let color = match p.kind {
                ParticleKind::FinalBurst => FINAL_BURST_COLOR,
                ParticleKind::Debris | ParticleKind::Thrust => DEBRIS_COLOR,
            };
            let mut v = Visual::new(NodeKey::Particle(p.id), Shape::Particle, p.position, color);
            v.opacity = p.opacity();
            out.push(v);
        }

        for e in &self.effects.explosions {
            let mut v = Visual::new(NodeKey::Explosion(e.id), Shape::Explosion, e.position, EXPLOSION_COLOR);
            v.scale = Vec3::splat(e.radius * e.scale);
            v.opacity = e.opacity;
            v.emissive = match e.kind {
                ExplosionKind::Impact => 1.0,
                ExplosionKind::Final => 2.0,
            };
            out.push(v);
        }

        for z in &self.effects.danger_zones {
            let mut v = Visual::new(NodeKey::DangerZone(z.id), Shape::DangerZone, z.position, DANGER_COLOR);
            v.scale = Vec3::new(1.0, 1.0, z.length.max(f32::EPSILON));
            v.opacity = z.opacity;
            out.push(v);
        }

        // Targeting overlays
        if player.visible {
            let aim = &self.targeting.aim;
            let phase = player.engine_phase;
            let pulse = 1.0 + (phase * 2.0).sin() * 0.2;
            let wobble = phase.sin() * 0.1;
            let mut reticle = Visual::new(
                NodeKey::AimIndicator,
                Shape::Reticle,
                player.position + Vec3::new(wobble, 0.0, -AIM_DEPTH),
                aim.signal.map(signal_color).unwrap_or(GREEN),
            );
            reticle.scale = Vec3::splat(pulse);
            reticle.opacity = aim.opacity;
            reticle.emissive = 0.5;
            out.push(reticle);

            let t = &self.targeting.trajectory;
            let length = t.start.distance(t.end);
            let mut beam = Visual::new(
                NodeKey::Trajectory,
                Shape::Beam,
                (t.start + t.end) * 0.5,
                signal_color(t.signal),
            );
            beam.scale = Vec3::new(1.0, 1.0, length.max(f32::EPSILON));
            beam.opacity = 0.5;
            out.push(beam);
        }

        out
    }
}
