//! Time-boxed visual effects and their decay laws.
//!
//! Each effect kind lives in its own typed collection and is advanced against
//! the current wall-clock time once per frame:
//! - explosions grow linearly and fade out over a fixed window,
//! - destroying enemies shrink to nothing and are then detached from the registry,
//! - free particles integrate their velocity and lose `decay` life per frame,
//! - danger zones follow enemies ahead of the player whose lane overlaps its own.

use bevy::prelude::*;
use rand::Rng;

use super::entities::{EnemyLife, EntityRegistry, Player};
use super::types::{EntityId, IdAllocator, Millis};
use crate::config::tuning::Tuning;

/// Slack, in frames, when turning a decimal decay rate into a frame count.
/// Absorbs the binary representation error of rates like 0.02.
const LIFETIME_SLACK: f64 = 1e-4;

/// Frames until a particle with `life = 1.0` losing `decay` per frame is spent.
pub fn lifetime_frames(decay: f32) -> u32 {
    if decay <= 0.0 {
        return u32::MAX;
    }
    let frames = (1.0 / decay as f64 - LIFETIME_SLACK).ceil();
    frames.clamp(1.0, u32::MAX as f64) as u32
}

// ── Particles ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    Thrust,
    Debris,
    FinalBurst,
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub id: EntityId,
    pub kind: ParticleKind,
    pub position: Vec3,
    pub velocity: Vec3,
    pub life: f32,
    pub decay: f32,
    frames_left: u32,
}

impl Particle {
    pub fn new(id: EntityId, kind: ParticleKind, position: Vec3, velocity: Vec3, decay: f32) -> Self {
        Self {
            id,
            kind,
            position,
            velocity,
            life: 1.0,
            decay,
            frames_left: lifetime_frames(decay),
        }
    }

    /// Advance one frame. Returns `false` once the particle is spent.
    pub fn step(&mut self) -> bool {
        self.position += self.velocity;
        self.life -= self.decay;
        self.frames_left = self.frames_left.saturating_sub(1);
        self.is_alive()
    }

    pub fn is_alive(&self) -> bool {
        self.frames_left > 0
    }

    pub fn opacity(&self) -> f32 {
        self.life.clamp(0.0, 1.0)
    }
}

// ── Explosions ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExplosionKind {
    Impact,
    /// The large detonation at the player's last position.
    Final,
}

#[derive(Debug, Clone)]
pub struct Explosion {
    pub id: EntityId,
    pub kind: ExplosionKind,
    pub position: Vec3,
    pub radius: f32,
    pub started: Millis,
    pub scale_speed: f32,
    pub scale: f32,
    pub opacity: f32,
}

impl Explosion {
    /// Returns `false` once fully faded.
    fn advance(&mut self, now: Millis, fade_ms: Millis) -> bool {
        let elapsed = (now - self.started).max(0.0);
        self.scale = 1.0 + elapsed as f32 * self.scale_speed;
        self.opacity = (1.0 - elapsed / fade_ms).max(0.0) as f32;
        self.opacity > 0.0
    }
}

// ── Bullet trail ────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct BulletTrail {
    pub opacity: f32,
}

impl Default for BulletTrail {
    fn default() -> Self {
        Self { opacity: 0.6 }
    }
}

// ── Danger zones ────────────────────────────────────────────────────

/// Indicator on the lane of an enemy that is headed at the player.
#[derive(Debug, Clone)]
pub struct DangerZone {
    pub id: EntityId,
    /// Midpoint between the enemy and the player on the enemy's lane.
    pub position: Vec3,
    pub length: f32,
    pub opacity: f32,
}

// ── Manager ─────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Effects {
    ids: IdAllocator,
    pub explosions: Vec<Explosion>,
    pub particles: Vec<Particle>,
    pub danger_zones: Vec<DangerZone>,
}

impl Effects {
    pub fn spawn_explosion(
        &mut self,
        kind: ExplosionKind,
        position: Vec3,
        now: Millis,
        tuning: &Tuning,
    ) -> EntityId {
        let id = self.ids.allocate();
        let (radius, scale_speed) = match kind {
            ExplosionKind::Impact => (tuning.explosion_radius, tuning.explosion_scale_speed),
            ExplosionKind::Final => (
                tuning.final_explosion_radius,
                tuning.final_explosion_scale_speed,
            ),
        };
        self.explosions.push(Explosion {
            id,
            kind,
            position,
            radius,
            started: now,
            scale_speed,
            scale: 1.0,
            opacity: 1.0,
        });
        id
    }

    /// Isotropic batch of free particles (debris or final detonation).
    pub fn spawn_burst(
        &mut self,
        kind: ParticleKind,
        position: Vec3,
        rng: &mut impl Rng,
        tuning: &Tuning,
    ) {
        let s = tuning.burst_speed;
        for _ in 0..tuning.burst_particle_count {
            let velocity = Vec3::new(
                uniform(rng, -s, s),
                uniform(rng, -s, s),
                uniform(rng, -s, s),
            );
            let decay = uniform(rng, tuning.burst_decay_min, tuning.burst_decay_max);
            let particle = Particle::new(self.ids.allocate(), kind, position, velocity, decay);
            self.particles.push(particle);
        }
    }

    /// Thrust particles for a new bullet, relative to the bullet and pushed
    /// backward along the firing axis.
    pub fn thrust_batch(&mut self, rng: &mut impl Rng, tuning: &Tuning) -> Vec<Particle> {
        (0..tuning.thrust_particle_count)
            .map(|_| {
                let speed = uniform(rng, tuning.thrust_speed_min, tuning.thrust_speed_max);
                let decay = uniform(rng, tuning.thrust_decay_min, tuning.thrust_decay_max);
                Particle::new(
                    self.ids.allocate(),
                    ParticleKind::Thrust,
                    Vec3::new(0.0, 0.0, -0.5),
                    Vec3::new(0.0, 0.0, speed),
                    decay,
                )
            })
            .collect()
    }

    pub fn advance_explosions(&mut self, now: Millis, tuning: &Tuning) {
        let fade = tuning.explosion_fade_ms;
        self.explosions.retain_mut(|e| e.advance(now, fade));
    }

    pub fn advance_particles(&mut self) {
        self.particles.retain_mut(Particle::step);
    }

    /// Shrink destroying enemies; detach them (and their danger zones) once gone.
    pub fn advance_shrinks(
        &mut self,
        registry: &mut EntityRegistry,
        now: Millis,
        tuning: &Tuning,
    ) -> Vec<EntityId> {
        let mut finished = Vec::new();
        for enemy in &mut registry.enemies {
            if let EnemyLife::Destroying { since } = enemy.life {
                let scale = (1.0 - (now - since) / tuning.shrink_ms).max(0.0) as f32;
                enemy.scale = scale;
                if scale <= 0.0 {
                    finished.push(enemy.id);
                }
            }
        }
        for id in &finished {
            if let Some(enemy) = registry.remove_enemy(*id) {
                if let Some(zone) = enemy.danger_zone {
                    self.remove_danger_zone(zone);
                }
                debug!("enemy {id:?} finished shrinking");
            }
        }
        finished
    }

    /// Fade bullet trails and decay the thrust particles attached to each bullet.
    pub fn advance_bullet_attachments(
        &mut self,
        registry: &mut EntityRegistry,
        now: Millis,
        tuning: &Tuning,
    ) {
        for bullet in &mut registry.bullets {
            let age = (now - bullet.fired_at).max(0.0);
            let fade = (1.0 - age / tuning.trail_fade_ms).max(0.0) as f32;
            bullet.trail.opacity = fade * tuning.trail_max_opacity;
            bullet.thrust.retain_mut(Particle::step);
        }
    }

    /// Attach, update or drop danger zones for every enemy.
    pub fn update_danger_zones(
        &mut self,
        registry: &mut EntityRegistry,
        player: &Player,
        now: Millis,
        tuning: &Tuning,
    ) {
        let span = (tuning.player_depth - tuning.spawn_depth).max(f32::EPSILON);
        let (lo, hi) = (tuning.danger_opacity_min, tuning.danger_opacity_max);

        for enemy in &mut registry.enemies {
            let divergence = (enemy.position.x - player.position.x).abs();
            let distance = player.position.z - enemy.position.z;
            // Out of lane, or already past the player.
            if divergence > tuning.danger_lane_width || distance <= 0.0 {
                if let Some(zone) = enemy.danger_zone.take() {
                    self.remove_danger_zone(zone);
                }
                continue;
            }

            let existing = enemy.danger_zone;
            let zone_id = match existing {
                Some(id) => id,
                None if enemy.is_active() => {
                    let id = self.ids.allocate();
                    self.danger_zones.push(DangerZone {
                        id,
                        position: enemy.position,
                        length: 0.0,
                        opacity: lo,
                    });
                    enemy.danger_zone = Some(id);
                    id
                }
                None => continue,
            };

            let mut opacity = (hi - (hi - lo) * distance / span).clamp(lo, hi);
            if distance < tuning.danger_pulse_distance {
                opacity += tuning.danger_pulse_amount * ((now * 0.01).sin().abs() as f32);
            }

            if let Some(zone) = self.danger_zones.iter_mut().find(|z| z.id == zone_id) {
                zone.position = Vec3::new(
                    enemy.position.x,
                    player.position.y,
                    (enemy.position.z + player.position.z) * 0.5,
                );
                zone.length = distance;
                zone.opacity = opacity;
            }
        }
    }

    /// Remove a danger zone. Unknown ids are a no-op.
    pub fn remove_danger_zone(&mut self, id: EntityId) -> bool {
        let before = self.danger_zones.len();
        self.danger_zones.retain(|z| z.id != id);
        self.danger_zones.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.explosions.is_empty() && self.particles.is_empty() && self.danger_zones.is_empty()
    }
}

/// Uniform sample in `[lo, hi)`; degenerate ranges return `lo`.
pub fn uniform(rng: &mut impl Rng, lo: f32, hi: f32) -> f32 {
    if hi > lo { rng.gen_range(lo..hi) } else { lo }
}
