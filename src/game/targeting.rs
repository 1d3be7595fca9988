use bevy::prelude::*;

use super::collision::Aabb;
use super::effects::Effects;
use super::entities::{EntityRegistry, Player};
use super::types::EntityId;
use crate::config::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Entry distance into `aabb` (0 if the origin is inside), slab method.
    pub fn intersect(&self, aabb: &Aabb) -> Option<f32> {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;
        for axis in 0..3 {
            let o = self.origin[axis];
            let d = self.direction[axis];
            let (lo, hi) = (aabb.min[axis], aabb.max[axis]);
            if d.abs() < f32::EPSILON {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let (t0, t1) = {
                let a = (lo - o) * inv;
                let b = (hi - o) * inv;
                if a < b { (a, b) } else { (b, a) }
            };
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }
        if t_max < 0.0 {
            return None;
        }
        Some(t_min.max(0.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    Enemy(EntityId),
    /// Any other renderable content (bullets, explosions).
    Scenery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Red,
    Green,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimIndicator {
    pub opacity: f32,
    pub signal: Option<Signal>,
    pub distance: Option<f32>,
}

impl Default for AimIndicator {
    fn default() -> Self {
        Self {
            opacity: 0.0,
            signal: None,
            distance: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trajectory {
    pub start: Vec3,
    pub end: Vec3,
    pub target: Option<EntityId>,
    pub signal: Signal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetingReadout {
    pub aim: AimIndicator,
    pub trajectory: Trajectory,
}

impl TargetingReadout {
    pub fn idle(player: &Player, tuning: &Tuning) -> Self {
        let start = player.position + Vec3::NEG_Z * tuning.trajectory_start_offset;
        Self {
            aim: AimIndicator::default(),
            trajectory: Trajectory {
                start,
                end: start + Vec3::NEG_Z * tuning.trajectory_range,
                target: None,
                signal: Signal::Green,
            },
        }
    }
}

/// Nearest hit along the player's forward ray over every renderable.
pub fn cast_aim(player: &Player, registry: &EntityRegistry, effects: &Effects, tuning: &Tuning) -> AimIndicator {
    let ray = Ray::new(player.position, player.forward());

    let enemies = registry.active_enemies().map(|e| {
        (HitKind::Enemy(e.id), Aabb::from_center(e.position, e.half_extents(tuning)))
    });
    let bullets = registry
        .bullets
        .iter()
        .map(|b| (HitKind::Scenery, Aabb::from_center(b.position, Vec3::splat(tuning.bullet_radius))));
    let explosions = effects.explosions.iter().map(|e| {
        (HitKind::Scenery, Aabb::from_center(e.position, Vec3::splat(e.radius * e.scale)))
    });

    let nearest = enemies
        .chain(bullets)
        .chain(explosions)
        .filter_map(|(kind, aabb)| ray.intersect(&aabb).map(|t| (kind, t)))
        .min_by(|a, b| a.1.total_cmp(&b.1));

    match nearest {
        Some((kind, distance)) => AimIndicator {
            opacity: (1.0 - distance / tuning.aim_fade_distance).max(tuning.aim_min_opacity),
            signal: Some(match kind {
                HitKind::Enemy(_) => Signal::Red,
                HitKind::Scenery => Signal::Green,
            }),
            distance: Some(distance),
        },
        None => AimIndicator::default(),
    }
}

/// Firing-axis projection clipped to the nearest enemy within range.
pub fn project_trajectory(player: &Player, registry: &EntityRegistry, tuning: &Tuning) -> Trajectory {
    let start = player.position + Vec3::NEG_Z * tuning.trajectory_start_offset;
    let ray = Ray::new(start, Vec3::NEG_Z);

    let nearest = registry
        .active_enemies()
        .filter_map(|e| {
            ray.intersect(&Aabb::from_center(e.position, e.half_extents(tuning)))
                .map(|t| (e.id, t))
        })
        .filter(|(_, t)| *t <= tuning.trajectory_range)
        .min_by(|a, b| a.1.total_cmp(&b.1));

    match nearest {
        Some((id, t)) => Trajectory {
            start,
            end: ray.at(t),
            target: Some(id),
            signal: Signal::Red,
        },
        None => Trajectory {
            start,
            end: ray.at(tuning.trajectory_range),
            target: None,
            signal: Signal::Green,
        },
    }
}

pub fn update_targeting(
    player: &Player,
    registry: &EntityRegistry,
    effects: &Effects,
    tuning: &Tuning,
) -> TargetingReadout {
    TargetingReadout {
        aim: cast_aim(player, registry, effects, tuning),
        trajectory: project_trajectory(player, registry, tuning),
    }
}
