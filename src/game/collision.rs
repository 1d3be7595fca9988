use bevy::prelude::*;
use rand::Rng;

use super::effects::{Effects, ExplosionKind, ParticleKind};
use super::entities::{EnemyLife, EntityRegistry, Player};
use super::types::{EntityId, Health, Millis, Score};
use crate::config::tuning::Tuning;

/// Axis-aligned bounding volume in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Touching faces count as overlap.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

/// Player–enemy test: center distance under the hit radius.
pub fn within_hit_radius(a: Vec3, b: Vec3, radius: f32) -> bool {
    a.distance(b) < radius
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BulletHit {
    pub bullet: EntityId,
    pub enemy: EntityId,
    pub point: Vec3,
}

/// Bullet–enemy test over all live pairs. Each bullet and each enemy is
/// claimed by at most one hit per frame; destroying enemies are ignored.
pub fn detect_bullet_hits(registry: &EntityRegistry, tuning: &Tuning) -> Vec<BulletHit> {
    let bullet_half = Vec3::splat(tuning.bullet_radius);
    let mut hits: Vec<BulletHit> = Vec::new();

    for bullet in &registry.bullets {
        let bullet_box = Aabb::from_center(bullet.position, bullet_half);
        let target = registry.active_enemies().find(|enemy| {
            !hits.iter().any(|h| h.enemy == enemy.id)
                && bullet_box.intersects(&Aabb::from_center(enemy.position, enemy.half_extents(tuning)))
        });
        if let Some(enemy) = target {
            hits.push(BulletHit {
                bullet: bullet.id,
                enemy: enemy.id,
                point: bullet.position,
            });
        }
    }
    hits
}

/// Player–enemy test over all active enemies.
pub fn detect_player_hits(player: &Player, registry: &EntityRegistry, tuning: &Tuning) -> Vec<EntityId> {
    registry
        .active_enemies()
        .filter(|enemy| within_hit_radius(player.position, enemy.position, tuning.player_hit_radius))
        .map(|enemy| enemy.id)
        .collect()
}

/// Explosion, debris, shrink start, bullet removal and score for each hit.
pub fn apply_bullet_hits(
    hits: &[BulletHit],
    registry: &mut EntityRegistry,
    effects: &mut Effects,
    score: &mut Score,
    now: Millis,
    rng: &mut impl Rng,
    tuning: &Tuning,
) {
    for hit in hits {
        let Some(enemy) = registry.enemy_mut(hit.enemy) else { continue; };
        if !enemy.is_active() {
            continue;
        }
        enemy.life = EnemyLife::Destroying { since: now };

        effects.spawn_explosion(ExplosionKind::Impact, hit.point, now, tuning);
        effects.spawn_burst(ParticleKind::Debris, hit.point, rng, tuning);
        registry.remove_bullet(hit.bullet);
        *score = score.add(tuning.score_per_hit);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerHitOutcome {
    pub hits: u32,
    /// Health crossed zero during this batch.
    pub depleted: bool,
}

/// Immediate removal (no shrink) of each colliding enemy and its danger zone,
/// with damage to the player. Stops at the hit that depletes health.
pub fn apply_player_hits(
    enemies: &[EntityId],
    registry: &mut EntityRegistry,
    effects: &mut Effects,
    health: &mut Health,
    now: Millis,
    rng: &mut impl Rng,
    tuning: &Tuning,
) -> PlayerHitOutcome {
    let mut outcome = PlayerHitOutcome::default();
    for id in enemies {
        let Some(enemy) = registry.remove_enemy(*id) else { continue; };
        if let Some(zone) = enemy.danger_zone {
            effects.remove_danger_zone(zone);
        }
        effects.spawn_explosion(ExplosionKind::Impact, enemy.position, now, tuning);
        effects.spawn_burst(ParticleKind::Debris, enemy.position, rng, tuning);

        *health = health.sub_clamped(tuning.collision_damage);
        outcome.hits += 1;
        if health.is_depleted() {
            outcome.depleted = true;
            break;
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::EnemyKind;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn aabb_overlap_is_symmetric_and_inclusive() {
        let a = Aabb::from_center(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::from_center(Vec3::new(2.0, 0.0, 0.0), Vec3::ONE);
        let c = Aabb::from_center(Vec3::new(2.1, 0.0, 0.0), Vec3::ONE);
        assert!(a.intersects(&b) && b.intersects(&a));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn player_radius_is_strict() {
        assert!(within_hit_radius(Vec3::ZERO, Vec3::new(1.49, 0.0, 0.0), 1.5));
        assert!(!within_hit_radius(Vec3::ZERO, Vec3::new(1.5, 0.0, 0.0), 1.5));
    }

    #[test]
    fn predicates_differ_for_the_same_geometry() {
        // An alien ship 1.3 units off the player's lane is close enough to hurt
        // the player but a bullet on the player's lane misses it.
        let tuning = Tuning::default();
        let mut reg = EntityRegistry::default();
        let player = Player::spawn(&tuning);
        reg.spawn_enemy(EnemyKind::AlienShip, Vec3::new(1.3, 0.0, 5.0), Vec3::ZERO, 0.05, None);
        reg.spawn_bullet(Vec3::new(0.0, 0.0, 5.0), 0.0, Vec::new());

        assert_eq!(detect_player_hits(&player, &reg, &tuning).len(), 1);
        assert!(detect_bullet_hits(&reg, &tuning).is_empty());
    }

    #[test]
    fn bullet_hit_scores_and_starts_shrink() {
        let tuning = Tuning::default();
        let mut rng = StdRng::seed_from_u64(9);
        let mut reg = EntityRegistry::default();
        let mut effects = Effects::default();
        let mut score = Score::default();

        let enemy = reg.spawn_enemy(EnemyKind::Asteroid, Vec3::new(0.0, 0.0, -3.0), Vec3::ZERO, 0.04, None);
        let bullet = reg.spawn_bullet(Vec3::new(0.2, 0.0, -2.5), 0.0, Vec::new());

        let hits = detect_bullet_hits(&reg, &tuning);
        assert_eq!(hits, vec![BulletHit { bullet, enemy, point: Vec3::new(0.2, 0.0, -2.5) }]);

        apply_bullet_hits(&hits, &mut reg, &mut effects, &mut score, 500.0, &mut rng, &tuning);
        assert_eq!(score, Score(10));
        assert!(reg.bullets.is_empty());
        assert_eq!(reg.enemy(enemy).unwrap().life, EnemyLife::Destroying { since: 500.0 });
        assert_eq!(effects.explosions.len(), 1);
        assert_eq!(effects.particles.len(), 20);

        // A shrinking enemy can't be scored twice.
        reg.spawn_bullet(Vec3::new(0.0, 0.0, -3.0), 0.0, Vec::new());
        assert!(detect_bullet_hits(&reg, &tuning).is_empty());
    }

    #[test]
    fn two_bullets_on_one_enemy_score_once() {
        let tuning = Tuning::default();
        let mut reg = EntityRegistry::default();
        reg.spawn_enemy(EnemyKind::Asteroid, Vec3::ZERO, Vec3::ZERO, 0.04, None);
        reg.spawn_bullet(Vec3::ZERO, 0.0, Vec::new());
        reg.spawn_bullet(Vec3::new(0.0, 0.0, 0.3), 0.0, Vec::new());
        assert_eq!(detect_bullet_hits(&reg, &tuning).len(), 1);
    }

    #[test]
    fn health_drops_in_twenties_and_depletes_on_fifth_hit() {
        let tuning = Tuning::default();
        let mut rng = StdRng::seed_from_u64(4);
        let mut reg = EntityRegistry::default();
        let mut effects = Effects::default();
        let mut health = Health::new(100, 100);

        let mut depletions = 0;
        for expected in [80, 60, 40, 20, 0] {
            let id = reg.spawn_enemy(EnemyKind::AlienShip, Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 0.05, None);
            let outcome =
                apply_player_hits(&[id], &mut reg, &mut effects, &mut health, 0.0, &mut rng, &tuning);
            assert_eq!(health.get(), expected);
            assert!(reg.enemy(id).is_none());
            if outcome.depleted {
                depletions += 1;
                assert_eq!(expected, 0);
            }
        }
        assert_eq!(depletions, 1);
    }

    #[test]
    fn player_hit_removes_attached_danger_zone() {
        let tuning = Tuning::default();
        let mut rng = StdRng::seed_from_u64(4);
        let mut reg = EntityRegistry::default();
        let mut effects = Effects::default();
        let player = Player::spawn(&tuning);
        let mut health = Health::new(100, 100);

        let id = reg.spawn_enemy(EnemyKind::AlienShip, Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO, 0.05, None);
        effects.update_danger_zones(&mut reg, &player, 0.0, &tuning);
        assert_eq!(effects.danger_zones.len(), 1);

        apply_player_hits(&[id], &mut reg, &mut effects, &mut health, 0.0, &mut rng, &tuning);
        assert!(effects.danger_zones.is_empty());
    }

    #[test]
    fn batch_stops_at_depleting_hit() {
        let tuning = Tuning::default();
        let mut rng = StdRng::seed_from_u64(4);
        let mut reg = EntityRegistry::default();
        let mut effects = Effects::default();
        let mut health = Health::new(20, 100);

        let a = reg.spawn_enemy(EnemyKind::AlienShip, Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 0.05, None);
        let b = reg.spawn_enemy(EnemyKind::AlienShip, Vec3::new(0.5, 0.0, 5.0), Vec3::ZERO, 0.05, None);
        let outcome = apply_player_hits(&[a, b], &mut reg, &mut effects, &mut health, 0.0, &mut rng, &tuning);
        assert_eq!(outcome, PlayerHitOutcome { hits: 1, depleted: true });
        assert!(reg.enemy(b).is_some());
    }
}
