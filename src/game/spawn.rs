use bevy::prelude::*;
use rand::Rng;

use super::effects::uniform;
use super::entities::{EnemyKind, EntityRegistry};
use super::types::{EntityId, Millis};
use crate::config::tuning::Tuning;

/// Time-gated, weighted-random enemy creation.
#[derive(Debug, Clone)]
pub struct SpawnScheduler {
    last_spawn: Millis,
}

/// Parameters for one enemy, drawn before it is placed in the registry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyRoll {
    pub kind: EnemyKind,
    pub speed: f32,
    pub spin: Option<f32>,
    pub lateral: f32,
}

impl SpawnScheduler {
    /// The first enemy appears one full interval after `started`.
    pub fn new(started: Millis) -> Self {
        Self { last_spawn: started }
    }

    pub fn last_spawn(&self) -> Millis {
        self.last_spawn
    }

    /// Spawn at most one enemy if the interval has elapsed.
    pub fn update(
        &mut self,
        now: Millis,
        registry: &mut EntityRegistry,
        rng: &mut impl Rng,
        tuning: &Tuning,
    ) -> Option<EntityId> {
        if now - self.last_spawn < tuning.spawn_interval_ms {
            return None;
        }
        self.last_spawn = now;

        let roll = roll_enemy(rng, tuning);
        let position = Vec3::new(roll.lateral, 0.0, tuning.spawn_depth);
        let rotation = match roll.kind {
            EnemyKind::Asteroid => Vec3::new(
                uniform(rng, 0.0, std::f32::consts::PI),
                uniform(rng, 0.0, std::f32::consts::PI),
                uniform(rng, 0.0, std::f32::consts::PI),
            ),
            EnemyKind::AlienShip => Vec3::new(0.0, std::f32::consts::PI, 0.0),
        };
        Some(registry.spawn_enemy(roll.kind, position, rotation, roll.speed, roll.spin))
    }
}

/// Weighted draw: asteroid with `asteroid_probability`, otherwise an alien ship.
pub fn roll_enemy(rng: &mut impl Rng, tuning: &Tuning) -> EnemyRoll {
    let r = tuning.spawn_lateral_range;
    if rng.gen_bool(tuning.asteroid_probability.clamp(0.0, 1.0)) {
        EnemyRoll {
            kind: EnemyKind::Asteroid,
            speed: uniform(rng, tuning.asteroid_speed_min, tuning.asteroid_speed_max),
            spin: Some(uniform(rng, -tuning.asteroid_spin_max, tuning.asteroid_spin_max)),
            lateral: uniform(rng, -r, r),
        }
    } else {
        EnemyRoll {
            kind: EnemyKind::AlienShip,
            speed: tuning.alien_speed,
            spin: None,
            lateral: uniform(rng, -r, r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn spawns_floor_t_over_interval_enemies() {
        let tuning = Tuning::default();
        let mut rng = StdRng::seed_from_u64(11);
        for total in [0.0, 1999.0, 2000.0, 5000.0, 9999.0, 10_000.0] {
            let mut reg = EntityRegistry::default();
            let mut sched = SpawnScheduler::new(0.0);
            let mut count = 0;
            let mut t = 0.0;
            while t <= total {
                if sched.update(t, &mut reg, &mut rng, &tuning).is_some() {
                    count += 1;
                }
                t += 1.0;
            }
            assert_eq!(count, (total / 2000.0).floor() as usize, "T={total}");
            assert_eq!(reg.enemies.len(), count);
        }
    }

    #[test]
    fn kind_ratio_converges_to_sixty_forty() {
        let tuning = Tuning::default();
        let mut rng = StdRng::seed_from_u64(2024);
        let trials = 10_000;
        let asteroids = (0..trials)
            .filter(|_| roll_enemy(&mut rng, &tuning).kind == EnemyKind::Asteroid)
            .count();
        let ratio = asteroids as f64 / trials as f64;
        assert!((ratio - 0.6).abs() < 0.02, "ratio {ratio}");
    }

    #[test]
    fn rolls_respect_kind_parameters() {
        let tuning = Tuning::default();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..1000 {
            let roll = roll_enemy(&mut rng, &tuning);
            assert!((-5.0..5.0).contains(&roll.lateral));
            match roll.kind {
                EnemyKind::Asteroid => {
                    assert!((0.03..0.05).contains(&roll.speed));
                    let spin = roll.spin.expect("asteroids spin");
                    assert!((-0.01..0.01).contains(&spin));
                }
                EnemyKind::AlienShip => {
                    assert_eq!(roll.speed, 0.05);
                    assert!(roll.spin.is_none());
                }
            }
        }
    }

    #[test]
    fn spawned_enemy_starts_far_away() {
        let tuning = Tuning::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut reg = EntityRegistry::default();
        let mut sched = SpawnScheduler::new(0.0);
        let id = sched.update(2000.0, &mut reg, &mut rng, &tuning).expect("due");
        assert_eq!(reg.enemy(id).unwrap().position.z, -10.0);
        assert_eq!(sched.last_spawn(), 2000.0);
        assert!(sched.update(3999.0, &mut reg, &mut rng, &tuning).is_none());
    }
}
