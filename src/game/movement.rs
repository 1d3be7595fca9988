use bevy::prelude::*;

use super::entities::{EntityRegistry, Player};
use super::intent::Intent;
use super::types::EntityId;
use crate::config::tuning::Tuning;

/// Shift the player by one step per held direction, clamp to bounds, and ease
/// the bank angle toward the one implied by left/right.
pub fn move_player(player: &mut Player, intent: &Intent, tuning: &Tuning) {
    let step = tuning.player_step;
    if intent.left {
        player.position.x -= step;
    }
    if intent.right {
        player.position.x += step;
    }
    if intent.up {
        player.position.y += step;
    }
    if intent.down {
        player.position.y -= step;
    }

    let bx = tuning.player_bound_x;
    let by = tuning.player_bound_y;
    player.position.x = player.position.x.clamp(-bx, bx);
    player.position.y = player.position.y.clamp(-by, by);

    let target = match (intent.left, intent.right) {
        (true, false) => tuning.bank_angle,
        (false, true) => -tuning.bank_angle,
        _ => 0.0,
    };
    player.bank += (target - player.bank) * tuning.bank_smoothing;

    player.engine_phase += 0.1;
}

/// Advance enemies along the depth axis and spin asteroids. Returns the ids of
/// enemies that flew past the despawn depth; the caller removes them.
pub fn advance_enemies(registry: &mut EntityRegistry, tuning: &Tuning) -> Vec<EntityId> {
    let mut passed = Vec::new();
    for enemy in &mut registry.enemies {
        enemy.position.z += enemy.speed;
        if let Some(spin) = enemy.spin {
            enemy.rotation += Vec3::splat(spin);
        }
        if enemy.position.z > tuning.enemy_despawn_depth {
            passed.push(enemy.id);
        }
    }
    passed
}

/// Advance bullets toward -Z. Returns bullets past the far despawn depth.
pub fn advance_bullets(registry: &mut EntityRegistry, tuning: &Tuning) -> Vec<EntityId> {
    let mut gone = Vec::new();
    for bullet in &mut registry.bullets {
        bullet.position.z -= tuning.bullet_step;
        if bullet.position.z < tuning.bullet_despawn_depth {
            gone.push(bullet.id);
        }
    }
    gone
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::EnemyKind;

    fn intent(left: bool, right: bool, up: bool, down: bool) -> Intent {
        Intent { left, right, up, down, fire: false }
    }

    #[test]
    fn player_stays_in_bounds_for_any_input_sequence() {
        let tuning = Tuning::default();
        let mut player = Player::spawn(&tuning);
        let mut seed = 0x9E37_79B9_u32;
        for _ in 0..5000 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            let i = intent(seed & 1 != 0, seed & 2 != 0, seed & 4 != 0, seed & 8 != 0);
            move_player(&mut player, &i, &tuning);
            assert!((-5.0..=5.0).contains(&player.position.x));
            assert!((-3.0..=3.0).contains(&player.position.y));
            assert_eq!(player.position.z, 5.0);
        }
    }

    #[test]
    fn holding_a_direction_saturates_at_the_bound() {
        let tuning = Tuning::default();
        let mut player = Player::spawn(&tuning);
        for _ in 0..200 {
            move_player(&mut player, &intent(false, true, true, false), &tuning);
        }
        assert_eq!(player.position.x, 5.0);
        assert_eq!(player.position.y, 3.0);
    }

    #[test]
    fn bank_eases_toward_target_without_snapping() {
        let tuning = Tuning::default();
        let mut player = Player::spawn(&tuning);
        move_player(&mut player, &intent(true, false, false, false), &tuning);
        assert!((player.bank - 0.02).abs() < 1e-6);

        for _ in 0..200 {
            move_player(&mut player, &intent(true, false, false, false), &tuning);
        }
        assert!((player.bank - 0.2).abs() < 1e-4);

        // Both held cancels out.
        let before = player.bank;
        move_player(&mut player, &intent(true, true, false, false), &tuning);
        assert!((player.bank - before * 0.9).abs() < 1e-6);
    }

    #[test]
    fn enemies_drift_spin_and_report_when_past() {
        let tuning = Tuning::default();
        let mut reg = EntityRegistry::default();
        let rock = reg.spawn_enemy(EnemyKind::Asteroid, Vec3::new(0.0, 0.0, 19.99), Vec3::ZERO, 0.04, Some(0.01));
        let ship = reg.spawn_enemy(EnemyKind::AlienShip, Vec3::new(0.0, 0.0, 0.0), Vec3::ZERO, 0.05, None);

        let passed = advance_enemies(&mut reg, &tuning);
        assert_eq!(passed, vec![rock]);
        assert!((reg.enemy(rock).unwrap().rotation - Vec3::splat(0.01)).length() < 1e-6);
        assert_eq!(reg.enemy(ship).unwrap().rotation, Vec3::ZERO);
        assert!((reg.enemy(ship).unwrap().position.z - 0.05).abs() < 1e-6);
    }

    #[test]
    fn bullets_fly_forward_and_expire() {
        let tuning = Tuning::default();
        let mut reg = EntityRegistry::default();
        let id = reg.spawn_bullet(Vec3::new(0.0, 0.0, 6.0), 0.0, Vec::new());
        let mut frames = 0;
        loop {
            frames += 1;
            if advance_bullets(&mut reg, &tuning).contains(&id) {
                break;
            }
        }
        // 6 -> below -20 at 0.3 per frame
        assert_eq!(frames, 87);
    }
}
