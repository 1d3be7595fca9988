use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// All tunable game parameters, loaded from tuning.ron.
///
/// Distances are world units, durations are milliseconds, per-frame rates are
/// applied once per rendered frame.
#[derive(Debug, Clone, Resource, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // ── Player ──────────────────────────────────────────────────────
    pub player_step: f32,
    pub player_bound_x: f32,
    pub player_bound_y: f32,
    pub player_depth: f32,
    pub bank_angle: f32,
    pub bank_smoothing: f32,

    // ── Weapons ─────────────────────────────────────────────────────
    pub fire_cooldown_ms: f64,
    pub bullet_step: f32,
    /// Depth offset from the player at which a bullet appears.
    pub bullet_spawn_offset_z: f32,
    pub bullet_despawn_depth: f32,
    pub bullet_radius: f32,
    pub trail_fade_ms: f64,
    pub trail_max_opacity: f32,
    pub thrust_particle_count: usize,
    pub thrust_decay_min: f32,
    pub thrust_decay_max: f32,
    pub thrust_speed_min: f32,
    pub thrust_speed_max: f32,

    // ── Enemies ─────────────────────────────────────────────────────
    pub spawn_interval_ms: f64,
    pub asteroid_probability: f64,
    pub asteroid_speed_min: f32,
    pub asteroid_speed_max: f32,
    pub asteroid_spin_max: f32,
    pub alien_speed: f32,
    pub spawn_lateral_range: f32,
    pub spawn_depth: f32,
    pub enemy_despawn_depth: f32,
    pub asteroid_half_extents: [f32; 3],
    pub alien_half_extents: [f32; 3],

    // ── Combat ──────────────────────────────────────────────────────
    pub player_hit_radius: f32,
    pub collision_damage: u32,
    pub score_per_hit: u32,
    pub max_health: u32,

    // ── Effects ─────────────────────────────────────────────────────
    pub explosion_fade_ms: f64,
    pub explosion_scale_speed: f32,
    pub explosion_radius: f32,
    pub shrink_ms: f64,
    pub burst_particle_count: usize,
    pub burst_speed: f32,
    pub burst_decay_min: f32,
    pub burst_decay_max: f32,
    pub danger_lane_width: f32,
    pub danger_opacity_min: f32,
    pub danger_opacity_max: f32,
    pub danger_pulse_distance: f32,
    pub danger_pulse_amount: f32,

    // ── Targeting ───────────────────────────────────────────────────
    pub aim_fade_distance: f32,
    pub aim_min_opacity: f32,
    pub trajectory_start_offset: f32,
    pub trajectory_range: f32,

    // ── Game over ───────────────────────────────────────────────────
    pub final_explosion_radius: f32,
    pub final_explosion_scale_speed: f32,
    pub final_burst_delays_ms: Vec<f64>,
    pub game_over_banner_delay_ms: f64,

    // ── Leaderboard ─────────────────────────────────────────────────
    pub leaderboard_refresh_secs: f32,
    pub leaderboard_size: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_step: 0.1,
            player_bound_x: 5.0,
            player_bound_y: 3.0,
            player_depth: 5.0,
            bank_angle: 0.2,
            bank_smoothing: 0.1,

            fire_cooldown_ms: 1000.0,
            bullet_step: 0.3,
            bullet_spawn_offset_z: 1.0,
            bullet_despawn_depth: -20.0,
            bullet_radius: 0.3,
            trail_fade_ms: 500.0,
            trail_max_opacity: 0.6,
            thrust_particle_count: 10,
            thrust_decay_min: 0.05,
            thrust_decay_max: 0.10,
            thrust_speed_min: 0.1,
            thrust_speed_max: 0.2,

            spawn_interval_ms: 2000.0,
            asteroid_probability: 0.6,
            asteroid_speed_min: 0.03,
            asteroid_speed_max: 0.05,
            asteroid_spin_max: 0.01,
            alien_speed: 0.05,
            spawn_lateral_range: 5.0,
            spawn_depth: -10.0,
            enemy_despawn_depth: 20.0,
            asteroid_half_extents: [1.0, 1.0, 1.0],
            alien_half_extents: [0.5, 0.3, 1.0],

            player_hit_radius: 1.5,
            collision_damage: 20,
            score_per_hit: 10,
            max_health: 100,

            explosion_fade_ms: 500.0,
            explosion_scale_speed: 0.1,
            explosion_radius: 1.5,
            shrink_ms: 300.0,
            burst_particle_count: 20,
            burst_speed: 0.1,
            burst_decay_min: 0.02,
            burst_decay_max: 0.04,
            danger_lane_width: 1.5,
            danger_opacity_min: 0.1,
            danger_opacity_max: 0.3,
            danger_pulse_distance: 5.0,
            danger_pulse_amount: 0.2,

            aim_fade_distance: 20.0,
            aim_min_opacity: 0.2,
            trajectory_start_offset: 1.0,
            trajectory_range: 25.0,

            final_explosion_radius: 3.0,
            final_explosion_scale_speed: 0.05,
            final_burst_delays_ms: vec![0.0, 200.0, 400.0],
            game_over_banner_delay_ms: 1500.0,

            leaderboard_refresh_secs: 10.0,
            leaderboard_size: 10,
        }
    }
}

#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse tuning file: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("failed to serialize tuning: {0}")]
    Serialize(#[from] ron::Error),
}

impl Tuning {
    /// `<platform data dir>/star_strike`, or `./star_strike` when there is none.
    pub fn data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("star_strike")
    }

    pub fn file_path() -> PathBuf {
        Self::data_dir().join("tuning.ron")
    }

    pub fn load_or_default() -> Self {
        Self::load_or_seed(&Self::file_path())
    }

    /// Re-read the tuning file (F5). The live values stay if it can't be used.
    pub fn reload(&mut self) {
        self.reload_from(&Self::file_path());
    }

    /// A missing file is seeded with defaults. A broken one is left for the
    /// user to fix and defaults are used for this run.
    fn load_or_seed(path: &Path) -> Self {
        match Self::read_from(path) {
            Ok(Some(tuning)) => tuning,
            Ok(None) => {
                let tuning = Self::default();
                if let Err(e) = tuning.write_to(path) {
                    warn!("{e}");
                }
                tuning
            }
            Err(e) => {
                warn!("{e}; using defaults");
                Self::default()
            }
        }
    }

    fn reload_from(&mut self, path: &Path) {
        match Self::read_from(path) {
            Ok(Some(tuning)) => {
                *self = tuning;
                info!("Tuning reloaded from {}", path.display());
            }
            Ok(None) => warn!("No tuning file at {}; keeping current values", path.display()),
            Err(e) => warn!("{e}; keeping current values"),
        }
    }

    fn read_from(path: &Path) -> Result<Option<Self>, TuningError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(ron::from_str(&text)?))
    }

    fn write_to(&self, path: &Path) -> Result<(), TuningError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        std::fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_survive_ron_roundtrip() {
        let tuning = Tuning::default();
        let text = ron::ser::to_string_pretty(&tuning, ron::ser::PrettyConfig::default())
            .expect("serialize");
        let back: Tuning = ron::from_str(&text).expect("parse");
        assert_eq!(back.fire_cooldown_ms, 1000.0);
        assert_eq!(back.final_burst_delays_ms, vec![0.0, 200.0, 400.0]);
    }

    fn scratch_file() -> PathBuf {
        std::env::temp_dir()
            .join(format!("star_strike-{}", uuid::Uuid::new_v4()))
            .join("tuning.ron")
    }

    #[test]
    fn missing_file_is_seeded_with_defaults() {
        let path = scratch_file();
        let tuning = Tuning::load_or_seed(&path);
        assert_eq!(tuning.max_health, 100);
        let seeded = Tuning::read_from(&path).unwrap().unwrap();
        assert_eq!(seeded.fire_cooldown_ms, tuning.fire_cooldown_ms);
    }

    #[test]
    fn broken_file_is_not_overwritten() {
        let path = scratch_file();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "(spawn_interval_ms: ").unwrap();

        let tuning = Tuning::load_or_seed(&path);
        assert_eq!(tuning.spawn_interval_ms, Tuning::default().spawn_interval_ms);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "(spawn_interval_ms: ");
    }

    #[test]
    fn reload_keeps_live_values_when_file_is_unusable() {
        let path = scratch_file();
        let mut tuning = Tuning { spawn_interval_ms: 750.0, ..Tuning::default() };

        tuning.reload_from(&path);
        assert_eq!(tuning.spawn_interval_ms, 750.0);

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not ron").unwrap();
        tuning.reload_from(&path);
        assert_eq!(tuning.spawn_interval_ms, 750.0);

        std::fs::write(&path, "(spawn_interval_ms: 300.0)").unwrap();
        tuning.reload_from(&path);
        assert_eq!(tuning.spawn_interval_ms, 300.0);
    }

    #[test]
    fn partial_file_falls_back_to_defaults_per_field() {
        let back: Tuning = ron::from_str("(spawn_interval_ms: 500.0)").expect("parse");
        assert_eq!(back.spawn_interval_ms, 500.0);
        assert_eq!(back.max_health, 100);
    }
}
