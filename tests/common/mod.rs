//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides the core ECS runtime.
//! - `star_strike::plugins::configure_headless` installs gameplay and an
//!   in-memory score client.
//! - time advances by a fixed step so frame counts map to milliseconds.

#![allow(dead_code)]

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

use star_strike::config::tuning::Tuning;
use star_strike::game::session::Simulation;
use star_strike::plugins::game_plugin::AppPhase;

pub const FRAME_MS: u64 = 16;

pub fn app_headless() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    app.insert_resource(Tuning::default());
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(FRAME_MS)));
    star_strike::plugins::configure_headless(&mut app);
    app
}

/// Headless app already in the playing phase with a live simulation.
pub fn app_playing() -> App {
    let mut app = app_headless();
    app.update();
    app.world_mut()
        .resource_mut::<NextState<AppPhase>>()
        .set(AppPhase::Playing);
    app.update();
    assert!(app.world().contains_resource::<Simulation>());
    app
}

pub fn sim(app: &mut App) -> Mut<'_, Simulation> {
    app.world_mut().resource_mut::<Simulation>()
}

/// Fresh simulation for driving the core directly with a synthetic clock.
pub fn seeded(seed: u64) -> Simulation {
    Simulation::with_seed(Tuning::default(), 0.0, seed)
}
