use bevy::prelude::*;

use crate::config::tuning::Tuning;
use crate::game::{events::SimEvent, intent::Intent, session::Simulation};

// ── App phase state ─────────────────────────────────────────────────

#[derive(States, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum AppPhase {
    #[default]
    NameEntry,
    Playing,
}

/// Display name chosen at startup.
#[derive(Resource, Debug, Clone)]
pub struct PlayerName(pub String);

/// Key state sampled for the current frame.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct HeldKeys(pub Intent);

// ── SystemSets (strict Update ordering, playing phase only) ─────────

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameSet {
    InputSet,
    TickSet,
    PresentSet,
}

pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<SimEvent>();
        app.init_state::<AppPhase>();
        app.init_resource::<HeldKeys>();
        if !app.world().contains_resource::<Tuning>() {
            app.insert_resource(Tuning::default());
        }

        app.configure_sets(
            Update,
            (GameSet::InputSet, GameSet::TickSet, GameSet::PresentSet)
                .chain()
                .run_if(in_state(AppPhase::Playing)),
        );

        app.add_systems(OnEnter(AppPhase::Playing), start_simulation);
        app.add_systems(Update, read_held_keys.in_set(GameSet::InputSet));
        app.add_systems(
            Update,
            tick_simulation
                .in_set(GameSet::TickSet)
                .run_if(resource_exists::<Simulation>),
        );

        // ── Always-on ───────────────────────────────────────────────────
        app.add_systems(Update, tuning_reload_input);
    }
}

fn now_ms(time: &Time) -> f64 {
    time.elapsed_secs_f64() * 1000.0
}

fn start_simulation(
    mut commands: Commands,
    time: Res<Time>,
    tuning: Res<Tuning>,
    name: Option<Res<PlayerName>>,
) {
    let mut sim = Simulation::new(tuning.clone(), now_ms(&time));
    if let Some(name) = name {
        sim.set_player_name(name.0.clone());
    }
    info!("Session started for {}", sim.player_name());
    commands.insert_resource(sim);
}

/// Arrow keys move, Space fires. Without a keyboard (headless) the held state
/// is left to whoever drives the app.
fn read_held_keys(keyboard: Option<Res<ButtonInput<KeyCode>>>, mut held: ResMut<HeldKeys>) {
    let Some(keyboard) = keyboard else { return; };
    held.0 = Intent {
        left: keyboard.pressed(KeyCode::ArrowLeft),
        right: keyboard.pressed(KeyCode::ArrowRight),
        up: keyboard.pressed(KeyCode::ArrowUp),
        down: keyboard.pressed(KeyCode::ArrowDown),
        fire: keyboard.pressed(KeyCode::Space),
    };
}

fn tick_simulation(
    time: Res<Time>,
    held: Res<HeldKeys>,
    mut sim: ResMut<Simulation>,
    mut events: MessageWriter<SimEvent>,
) {
    for event in sim.tick(now_ms(&time), &held.0) {
        debug!("{event:?}");
        events.write(event);
    }
}

// ── Always-on ───────────────────────────────────────────────────────

/// Reload tuning with F5.
fn tuning_reload_input(
    keyboard: Option<Res<ButtonInput<KeyCode>>>,
    mut tuning: ResMut<Tuning>,
    sim: Option<ResMut<Simulation>>,
) {
    let Some(keyboard) = keyboard else { return; };
    if keyboard.just_pressed(KeyCode::F5) {
        tuning.reload();
        if let Some(mut sim) = sim {
            sim.set_tuning(tuning.clone());
        }
    }
}
