use bevy::input::keyboard::{Key, KeyboardInput};
use bevy::prelude::*;

use super::game_plugin::{AppPhase, PlayerName};

const COLOR_BG: Color = Color::srgba(0.05, 0.05, 0.10, 1.0);
const COLOR_TEXT_DIM: Color = Color::srgba(0.5, 0.5, 0.5, 1.0);
const COLOR_ACCENT: Color = Color::srgba(0.2, 0.7, 1.0, 1.0);
const COLOR_INPUT_BG: Color = Color::srgba(0.12, 0.14, 0.20, 1.0);

const MAX_NAME_LEN: usize = 16;
const DEFAULT_NAME: &str = "Pilot";

// ── Plugin ───────────────────────────────────────────────────────────

/// Startup prompt for the player's display name.
pub struct MenuPlugin;

impl Plugin for MenuPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NameDraft>();
        app.add_systems(OnEnter(AppPhase::NameEntry), spawn_name_prompt);
        app.add_systems(OnExit(AppPhase::NameEntry), despawn::<NamePromptRoot>);
        app.add_systems(Update, name_input_system.run_if(in_state(AppPhase::NameEntry)));
    }
}

#[derive(Component)]
struct NamePromptRoot;

#[derive(Component)]
struct NameDisplay;

#[derive(Resource, Default)]
struct NameDraft(String);

fn despawn<T: Component>(mut commands: Commands, query: Query<Entity, With<T>>) {
    for entity in &query {
        commands.entity(entity).despawn();
    }
}

fn spawn_name_prompt(mut commands: Commands) {
    commands
        .spawn((
            NamePromptRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(20.0),
                ..default()
            },
            BackgroundColor(COLOR_BG),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("STAR STRIKE"),
                TextFont { font_size: 64.0, ..default() },
                TextColor(COLOR_ACCENT),
                Node { margin: UiRect::bottom(Val::Px(40.0)), ..default() },
            ));
            parent.spawn((
                Text::new("Enter your name"),
                TextFont { font_size: 24.0, ..default() },
                TextColor(COLOR_TEXT_DIM),
            ));
            parent
                .spawn((
                    Node {
                        width: Val::Px(360.0),
                        height: Val::Px(56.0),
                        justify_content: JustifyContent::Center,
                        align_items: AlignItems::Center,
                        border_radius: BorderRadius::all(Val::Px(8.0)),
                        ..default()
                    },
                    BackgroundColor(COLOR_INPUT_BG),
                ))
                .with_children(|input| {
                    input.spawn((
                        NameDisplay,
                        Text::new("..."),
                        TextFont { font_size: 28.0, ..default() },
                        TextColor(Color::WHITE),
                    ));
                });
            parent.spawn((
                Text::new("ENTER to launch"),
                TextFont { font_size: 20.0, ..default() },
                TextColor(COLOR_TEXT_DIM),
            ));
        });
}

fn name_input_system(
    mut commands: Commands,
    mut keyboard_events: MessageReader<KeyboardInput>,
    mut draft: ResMut<NameDraft>,
    mut displays: Query<&mut Text, With<NameDisplay>>,
    mut next_state: ResMut<NextState<AppPhase>>,
) {
    for event in keyboard_events.read() {
        if !event.state.is_pressed() {
            continue;
        }
        match &event.logical_key {
            Key::Backspace => {
                draft.0.pop();
            }
            Key::Enter => {
                let name = draft.0.trim();
                let name = if name.is_empty() { DEFAULT_NAME } else { name };
                info!("Player name set to {name}");
                commands.insert_resource(PlayerName(name.to_string()));
                next_state.set(AppPhase::Playing);
                return;
            }
            Key::Character(c) => {
                if draft.0.chars().count() < MAX_NAME_LEN {
                    draft.0.extend(c.chars().filter(|ch| !ch.is_control()));
                }
            }
            Key::Space => {
                if !draft.0.is_empty() && draft.0.chars().count() < MAX_NAME_LEN {
                    draft.0.push(' ');
                }
            }
            _ => {}
        }
    }

    for mut text in &mut displays {
        **text = if draft.0.is_empty() {
            "...".into()
        } else {
            draft.0.clone()
        };
    }
}
