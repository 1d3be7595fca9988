use bevy::prelude::*;

use super::game_plugin::{AppPhase, GameSet};
use super::storage_plugin::LeaderboardView;
use crate::game::events::SimEvent;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(AppPhase::Playing), setup_ui);
        app.add_systems(
            Update,
            (apply_sim_events, update_leaderboard_panel)
                .chain()
                .in_set(GameSet::PresentSet),
        );
    }
}

#[derive(Component)]
struct ScoreText;

#[derive(Component)]
struct HealthText;

#[derive(Component)]
struct GameOverBanner;

#[derive(Component)]
struct LeaderboardText;

fn setup_ui(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(10.0),
                top: Val::Px(10.0),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(6.0),
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn((
                ScoreText,
                Text::new("Score: 0"),
                TextFont {
                    font_size: 24.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));

            parent.spawn((
                HealthText,
                Text::new("Health: 100"),
                TextFont {
                    font_size: 24.0,
                    ..default()
                },
                TextColor(Color::srgb(0.2, 1.0, 0.4)),
            ));
        });

    commands.spawn((
        LeaderboardText,
        Text::new("Leaderboard\n..."),
        TextFont {
            font_size: 18.0,
            ..default()
        },
        TextColor(Color::srgb(0.8, 0.8, 0.2)),
        Node {
            position_type: PositionType::Absolute,
            right: Val::Px(10.0),
            top: Val::Px(10.0),
            ..default()
        },
    ));
}

fn spawn_banner(commands: &mut Commands, score: u32) {
    commands
        .spawn((
            GameOverBanner,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(24.0),
                position_type: PositionType::Absolute,
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
            GlobalZIndex(10),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("GAME OVER"),
                TextFont { font_size: 56.0, ..default() },
                TextColor(Color::srgb(1.0, 0.2, 0.2)),
            ));
            parent.spawn((
                Text::new(format!("Final score: {score}")),
                TextFont { font_size: 28.0, ..default() },
                TextColor(Color::WHITE),
            ));
            parent.spawn((
                Text::new("Press SPACE to play again"),
                TextFont { font_size: 22.0, ..default() },
                TextColor(Color::srgba(0.5, 0.5, 0.5, 1.0)),
            ));
        });
}

fn apply_sim_events(
    mut commands: Commands,
    mut events: MessageReader<SimEvent>,
    mut score_text: Query<&mut Text, (With<ScoreText>, Without<HealthText>)>,
    mut health_text: Query<&mut Text, (With<HealthText>, Without<ScoreText>)>,
    banners: Query<Entity, With<GameOverBanner>>,
) {
    for event in events.read() {
        match event {
            SimEvent::ScoreChanged { score } => {
                for mut text in &mut score_text {
                    **text = format!("Score: {score}");
                }
            }
            SimEvent::HealthChanged { health } => {
                for mut text in &mut health_text {
                    **text = format!("Health: {health}");
                }
            }
            SimEvent::ShowGameOver { score } => spawn_banner(&mut commands, *score),
            SimEvent::Restarted => {
                for entity in &banners {
                    commands.entity(entity).despawn();
                }
            }
            SimEvent::Fired { .. } | SimEvent::GameOverStarted { .. } | SimEvent::SubmitScore { .. } => {}
        }
    }
}

fn update_leaderboard_panel(
    view: Res<LeaderboardView>,
    mut panel: Query<&mut Text, With<LeaderboardText>>,
) {
    if !view.is_changed() {
        return;
    }
    let mut body = String::from("Leaderboard");
    if view.records.is_empty() {
        body.push_str("\n(no scores yet)");
    }
    for (rank, record) in view.records.iter().enumerate() {
        body.push_str(&format!("\n{:>2}. {:<12} {}", rank + 1, record.player_name, record.score));
    }
    for mut text in &mut panel {
        **text = body.clone();
    }
}
