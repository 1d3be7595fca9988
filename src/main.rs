use bevy::prelude::*;

use star_strike::config::tuning::Tuning;
use star_strike::plugins::{
    game_plugin::GamePlugin, menu_plugin::MenuPlugin, scene_plugin::ScenePlugin,
    storage_plugin::StoragePlugin, ui_plugin::UiPlugin,
};

fn main() {
    let tuning = Tuning::load_or_default();

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Star Strike".into(),
                resolution: (1280u32, 720u32).into(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(Color::srgb(0.0, 0.0, 0.02)))
        .insert_resource(tuning)
        .add_plugins(GamePlugin)
        .add_plugins(MenuPlugin)
        .add_plugins(ScenePlugin)
        .add_plugins(UiPlugin)
        .add_plugins(StoragePlugin::default())
        .run();
}
