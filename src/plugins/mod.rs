pub mod game_plugin;
pub mod menu_plugin;
pub mod scene_plugin;
pub mod storage_plugin;
pub mod ui_plugin;

use bevy::prelude::*;

use game_plugin::GamePlugin;
use storage_plugin::{ScoreBackend, StoragePlugin};

/// Gameplay and score client without window, renderer or UI. The caller
/// provides `MinimalPlugins` and `StatesPlugin`.
pub fn configure_headless(app: &mut App) {
    app.add_plugins(GamePlugin);
    app.add_plugins(StoragePlugin {
        backend: ScoreBackend::Memory,
    });
}
