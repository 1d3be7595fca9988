use bevy::prelude::*;

use super::types::EntityId;

/// Outcomes of a simulation tick, relayed to UI and score collaborators.
#[derive(Message, Debug, Clone, PartialEq)]
pub enum SimEvent {
    Fired {
        bullet: EntityId,
    },
    ScoreChanged {
        score: u32,
    },
    HealthChanged {
        health: u32,
    },
    /// Health reached zero; the detonation sequence has begun.
    GameOverStarted {
        score: u32,
    },
    /// The banner delay elapsed.
    ShowGameOver {
        score: u32,
    },
    SubmitScore {
        player_name: String,
        score: u32,
    },
    Restarted,
}
