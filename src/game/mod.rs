pub mod collision;
pub mod deferred;
pub mod effects;
pub mod entities;
pub mod events;
pub mod intent;
pub mod movement;
pub mod scene;
pub mod session;
pub mod spawn;
pub mod targeting;
pub mod types;
