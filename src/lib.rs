pub mod config;
pub mod game;
pub mod plugins;
pub mod storage;
