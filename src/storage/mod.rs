pub mod api;
pub mod error;
pub mod leaderboard;
pub mod repo;
pub mod sqlite_repo;
