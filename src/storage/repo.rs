use std::sync::Mutex;

use super::error::StorageError;
use super::leaderboard::{Leaderboard, ScoreRecord};

/// Repository trait for leaderboard persistence.
pub trait ScoreStore: Send + Sync {
    /// Record a score and return the resulting top list.
    fn submit(&self, record: ScoreRecord) -> Result<Vec<ScoreRecord>, StorageError>;
    fn top(&self) -> Result<Vec<ScoreRecord>, StorageError>;
}

/// Process-local store. Contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    board: Mutex<Leaderboard>,
}

impl MemoryScoreStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            board: Mutex::new(Leaderboard::new(capacity)),
        }
    }
}

impl ScoreStore for MemoryScoreStore {
    fn submit(&self, record: ScoreRecord) -> Result<Vec<ScoreRecord>, StorageError> {
        let mut board = self.board.lock().map_err(|_| StorageError::Poisoned)?;
        board.insert(record);
        Ok(board.records().to_vec())
    }

    fn top(&self) -> Result<Vec<ScoreRecord>, StorageError> {
        let board = self.board.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(board.records().to_vec())
    }
}
