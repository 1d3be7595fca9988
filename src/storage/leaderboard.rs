use serde::{Deserialize, Serialize};

/// One leaderboard row as exchanged with clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub player_name: String,
    pub score: i64,
    /// Unix milliseconds.
    pub timestamp: i64,
}

impl ScoreRecord {
    pub fn now(player_name: impl Into<String>, score: i64) -> Self {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64;
        Self {
            player_name: player_name.into(),
            score,
            timestamp,
        }
    }
}

/// Bounded high-score table, highest first. Equal scores keep arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaderboard {
    capacity: usize,
    records: Vec<ScoreRecord>,
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self::new(10)
    }
}

impl Leaderboard {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            records: Vec::with_capacity(capacity + 1),
        }
    }

    pub fn insert(&mut self, record: ScoreRecord) {
        self.records.push(record);
        self.records.sort_by(|a, b| b.score.cmp(&a.score));
        self.records.truncate(self.capacity);
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }
}
