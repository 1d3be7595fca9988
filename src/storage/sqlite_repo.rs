use bevy::log::warn;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tokio::runtime::Handle;

use super::error::StorageError;
use super::leaderboard::ScoreRecord;
use super::repo::ScoreStore;

/// SQLite-backed leaderboard. Keeps at most `capacity` rows.
pub struct SqliteScoreRepo {
    pool: SqlitePool,
    handle: Handle,
    capacity: usize,
}

impl SqliteScoreRepo {
    pub async fn open(db_path: &Path, capacity: usize) -> Result<Self, StorageError> {
        if let Some(parent) = db_path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!("Failed to create {}: {e}", parent.display());
            }
        }
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        Self::connect(SqlitePoolOptions::new().max_connections(5), &url, capacity).await
    }

    /// In-memory database; a single connection so every query sees the same data.
    pub async fn in_memory(capacity: usize) -> Result<Self, StorageError> {
        let options = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
        Self::connect(options, "sqlite::memory:", capacity).await
    }

    async fn connect(options: SqlitePoolOptions, url: &str, capacity: usize) -> Result<Self, StorageError> {
        let pool = options.connect(url).await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self {
            pool,
            handle: Handle::current(),
            capacity,
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn submit_async(&self, record: &ScoreRecord) -> Result<Vec<ScoreRecord>, StorageError> {
        let id = uuid::Uuid::new_v4().to_string();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"INSERT INTO scores (id, player_name, score, timestamp)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(&id)
        .bind(&record.player_name)
        .bind(record.score)
        .bind(record.timestamp)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"DELETE FROM scores WHERE id NOT IN (
                   SELECT id FROM scores ORDER BY score DESC, rowid ASC LIMIT ?
               )"#,
        )
        .bind(self.capacity as i64)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        self.top_async().await
    }

    pub async fn top_async(&self) -> Result<Vec<ScoreRecord>, StorageError> {
        let rows: Vec<(String, i64, i64)> = sqlx::query_as(
            r#"SELECT player_name, score, timestamp
               FROM scores ORDER BY score DESC, rowid ASC LIMIT ?"#,
        )
        .bind(self.capacity as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(player_name, score, timestamp)| ScoreRecord {
                player_name,
                score,
                timestamp,
            })
            .collect())
    }
}

/// Blocking access for callers outside the runtime (worker threads).
impl ScoreStore for SqliteScoreRepo {
    fn submit(&self, record: ScoreRecord) -> Result<Vec<ScoreRecord>, StorageError> {
        self.handle.block_on(self.submit_async(&record))
    }

    fn top(&self) -> Result<Vec<ScoreRecord>, StorageError> {
        self.handle.block_on(self.top_async())
    }
}
