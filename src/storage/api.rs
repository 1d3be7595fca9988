//! Leaderboard HTTP contract, independent of any listener.
//!
//! `POST /api/scores` with `{ "playerName": string, "score": integer }` records
//! a score and answers `{ "success": true, "scores": [...] }`; `GET /api/scores`
//! answers the top list as a bare array. A host binds `handle` to its server of
//! choice.

use std::sync::Arc;

use bevy::prelude::*;
use serde::Deserialize;
use serde_json::{Value, json};

use super::leaderboard::ScoreRecord;
use super::repo::ScoreStore;

pub const SCORES_PATH: &str = "/api/scores";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }
}

/// Incoming submission. Both fields are required; they are optional here so
/// a missing one is reported as a client error instead of a parse failure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSubmission {
    pub player_name: Option<String>,
    pub score: Option<i64>,
}

#[derive(Clone)]
pub struct ScoreApi {
    store: Arc<dyn ScoreStore>,
}

impl ScoreApi {
    pub fn new(store: Arc<dyn ScoreStore>) -> Self {
        Self { store }
    }

    pub fn handle(&self, method: Method, path: &str, body: &[u8]) -> ApiResponse {
        let path = path.split('?').next().unwrap_or(path).trim_end_matches('/');
        if path != SCORES_PATH {
            return ApiResponse::error(404, "not found");
        }
        match method {
            Method::Post => self.submit(body),
            Method::Get => self.list(),
            Method::Other => ApiResponse::error(404, "not found"),
        }
    }

    fn submit(&self, body: &[u8]) -> ApiResponse {
        let submission: ScoreSubmission = match serde_json::from_slice(body) {
            Ok(s) => s,
            Err(e) => return ApiResponse::error(400, format!("malformed body: {e}")),
        };
        let (Some(player_name), Some(score)) = (submission.player_name, submission.score) else {
            return ApiResponse::error(400, "playerName and score are required");
        };

        match self.store.submit(ScoreRecord::now(player_name, score)) {
            Ok(scores) => ApiResponse::ok(json!({ "success": true, "scores": scores })),
            Err(e) => {
                error!("Failed to save score: {e}");
                ApiResponse::error(500, "failed to save score")
            }
        }
    }

    fn list(&self) -> ApiResponse {
        match self.store.top() {
            Ok(scores) => ApiResponse::ok(json!(scores)),
            Err(e) => {
                error!("Failed to read scores: {e}");
                ApiResponse::error(500, "failed to read scores")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::error::StorageError;
    use crate::storage::repo::MemoryScoreStore;

    fn api() -> ScoreApi {
        ScoreApi::new(Arc::new(MemoryScoreStore::new(10)))
    }

    struct BrokenStore;

    impl ScoreStore for BrokenStore {
        fn submit(&self, _: ScoreRecord) -> Result<Vec<ScoreRecord>, StorageError> {
            Err(StorageError::Poisoned)
        }
        fn top(&self) -> Result<Vec<ScoreRecord>, StorageError> {
            Err(StorageError::Poisoned)
        }
    }

    #[test]
    fn missing_fields_are_rejected() {
        let api = api();
        for body in [r#"{"score": 10}"#, r#"{"playerName": "a"}"#, "{}", "not json", r#"{"playerName":"a","score":"ten"}"#] {
            let res = api.handle(Method::Post, SCORES_PATH, body.as_bytes());
            assert_eq!(res.status, 400, "{body}");
            assert!(res.body["error"].is_string());
        }
        assert_eq!(api.handle(Method::Get, SCORES_PATH, b"").body, json!([]));
    }

    #[test]
    fn unknown_routes_are_not_found() {
        let api = api();
        assert_eq!(api.handle(Method::Get, "/api/other", b"").status, 404);
        assert_eq!(api.handle(Method::Other, SCORES_PATH, b"").status, 404);
    }

    #[test]
    fn store_failures_surface_as_server_errors() {
        let api = ScoreApi::new(Arc::new(BrokenStore));
        let res = api.handle(Method::Post, SCORES_PATH, br#"{"playerName":"a","score":1}"#);
        assert_eq!(res.status, 500);
        assert_eq!(api.handle(Method::Get, SCORES_PATH, b"").status, 500);
    }
}
