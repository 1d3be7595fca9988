use bevy::prelude::*;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::config::tuning::Tuning;
use crate::game::events::SimEvent;
use crate::storage::api::{ApiResponse, Method, SCORES_PATH, ScoreApi};
use crate::storage::leaderboard::ScoreRecord;
use crate::storage::repo::{MemoryScoreStore, ScoreStore};
use crate::storage::sqlite_repo::SqliteScoreRepo;

/// Persisted tokio runtime for blocking score calls off the frame loop.
#[derive(Resource)]
pub struct TokioRuntime(pub tokio::runtime::Runtime);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreBackend {
    #[default]
    Sqlite,
    /// Process-local; used headless and when SQLite can't be opened.
    Memory,
}

#[derive(Default)]
pub struct StoragePlugin {
    pub backend: ScoreBackend,
}

impl Plugin for StoragePlugin {
    fn build(&self, app: &mut App) {
        let backend = self.backend;
        app.init_resource::<LeaderboardView>();
        app.add_systems(Startup, move |world: &mut World| init_storage(world, backend));
        app.add_systems(
            Update,
            (submit_scores, refresh_leaderboard, receive_replies)
                .chain()
                .run_if(resource_exists::<ScoreClient>),
        );
    }
}

/// Last successfully fetched leaderboard. Kept as-is when a request fails.
#[derive(Resource, Debug, Default)]
pub struct LeaderboardView {
    pub records: Vec<ScoreRecord>,
}

#[derive(Debug)]
enum ScoreReply {
    Submitted(ApiResponse),
    Fetched(ApiResponse),
}

/// Fire-and-forget client for the leaderboard API. Requests run on the
/// blocking pool; replies are drained once per frame.
#[derive(Resource)]
pub struct ScoreClient {
    api: ScoreApi,
    tx: UnboundedSender<ScoreReply>,
    rx: UnboundedReceiver<ScoreReply>,
    refresh: Timer,
    fetch_pending: bool,
}

impl ScoreClient {
    fn new(api: ScoreApi, refresh_secs: f32) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            api,
            tx,
            rx,
            refresh: Timer::from_seconds(refresh_secs.max(0.1), TimerMode::Repeating),
            fetch_pending: false,
        }
    }

    fn submit(&mut self, rt: &TokioRuntime, player_name: &str, score: u32) {
        let body = json!({ "playerName": player_name, "score": score }).to_string();
        let api = self.api.clone();
        let tx = self.tx.clone();
        rt.0.spawn_blocking(move || {
            let res = api.handle(Method::Post, SCORES_PATH, body.as_bytes());
            let _ = tx.send(ScoreReply::Submitted(res));
        });
    }

    fn fetch(&mut self, rt: &TokioRuntime) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        self.fetch_pending = true;
        rt.0.spawn_blocking(move || {
            let res = api.handle(Method::Get, SCORES_PATH, b"");
            let _ = tx.send(ScoreReply::Fetched(res));
        });
    }
}

fn open_store(rt: &tokio::runtime::Runtime, backend: ScoreBackend, capacity: usize) -> Arc<dyn ScoreStore> {
    if backend == ScoreBackend::Sqlite {
        let db_path = Tuning::data_dir().join("star_strike.db");
        info!("Initializing SQLite at {:?}", db_path);
        match rt.block_on(SqliteScoreRepo::open(&db_path, capacity)) {
            Ok(repo) => {
                info!("SQLite initialized successfully");
                return Arc::new(repo);
            }
            Err(e) => {
                error!("Failed to initialize SQLite: {e}; scores will not persist");
            }
        }
    }
    Arc::new(MemoryScoreStore::new(capacity))
}

fn init_storage(world: &mut World, backend: ScoreBackend) {
    let (capacity, refresh_secs) = {
        let tuning = world.get_resource::<Tuning>().cloned().unwrap_or_default();
        (tuning.leaderboard_size, tuning.leaderboard_refresh_secs)
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => TokioRuntime(rt),
        Err(e) => {
            error!("Failed to create tokio runtime: {e}; leaderboard disabled");
            return;
        }
    };

    let store = open_store(&rt.0, backend, capacity);
    let mut client = ScoreClient::new(ScoreApi::new(store), refresh_secs);
    client.fetch(&rt);

    world.insert_resource(client);
    world.insert_resource(rt);
}

fn submit_scores(
    mut events: MessageReader<SimEvent>,
    rt: Res<TokioRuntime>,
    mut client: ResMut<ScoreClient>,
) {
    for event in events.read() {
        if let SimEvent::SubmitScore { player_name, score } = event {
            info!("Submitting score {score} for {player_name}");
            client.submit(&rt, player_name, *score);
        }
    }
}

fn refresh_leaderboard(time: Res<Time>, rt: Res<TokioRuntime>, mut client: ResMut<ScoreClient>) {
    if !client.refresh.tick(time.delta()).just_finished() {
        return;
    }
    if client.fetch_pending {
        debug!("Leaderboard fetch still outstanding; skipping refresh");
        return;
    }
    client.fetch(&rt);
}

/// Pull `scores` out of a reply, logging anything that isn't a success.
fn scores_from(res: ApiResponse, what: &str) -> Option<Vec<ScoreRecord>> {
    if res.status != 200 {
        warn!("Score {what} failed with {}: {}", res.status, res.body);
        return None;
    }
    let scores = match res.body {
        Value::Object(mut map) => map.remove("scores").unwrap_or(Value::Null),
        other => other,
    };
    match serde_json::from_value(scores) {
        Ok(records) => Some(records),
        Err(e) => {
            warn!("Unreadable score {what} reply: {e}");
            None
        }
    }
}

fn receive_replies(mut client: ResMut<ScoreClient>, mut view: ResMut<LeaderboardView>) {
    while let Ok(reply) = client.rx.try_recv() {
        let records = match reply {
            ScoreReply::Submitted(res) => scores_from(res, "submit"),
            ScoreReply::Fetched(res) => {
                client.fetch_pending = false;
                scores_from(res, "fetch")
            }
        };
        if let Some(records) = records {
            view.records = records;
        }
    }
}
