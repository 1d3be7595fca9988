//! Game state machine and the per-frame tick.
//!
//! `Simulation` is the long-lived owner: tuning, RNG, deferred-task queue and
//! the player's display name. Everything that belongs to one play-through lives
//! in `Session`, which is replaced wholesale on restart.
//!
//! Tick order while Active: move player → fire → spawn → move enemies/bullets →
//! collisions → effects → targeting. Deferred tasks run after that in every
//! status. During GameOver only the detonation (explosions and free particles)
//! keeps advancing.

use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::collision;
use super::deferred::{DeferredQueue, DeferredTask, SessionId};
use super::effects::{Effects, ExplosionKind, ParticleKind};
use super::entities::{EntityRegistry, Player};
use super::events::SimEvent;
use super::intent::Intent;
use super::movement;
use super::spawn::SpawnScheduler;
use super::targeting::{self, TargetingReadout};
use super::types::{EntityId, Health, Millis, Score};
use crate::config::tuning::Tuning;

// ── Game state ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameOverStage {
    /// Detonation in progress, banner not yet shown.
    ExplosionStarted,
    AwaitingRestart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameStatus {
    Active,
    GameOver(GameOverStage),
}

#[derive(Debug, Clone)]
pub struct GameState {
    pub status: GameStatus,
    pub score: Score,
    pub health: Health,
    pub game_over_at: Option<Millis>,
}

impl GameState {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            status: GameStatus::Active,
            score: Score::default(),
            health: Health::new(tuning.max_health, tuning.max_health),
            game_over_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == GameStatus::Active
    }
}

// ── Session ─────────────────────────────────────────────────────────

/// All state owned by one play-through.
#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    pub started: Millis,
    pub state: GameState,
    pub player: Player,
    pub registry: EntityRegistry,
    pub effects: Effects,
    pub spawner: SpawnScheduler,
    pub last_shot: Option<Millis>,
    pub targeting: TargetingReadout,
}

impl Session {
    pub fn new(id: SessionId, now: Millis, tuning: &Tuning) -> Self {
        let player = Player::spawn(tuning);
        let targeting = TargetingReadout::idle(&player, tuning);
        Self {
            id,
            started: now,
            state: GameState::new(tuning),
            player,
            registry: EntityRegistry::default(),
            effects: Effects::default(),
            spawner: SpawnScheduler::new(now),
            last_shot: None,
            targeting,
        }
    }

    /// Remove an enemy together with its danger zone. Unknown ids are a no-op.
    pub fn despawn_enemy(&mut self, id: EntityId) -> bool {
        match self.registry.remove_enemy(id) {
            Some(enemy) => {
                if let Some(zone) = enemy.danger_zone {
                    self.effects.remove_danger_zone(zone);
                }
                true
            }
            None => false,
        }
    }
}

// ── Simulation ──────────────────────────────────────────────────────

#[derive(Resource)]
pub struct Simulation {
    tuning: Tuning,
    rng: StdRng,
    session: Session,
    deferred: DeferredQueue,
    player_name: String,
    fire_held: bool,
}

impl Simulation {
    pub fn new(tuning: Tuning, now: Millis) -> Self {
        Self::with_rng(tuning, now, StdRng::from_entropy())
    }

    /// Deterministic RNG for tests and replays of a single run.
    pub fn with_seed(tuning: Tuning, now: Millis, seed: u64) -> Self {
        Self::with_rng(tuning, now, StdRng::seed_from_u64(seed))
    }

    fn with_rng(tuning: Tuning, now: Millis, rng: StdRng) -> Self {
        let session = Session::new(SessionId(1), now, &tuning);
        Self {
            tuning,
            rng,
            session,
            deferred: DeferredQueue::default(),
            player_name: String::from("Pilot"),
            fire_held: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn status(&self) -> GameStatus {
        self.session.state.status
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Takes effect from the next tick.
    pub fn set_tuning(&mut self, tuning: Tuning) {
        self.tuning = tuning;
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn set_player_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        let trimmed = name.trim();
        if !trimmed.is_empty() {
            self.player_name = trimmed.to_string();
        }
    }

    pub fn pending_tasks(&self) -> usize {
        self.deferred.len()
    }

    /// Run one frame of the simulation at wall-clock time `now`.
    pub fn tick(&mut self, now: Millis, intent: &Intent) -> Vec<SimEvent> {
        let mut events = Vec::new();
        let fire_pressed = intent.fire && !self.fire_held;
        self.fire_held = intent.fire;

        match self.status() {
            GameStatus::Active => {
                self.tick_active(now, intent, &mut events);
                self.run_deferred(now, &mut events);
            }
            GameStatus::GameOver(_) => {
                if fire_pressed {
                    self.restart_into(now, &mut events);
                    return events;
                }
                self.run_deferred(now, &mut events);
                let effects = &mut self.session.effects;
                effects.advance_explosions(now, &self.tuning);
                effects.advance_particles();
            }
        }
        events
    }

    fn tick_active(&mut self, now: Millis, intent: &Intent, events: &mut Vec<SimEvent>) {
        movement::move_player(&mut self.session.player, intent, &self.tuning);

        if intent.fire {
            if let Some(bullet) = self.try_fire(now) {
                events.push(SimEvent::Fired { bullet });
            }
        }

        let session = &mut self.session;
        session
            .spawner
            .update(now, &mut session.registry, &mut self.rng, &self.tuning);

        for id in movement::advance_enemies(&mut session.registry, &self.tuning) {
            session.despawn_enemy(id);
        }
        for id in movement::advance_bullets(&mut session.registry, &self.tuning) {
            session.registry.remove_bullet(id);
        }

        // Collisions
        let bullet_hits = collision::detect_bullet_hits(&session.registry, &self.tuning);
        if !bullet_hits.is_empty() {
            collision::apply_bullet_hits(
                &bullet_hits,
                &mut session.registry,
                &mut session.effects,
                &mut session.state.score,
                now,
                &mut self.rng,
                &self.tuning,
            );
            events.push(SimEvent::ScoreChanged {
                score: session.state.score.0,
            });
        }

        let player_hits = collision::detect_player_hits(&session.player, &session.registry, &self.tuning);
        let outcome = collision::apply_player_hits(
            &player_hits,
            &mut session.registry,
            &mut session.effects,
            &mut session.state.health,
            now,
            &mut self.rng,
            &self.tuning,
        );
        if outcome.hits > 0 {
            events.push(SimEvent::HealthChanged {
                health: session.state.health.get(),
            });
        }

        // Effects
        let effects = &mut session.effects;
        effects.advance_explosions(now, &self.tuning);
        effects.advance_shrinks(&mut session.registry, now, &self.tuning);
        effects.advance_particles();
        effects.advance_bullet_attachments(&mut session.registry, now, &self.tuning);
        effects.update_danger_zones(&mut session.registry, &session.player, now, &self.tuning);

        session.targeting =
            targeting::update_targeting(&session.player, &session.registry, &session.effects, &self.tuning);

        if outcome.depleted {
            self.begin_game_over(now, events);
        }
    }

    /// Fire if the cooldown has elapsed. Only meaningful while Active.
    pub fn try_fire(&mut self, now: Millis) -> Option<EntityId> {
        if !self.session.state.is_active() {
            return None;
        }
        if let Some(last) = self.session.last_shot {
            if now - last < self.tuning.fire_cooldown_ms {
                return None;
            }
        }
        let session = &mut self.session;
        let thrust = session.effects.thrust_batch(&mut self.rng, &self.tuning);
        let position = session.player.position + Vec3::Z * self.tuning.bullet_spawn_offset_z;
        let id = session.registry.spawn_bullet(position, now, thrust);
        session.last_shot = Some(now);
        Some(id)
    }

    fn begin_game_over(&mut self, now: Millis, events: &mut Vec<SimEvent>) {
        let session = &mut self.session;
        session.state.status = GameStatus::GameOver(GameOverStage::ExplosionStarted);
        session.state.game_over_at = Some(now);
        session.player.visible = false;
        session.targeting = TargetingReadout::idle(&session.player, &self.tuning);

        let position = session.player.position;
        session
            .effects
            .spawn_explosion(ExplosionKind::Final, position, now, &self.tuning);
        for delay in &self.tuning.final_burst_delays_ms {
            self.deferred
                .schedule(session.id, now + delay, DeferredTask::FinalBurst { position });
        }
        self.deferred.schedule(
            session.id,
            now + self.tuning.game_over_banner_delay_ms,
            DeferredTask::ShowGameOver,
        );

        info!(
            "Game over: score {} (session {:?})",
            session.state.score.0, session.id
        );
        events.push(SimEvent::GameOverStarted {
            score: session.state.score.0,
        });
    }

    fn run_deferred(&mut self, now: Millis, events: &mut Vec<SimEvent>) {
        for task in self.deferred.drain_due(self.session.id, now) {
            match task {
                DeferredTask::FinalBurst { position } => {
                    self.session.effects.spawn_burst(
                        ParticleKind::FinalBurst,
                        position,
                        &mut self.rng,
                        &self.tuning,
                    );
                }
                DeferredTask::ShowGameOver => {
                    let state = &mut self.session.state;
                    state.status = GameStatus::GameOver(GameOverStage::AwaitingRestart);
                    let score = state.score.0;
                    events.push(SimEvent::ShowGameOver { score });
                    events.push(SimEvent::SubmitScore {
                        player_name: self.player_name.clone(),
                        score,
                    });
                }
            }
        }
    }

    /// Start a fresh session if the game is over. A no-op while Active.
    pub fn restart(&mut self, now: Millis) -> Vec<SimEvent> {
        let mut events = Vec::new();
        if !self.session.state.is_active() {
            self.restart_into(now, &mut events);
        }
        events
    }

    fn restart_into(&mut self, now: Millis, events: &mut Vec<SimEvent>) {
        let old = self.session.id;
        let cancelled = self.deferred.cancel_session(old);
        self.session = Session::new(old.next(), now, &self.tuning);
        info!("Restarted as session {:?} ({cancelled} pending task(s) cancelled)", self.session.id);

        events.push(SimEvent::Restarted);
        events.push(SimEvent::ScoreChanged { score: 0 });
        events.push(SimEvent::HealthChanged {
            health: self.session.state.health.get(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::EnemyKind;

    fn sim() -> Simulation {
        Simulation::with_seed(Tuning::default(), 0.0, 42)
    }

    /// Park an alien ship beside the player so the next tick collides. It sits
    /// outside the firing lane, so a shot fired the same frame can't claim it.
    fn ram_player(sim: &mut Simulation) {
        let pos = sim.session().player.position + Vec3::X * 1.2;
        sim.session_mut()
            .registry
            .spawn_enemy(EnemyKind::AlienShip, pos, Vec3::ZERO, 0.0, None);
    }

    fn kill_player(sim: &mut Simulation, now: Millis) -> Vec<SimEvent> {
        let mut events = Vec::new();
        for _ in 0..5 {
            ram_player(sim);
            events.extend(sim.tick(now, &Intent::default()));
        }
        events
    }

    #[test]
    fn despawning_an_enemy_drops_its_zone() {
        let mut sim = sim();
        let tuning = sim.tuning().clone();
        let session = sim.session_mut();
        let id = session
            .registry
            .spawn_enemy(EnemyKind::Asteroid, Vec3::new(0.0, 0.0, -3.0), Vec3::ZERO, 0.05, None);
        session
            .effects
            .update_danger_zones(&mut session.registry, &session.player, 0.0, &tuning);
        assert_eq!(session.effects.danger_zones.len(), 1);

        assert!(session.despawn_enemy(id));
        assert!(session.registry.enemies.is_empty());
        assert!(session.effects.danger_zones.is_empty());
        assert!(!session.despawn_enemy(id));
    }

    #[test]
    fn enemy_passing_despawn_depth_takes_its_zone_along() {
        let mut sim = sim();
        let tuning = sim.tuning().clone();
        let session = sim.session_mut();
        let id = session
            .registry
            .spawn_enemy(EnemyKind::AlienShip, Vec3::new(0.0, 0.0, -3.0), Vec3::ZERO, 0.5, None);
        session
            .effects
            .update_danger_zones(&mut session.registry, &session.player, 0.0, &tuning);
        assert!(session.registry.enemy(id).unwrap().danger_zone.is_some());

        // Jump it to just short of the despawn depth with the zone still attached.
        session.registry.enemy_mut(id).unwrap().position.z = tuning.enemy_despawn_depth - 0.1;
        sim.tick(16.0, &Intent::default());

        assert!(sim.session().registry.enemy(id).is_none());
        assert!(sim.session().effects.danger_zones.is_empty());
    }

    #[test]
    fn fire_gate_allows_one_shot_per_cooldown() {
        for total in [0.0, 999.0, 1000.0, 2500.0, 4000.0] {
            let mut sim = sim();
            let mut fired = 0;
            let mut t = 0.0;
            while t <= total {
                if sim.try_fire(t).is_some() {
                    fired += 1;
                }
                t += 1.0;
            }
            assert_eq!(fired, (total / 1000.0).floor() as usize + 1, "T={total}");
        }
    }

    #[test]
    fn bullet_carries_thrust_and_spawns_behind_player() {
        let mut sim = sim();
        let events = sim.tick(0.0, &Intent::firing());
        assert!(matches!(events[0], SimEvent::Fired { .. }));
        let bullet = &sim.session().registry.bullets[0];
        assert_eq!(bullet.thrust.len(), 10);
        // Spawned at player depth + 1, then advanced once.
        assert!((bullet.position.z - (6.0 - 0.3)).abs() < 1e-5);
    }

    #[test]
    fn fifth_collision_triggers_exactly_one_game_over() {
        let mut sim = sim();
        let events = kill_player(&mut sim, 10.0);

        let healths: Vec<u32> = events
            .iter()
            .filter_map(|e| match e {
                SimEvent::HealthChanged { health } => Some(*health),
                _ => None,
            })
            .collect();
        assert_eq!(healths, vec![80, 60, 40, 20, 0]);
        let overs = events
            .iter()
            .filter(|e| matches!(e, SimEvent::GameOverStarted { .. }))
            .count();
        assert_eq!(overs, 1);
        assert_eq!(
            sim.status(),
            GameStatus::GameOver(GameOverStage::ExplosionStarted)
        );
        assert!(!sim.session().player.visible);
    }

    #[test]
    fn detonation_is_staged_and_banner_follows() {
        let mut sim = sim();
        kill_player(&mut sim, 1000.0);

        let finals = |sim: &Simulation| {
            sim.session()
                .effects
                .particles
                .iter()
                .filter(|p| p.kind == ParticleKind::FinalBurst)
                .count()
        };
        // The zero-delay stage fires in the same tick as the fatal hit.
        assert_eq!(finals(&sim), 20);
        assert_eq!(sim.session().effects.explosions.iter().filter(|e| e.kind == ExplosionKind::Final).count(), 1);

        sim.tick(1199.0, &Intent::default());
        assert_eq!(finals(&sim), 20);
        sim.tick(1200.0, &Intent::default());
        assert_eq!(finals(&sim), 40);
        sim.tick(1400.0, &Intent::default());
        assert_eq!(finals(&sim), 60);

        assert!(sim.tick(2499.0, &Intent::default()).is_empty());
        let events = sim.tick(2500.0, &Intent::default());
        assert!(events.contains(&SimEvent::ShowGameOver { score: 0 }));
        assert!(events.contains(&SimEvent::SubmitScore {
            player_name: "Pilot".into(),
            score: 0
        }));
        assert_eq!(sim.status(), GameStatus::GameOver(GameOverStage::AwaitingRestart));
    }

    #[test]
    fn gameplay_freezes_during_game_over() {
        let mut sim = sim();
        kill_player(&mut sim, 0.0);
        let before = sim.session().player.position;
        sim.tick(5000.0, &Intent { left: true, ..Intent::default() });
        assert_eq!(sim.session().player.position, before);
        assert!(sim.session().registry.enemies.is_empty());
    }

    #[test]
    fn restart_resets_everything_and_cancels_pending_tasks() {
        let mut sim = sim();
        sim.session_mut().state.score = Score(70);
        kill_player(&mut sim, 0.0);
        sim.tick(1.0, &Intent::firing());
        assert_eq!(sim.pending_tasks(), 0);
        assert!(sim.is_fresh());

        // Stale banner would have been due at 1500.
        let events = sim.tick(1600.0, &Intent::default());
        assert!(!events.iter().any(|e| matches!(e, SimEvent::ShowGameOver { .. })));
        assert!(sim.session().state.is_active());
    }

    #[test]
    fn restart_while_active_is_a_no_op() {
        let mut sim = sim();
        sim.session_mut().state.score = Score(30);
        assert!(sim.restart(10.0).is_empty());
        assert_eq!(sim.session().state.score, Score(30));
        assert_eq!(sim.session().id, SessionId(1));
    }

    #[test]
    fn holding_fire_through_death_does_not_restart() {
        let mut sim = sim();
        for _ in 0..5 {
            ram_player(&mut sim);
            sim.tick(0.0, &Intent::firing());
        }
        assert!(!sim.session().state.is_active());
        sim.tick(100.0, &Intent::firing());
        assert!(!sim.session().state.is_active());
        sim.tick(200.0, &Intent::default());
        sim.tick(300.0, &Intent::firing());
        assert!(sim.session().state.is_active());
    }

    #[test]
    fn blank_names_are_ignored() {
        let mut sim = sim();
        sim.set_player_name("   ");
        assert_eq!(sim.player_name(), "Pilot");
        sim.set_player_name("  Ace ");
        assert_eq!(sim.player_name(), "Ace");
    }

    impl Simulation {
        fn is_fresh(&self) -> bool {
            let s = self.session();
            s.state.is_active()
                && s.state.score == Score(0)
                && s.state.health.get() == 100
                && s.registry.enemies.is_empty()
                && s.registry.bullets.is_empty()
                && s.effects.is_empty()
                && s.player.visible
                && s.player.position == Vec3::new(0.0, 0.0, 5.0)
                && s.player.bank == 0.0
        }
    }
}
