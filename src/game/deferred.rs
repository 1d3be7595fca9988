use bevy::prelude::*;

use super::types::Millis;

/// Identifies one play session; bumped on every restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SessionId(pub u64);

impl SessionId {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Work scheduled against wall-clock time, outside the normal tick order.
#[derive(Debug, Clone, PartialEq)]
pub enum DeferredTask {
    /// One stage of the prolonged detonation at the player's last position.
    FinalBurst { position: Vec3 },
    /// Show the game-over banner and submit the score.
    ShowGameOver,
}

#[derive(Debug, Clone)]
struct Scheduled {
    session: SessionId,
    due: Millis,
    task: DeferredTask,
}

/// Deferred-task queue keyed by session, so a restart can invalidate
/// everything a previous session left behind.
#[derive(Debug, Default)]
pub struct DeferredQueue {
    pending: Vec<Scheduled>,
}

impl DeferredQueue {
    pub fn schedule(&mut self, session: SessionId, due: Millis, task: DeferredTask) {
        self.pending.push(Scheduled { session, due, task });
    }

    /// Drop every pending task of `session`. Returns how many were cancelled.
    pub fn cancel_session(&mut self, session: SessionId) -> usize {
        let before = self.pending.len();
        self.pending.retain(|s| s.session != session);
        before - self.pending.len()
    }

    /// Remove and return tasks of `session` due at `now`, in due order.
    /// Tasks of any other session are discarded.
    pub fn drain_due(&mut self, session: SessionId, now: Millis) -> Vec<DeferredTask> {
        let stale = self.pending.iter().filter(|s| s.session != session).count();
        if stale > 0 {
            warn!("discarding {stale} deferred task(s) from a previous session");
            self.pending.retain(|s| s.session == session);
        }

        let mut due: Vec<Scheduled> = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due <= now {
                due.push(self.pending.remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| a.due.total_cmp(&b.due));
        due.into_iter().map(|s| s.task).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
