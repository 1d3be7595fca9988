use serde::{Deserialize, Serialize};

// ── Newtypes ────────────────────────────────────────────────────────

/// Identity of an enemy, bullet or effect inside one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EntityId(pub u64);

/// Monotonic id source. Ids are never reused within a session.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        self.next += 1;
        EntityId(self.next)
    }
}

/// Player health. Always clamped to [0, max].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Health(u32);

impl Health {
    pub fn new(v: u32, max: u32) -> Self {
        Self(v.min(max))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn sub_clamped(self, delta: u32) -> Self {
        Self(self.0.saturating_sub(delta))
    }

    pub fn is_depleted(self) -> bool {
        self.0 == 0
    }
}

/// Non-negative score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Score(pub u32);

impl Score {
    pub fn add(self, points: u32) -> Self {
        Self(self.0.saturating_add(points))
    }
}

/// Wall-clock milliseconds since the host clock's origin.
pub type Millis = f64;
