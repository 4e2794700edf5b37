use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Milliseconds on a monotonic clock. Only differences are meaningful.
pub type Millis = u64;

/// Idle time after which an actor entry is considered stale.
pub const DEFAULT_IDLE_THRESHOLD_MS: Millis = 5_000;

/// Source of "now" for eviction bookkeeping.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> Millis;
}

/// Real time, counted from construction.
#[derive(Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> Millis {
        self.origin.elapsed().as_millis() as Millis
    }
}

/// Hand-driven clock for simulations and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    ms: AtomicU64,
}

impl ManualClock {
    pub fn new(start: Millis) -> Self {
        Self { ms: AtomicU64::new(start) }
    }

    pub fn advance(&self, by: Millis) {
        self.ms.fetch_add(by, Ordering::SeqCst);
    }

    pub fn set(&self, to: Millis) {
        self.ms.store(to, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.ms.load(Ordering::SeqCst)
    }
}
