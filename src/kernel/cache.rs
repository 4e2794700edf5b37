use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use super::persist::{RecordSink, RecordSource, STATE_FORMAT_VERSION, STATE_RECORD_LABEL};
use super::state::ActorFlaskState;
use super::time::{Clock, Millis, DEFAULT_IDLE_THRESHOLD_MS};
use crate::error::PersistError;

/// Stable numeric identity of an actor, as handed out by the host.
pub type ActorId = u32;

/// The one flask-state store of a running system.
///
/// Every operation, lookups included, runs under a single mutex because
/// entries are mutated in place. Callers get a `&mut ActorFlaskState` only for
/// the duration of the closure they pass in.
pub struct FlaskStateCache {
    actors: Mutex<HashMap<ActorId, ActorFlaskState>>,
    clock: Arc<dyn Clock>,
    idle_threshold: Millis,
}

impl FlaskStateCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            actors: Mutex::new(HashMap::new()),
            clock,
            idle_threshold: DEFAULT_IDLE_THRESHOLD_MS,
        }
    }

    pub fn with_idle_threshold(mut self, idle_threshold: Millis) -> Self {
        self.idle_threshold = idle_threshold;
        self
    }

    pub fn idle_threshold(&self) -> Millis {
        self.idle_threshold
    }

    pub fn now(&self) -> Millis {
        self.clock.now_ms()
    }

    // A panic inside a caller's closure leaves plain-old-data behind; keep serving it.
    fn lock(&self) -> MutexGuard<'_, HashMap<ActorId, ActorFlaskState>> {
        self.actors.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` on the actor's entry, inserting a default one if absent.
    /// Does not touch the entry's timestamp.
    pub fn get_or_create<R>(&self, id: ActorId, f: impl FnOnce(&mut ActorFlaskState) -> R) -> R {
        let mut actors = self.lock();
        f(actors.entry(id).or_default())
    }

    /// Read-only access that never inserts.
    pub fn inspect<R>(&self, id: ActorId, f: impl FnOnce(&ActorFlaskState) -> R) -> Option<R> {
        self.lock().get(&id).map(f)
    }

    pub fn snapshot(&self, id: ActorId) -> Option<ActorFlaskState> {
        self.inspect(id, ActorFlaskState::clone)
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.lock().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn actor_ids(&self) -> Vec<ActorId> {
        self.lock().keys().copied().collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Drops every entry idle for `idle_threshold` or longer. Returns the count removed.
    pub fn evict_stale(&self, now: Millis, idle_threshold: Millis) -> usize {
        sweep(&mut self.lock(), now, idle_threshold)
    }

    /// Writes the labeled flask-state record. Stale entries are evicted first.
    ///
    /// Stops at the first rejected write; whatever reached the sink is left
    /// for the host to discard.
    pub fn save<S: RecordSink + ?Sized>(&self, sink: &mut S) -> Result<usize, PersistError> {
        let mut actors = self.lock();
        match self.write_record(&mut actors, sink) {
            Ok(saved) => {
                info!(actors = saved, "flask state saved");
                Ok(saved)
            }
            Err(e) => {
                warn!(error = %e, "flask state save aborted");
                Err(e)
            }
        }
    }

    fn write_record<S: RecordSink + ?Sized>(
        &self,
        actors: &mut HashMap<ActorId, ActorFlaskState>,
        sink: &mut S,
    ) -> Result<usize, PersistError> {
        if !sink.open_record(STATE_RECORD_LABEL, STATE_FORMAT_VERSION) {
            return Err(PersistError::RecordRefused { label: STATE_RECORD_LABEL });
        }

        sweep(actors, self.clock.now_ms(), self.idle_threshold);

        bincode::serialize_into(&mut *sink, &STATE_FORMAT_VERSION)?;
        bincode::serialize_into(&mut *sink, &(actors.len() as u64))?;
        for (id, state) in actors.iter() {
            bincode::serialize_into(&mut *sink, id)?;
            bincode::serialize_into(&mut *sink, state)?;
        }
        Ok(actors.len())
    }

    /// Clears the cache and restores it from the labeled record.
    ///
    /// A version mismatch or an unreadable header leaves the cache empty and
    /// returns the error. A truncated entry list keeps every fully-read pair.
    /// Restored entries are stamped with the current time so the idle sweep
    /// measures from the moment of loading.
    pub fn load<S: RecordSource + ?Sized>(&self, source: &mut S) -> Result<usize, PersistError> {
        let mut actors = self.lock();
        actors.clear();
        let now = self.clock.now_ms();

        while let Some(header) = source.next_record() {
            if header.label != STATE_RECORD_LABEL {
                continue;
            }

            let version: u32 = bincode::deserialize_from(&mut *source)?;
            if version != STATE_FORMAT_VERSION {
                warn!(found = version, expected = STATE_FORMAT_VERSION, "discarding flask state of unknown version");
                return Err(PersistError::VersionMismatch {
                    found: version,
                    expected: STATE_FORMAT_VERSION,
                });
            }

            let count: u64 = match bincode::deserialize_from(&mut *source) {
                Ok(count) => count,
                Err(e) => {
                    warn!(error = %e, "flask state record has no entry count");
                    break;
                }
            };

            for restored in 0..count {
                match read_entry(&mut *source) {
                    Ok((id, mut state)) => {
                        state.touch(now);
                        actors.insert(id, state);
                    }
                    Err(e) => {
                        warn!(restored, expected = count, error = %e, "flask state record truncated");
                        break;
                    }
                }
            }
        }

        info!(actors = actors.len(), "flask state restored");
        Ok(actors.len())
    }
}

fn read_entry<S: RecordSource + ?Sized>(source: &mut S) -> bincode::Result<(ActorId, ActorFlaskState)> {
    let id: ActorId = bincode::deserialize_from(&mut *source)?;
    let state: ActorFlaskState = bincode::deserialize_from(&mut *source)?;
    Ok((id, state))
}

// Victims are collected before removal so the map is never mutated mid-iteration.
fn sweep(actors: &mut HashMap<ActorId, ActorFlaskState>, now: Millis, idle_threshold: Millis) -> usize {
    let victims: Vec<ActorId> = actors
        .iter()
        .filter(|(_, state)| now.saturating_sub(state.last_touched) >= idle_threshold)
        .map(|(id, _)| *id)
        .collect();

    for id in &victims {
        actors.remove(id);
    }

    if !victims.is_empty() {
        debug!(evicted = victims.len(), remaining = actors.len(), "evicted stale flask entries");
    }
    victims.len()
}
