//! Per-visitor navigation state for long-running front ends.
//!
//! Sessions live in memory only. The registry is bounded; when it is full the
//! session that was touched longest ago is dropped to make room.

use crate::NavigationState;
use parking_lot::RwLock;
use rand::{Rng, distributions::Alphanumeric, thread_rng};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

pub const MAX_SESSION_COUNT: usize = 4096;
const SESSION_ID_LENGTH: usize = 24;

#[derive(Clone)]
pub struct SessionRegistry {
    shared: Arc<RwLock<RegistryData>>,
}

struct RegistryData {
    sessions: HashMap<String, SessionEntry>,
    capacity: usize,
    tick: u64,
}

struct SessionEntry {
    state: NavigationState,
    last_seen: u64,
    created_at: u64,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_capacity(MAX_SESSION_COUNT)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            shared: Arc::new(RwLock::new(RegistryData {
                sessions: HashMap::new(),
                capacity: capacity.max(1),
                tick: 0,
            })),
        }
    }

    /// Runs `f` against the session's state, creating a fresh one on first use.
    pub fn with_session<R>(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut NavigationState) -> R,
    ) -> R {
        let mut guard = self.shared.write();
        guard.tick = guard.tick.wrapping_add(1);
        let tick = guard.tick;

        if guard.sessions.len() >= guard.capacity && !guard.sessions.contains_key(session_id) {
            if let Some(oldest) = oldest_session_key(&guard.sessions) {
                debug!(session = %oldest, "evicting least recently used session");
                guard.sessions.remove(&oldest);
            }
        }

        let entry = guard
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionEntry {
                state: NavigationState::new(),
                last_seen: tick,
                created_at: now_ts(),
            });
        entry.last_seen = tick;
        f(&mut entry.state)
    }

    /// Snapshot of a session's state, if the session is known.
    pub fn snapshot(&self, session_id: &str) -> Option<NavigationState> {
        let guard = self.shared.read();
        guard
            .sessions
            .get(session_id)
            .map(|entry| entry.state.clone())
    }

    /// Seconds since the epoch at which the session was first seen.
    pub fn created_at(&self, session_id: &str) -> Option<u64> {
        let guard = self.shared.read();
        guard.sessions.get(session_id).map(|entry| entry.created_at)
    }

    pub fn len(&self) -> usize {
        self.shared.read().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn oldest_session_key(sessions: &HashMap<String, SessionEntry>) -> Option<String> {
    sessions
        .iter()
        .min_by_key(|(_, entry)| entry.last_seen)
        .map(|(key, _)| key.clone())
}

fn now_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

pub fn generate_session_id() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LENGTH)
        .map(char::from)
        .collect()
}
