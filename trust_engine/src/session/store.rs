//! Session storage with per-session locking.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use super::{Session, SessionId};

/// Shared handle to one session. Holding its lock makes the holder the
/// session's single writer.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Storage for live sessions.
///
/// Implementations must hand out the same handle for the same id until the
/// session is evicted, so that locking the handle serializes every action
/// against that session.
pub trait SessionStore: Send + Sync {
    /// Store a session, replacing any existing one with the same id in place.
    fn insert(&self, session: Session) -> SessionHandle;

    /// Get the handle for a session.
    fn get(&self, id: &SessionId) -> Option<SessionHandle>;

    /// Drop a session. Returns whether it existed.
    fn evict(&self, id: &SessionId) -> bool;

    /// Drop every session whose last committed action is at or before
    /// `cutoff`. Sessions locked by an in-flight action are kept.
    fn evict_idle(&self, cutoff: DateTime<Utc>) -> usize;

    /// Number of live sessions.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local session store.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn insert(&self, session: Session) -> SessionHandle {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(handle) = sessions.get(&session.id) {
            // Replacing the whole value discards whatever a panicked writer left.
            let mut existing = handle.lock().unwrap_or_else(PoisonError::into_inner);
            *existing = session;
            drop(existing);
            handle.clear_poison();
            return Arc::clone(handle);
        }

        let id = session.id.clone();
        let handle = Arc::new(Mutex::new(session));
        sessions.insert(id, Arc::clone(&handle));
        handle
    }

    fn get(&self, id: &SessionId) -> Option<SessionHandle> {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        sessions.get(id).cloned()
    }

    fn evict(&self, id: &SessionId) -> bool {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions.remove(id).is_some()
    }

    fn evict_idle(&self, cutoff: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();

        sessions.retain(|_, handle| match handle.try_lock() {
            Ok(session) => session.last_active > cutoff,
            // Busy or poisoned: leave it for the next sweep.
            Err(_) => true,
        });

        before - sessions.len()
    }

    fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
