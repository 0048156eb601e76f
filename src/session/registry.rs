use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::Session;

/// Shared handle to one user's session.
///
/// Holding the lock serializes every read-modify-write on that user's history.
pub type SessionHandle = Arc<tokio::sync::Mutex<Session>>;

struct Entry {
    session: SessionHandle,
    last_used: Instant,
}

/// Maps user ids to their sessions, creating them on first contact.
pub struct SessionRegistry {
    default_model: String,
    max_history: usize,
    idle_ttl: Option<Duration>,
    sessions: Mutex<HashMap<String, Entry>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    ///
    /// Sessions idle for longer than `idle_ttl` are dropped by [`Self::evict_idle`];
    /// with `None` they live for the process lifetime.
    pub fn new(
        default_model: impl Into<String>,
        max_history: usize,
        idle_ttl: Option<Duration>,
    ) -> Self {
        Self {
            default_model: default_model.into(),
            max_history,
            idle_ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Returns the user's session, creating an empty one with the default model.
    pub fn get_or_create(&self, user_id: &str) -> SessionHandle {
        let now = Instant::now();
        let mut sessions = self.lock();

        if let Some(entry) = sessions.get_mut(user_id) {
            entry.last_used = now;
            return Arc::clone(&entry.session);
        }

        tracing::debug!(user_id, model = %self.default_model, "Creating session");
        let session = Arc::new(tokio::sync::Mutex::new(Session::new(
            self.default_model.clone(),
            self.max_history,
        )));
        sessions.insert(
            user_id.to_string(),
            Entry {
                session: Arc::clone(&session),
                last_used: now,
            },
        );
        session
    }

    /// Removes sessions idle for longer than the TTL, returning how many were dropped.
    ///
    /// Sessions with an outstanding handle are in use and are kept.
    pub fn evict_idle(&self, now: Instant) -> usize {
        let Some(ttl) = self.idle_ttl else {
            return 0;
        };

        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, entry| {
            let idle = now.saturating_duration_since(entry.last_used);
            idle <= ttl || Arc::strong_count(&entry.session) > 1
        });
        let evicted = before - sessions.len();

        if evicted > 0 {
            tracing::info!(evicted, remaining = sessions.len(), "Evicted idle sessions");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        // The map holds no invariant a panicking holder could break.
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
