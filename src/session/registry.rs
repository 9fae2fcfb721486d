use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use super::Session;
use crate::models::SessionInfo;

/// All live sessions, one per connected user.
///
/// Sessions never share state. The lock guards only the map and is held
/// for one synchronous store operation at a time, never across a call to
/// an external service.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<Uuid, Session>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open a fresh, empty session.
    pub fn create(&self) -> SessionInfo {
        let session = Session::new();
        let info = session.info();
        let mut sessions = self.lock();
        sessions.insert(session.id(), session);
        tracing::info!(session_id = %info.id, "session opened");
        info
    }

    /// Run `f` against the session with `id`, refreshing its idle timer.
    ///
    /// Returns `None` if no such session exists.
    pub fn with_session<R>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        let mut sessions = self.lock();
        sessions.get_mut(&id).map(|session| {
            session.touch();
            f(session)
        })
    }

    /// Whether a session with `id` is live. Does not refresh its idle timer.
    pub fn contains(&self, id: Uuid) -> bool {
        self.lock().contains_key(&id)
    }

    /// End the session with `id`. Returns `false` if it did not exist.
    pub fn remove(&self, id: Uuid) -> bool {
        let mut sessions = self.lock();
        let removed = sessions.remove(&id).is_some();
        if removed {
            tracing::info!(session_id = %id, "session closed");
        }
        removed
    }

    /// Drop sessions idle for longer than `max_idle`. Returns how many went.
    pub fn expire_idle(&self, max_idle: Duration) -> usize {
        let max_idle =
            chrono::Duration::from_std(max_idle).unwrap_or_else(|_| chrono::Duration::weeks(52));
        let cutoff = Utc::now() - max_idle;
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, session| session.last_seen() > cutoff);
        let expired = before - sessions.len();
        if expired > 0 {
            tracing::info!(expired, remaining = sessions.len(), "expired idle sessions");
        }
        expired
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Periodically expire idle sessions until the runtime shuts down.
    pub fn spawn_sweeper(
        &self,
        max_idle: Duration,
        every: Duration,
    ) -> tokio::task::JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                registry.expire_idle(max_idle);
            }
        })
    }
}
