//! In-process session manager.
//!
//! Sessions are keyed by the id carried in the client's session cookie. The
//! manager guarantees a single session object per id, and every mutation
//! happens under its write lock so concurrent requests for the same client
//! never overwrite each other's changes.

use chrono::Duration;
use cloudgate_core::SessionId;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::session::Session;

/// Owner of all live sessions.
#[derive(Debug)]
pub struct SessionManager {
    sessions: RwLock<HashMap<SessionId, Session>>,
    idle_timeout: Duration,
}

impl SessionManager {
    /// Creates a session manager that expires sessions idle for longer than
    /// `idle_timeout`.
    #[must_use]
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    /// Returns the configured idle timeout.
    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Looks up a live session and marks it as used.
    ///
    /// An idle session is removed and reported as absent.
    pub async fn find(&self, id: &SessionId) -> Option<Session> {
        let mut sessions = self.sessions.write().await;
        self.live_entry(&mut sessions, id).map(|session| {
            session.touch();
            session.clone()
        })
    }

    /// Returns the client's session, creating a fresh one when the client
    /// presented no id or an id that is unknown or expired.
    ///
    /// The boolean is true when a new session was created, so the caller
    /// knows to hand the new id back to the client.
    pub async fn get_or_create(&self, id: Option<&SessionId>) -> (Session, bool) {
        let mut sessions = self.sessions.write().await;

        if let Some(id) = id
            && let Some(session) = self.live_entry(&mut sessions, id)
        {
            session.touch();
            return (session.clone(), false);
        }

        let session = Session::new(SessionId::new());
        debug!(session_id = %session.id(), "created session");
        sessions.insert(session.id(), session.clone());
        (session, true)
    }

    /// Applies `f` to a live session and returns the updated snapshot.
    ///
    /// Returns `None` without calling `f` if the session does not exist.
    pub async fn update<F>(&self, id: &SessionId, f: F) -> Option<Session>
    where
        F: FnOnce(&mut Session),
    {
        let mut sessions = self.sessions.write().await;
        self.live_entry(&mut sessions, id).map(|session| {
            f(session);
            session.touch();
            session.clone()
        })
    }

    /// Stores a session, replacing any session with the same id.
    pub async fn insert(&self, session: Session) {
        self.sessions.write().await.insert(session.id(), session);
    }

    /// Removes a session. Returns true if it existed.
    pub async fn remove(&self, id: &SessionId) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Removes every idle session and returns how many were dropped.
    pub async fn delete_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_idle(self.idle_timeout));
        before - sessions.len()
    }

    /// Returns the number of stored sessions, including idle ones not yet
    /// cleaned up.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Returns true if no sessions are stored.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    fn live_entry<'a>(
        &self,
        sessions: &'a mut HashMap<SessionId, Session>,
        id: &SessionId,
    ) -> Option<&'a mut Session> {
        let idle = sessions
            .get(id)
            .is_some_and(|session| session.is_idle(self.idle_timeout));
        if idle {
            debug!(session_id = %id, "dropping idle session");
            sessions.remove(id);
            return None;
        }
        sessions.get_mut(id)
    }
}
