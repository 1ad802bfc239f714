//! Client sessions.
//!
//! A session is the identity and state holder for one client. It is created
//! anonymously on the first request that needs it and later gains a user
//! when sign-in completes. The session manager owns every session; callers
//! work with snapshots and mutate through [`SessionManager::update`].
//!
//! [`SessionManager::update`]: crate::manager::SessionManager::update

use chrono::{DateTime, Duration, Utc};
use cloudgate_core::SessionId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Where a pending sign-in was started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignInState {
    /// The client was sent to an external identity provider by the global
    /// single sign-on redirect and has not returned yet.
    Global,
}

/// An active client session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier for this session.
    id: SessionId,
    /// The authenticated user, if sign-in has completed.
    user_id: Option<String>,
    /// Permission tags held by the authenticated user.
    permissions: BTreeSet<String>,
    /// Pending sign-in marker.
    sign_in_state: Option<SignInState>,
    /// Anti-forgery state sent to the identity provider with the pending
    /// sign-in.
    sign_in_csrf: Option<String>,
    /// When the session was created.
    created_at: DateTime<Utc>,
    /// When the session was last used.
    last_accessed_at: DateTime<Utc>,
}

impl Session {
    /// Creates a new anonymous session.
    #[must_use]
    pub fn new(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id: None,
            permissions: BTreeSet::new(),
            sign_in_state: None,
            sign_in_csrf: None,
            created_at: now,
            last_accessed_at: now,
        }
    }

    /// Creates a session that is already signed in.
    #[must_use]
    pub fn authenticated<I, P>(id: SessionId, user_id: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let mut session = Self::new(id);
        session.sign_in(user_id, permissions);
        session
    }

    /// Returns the session ID.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the authenticated user's ID, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Returns true if a user has signed in on this session.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    /// Returns the permission tags held by the session's user.
    #[must_use]
    pub fn permissions(&self) -> &BTreeSet<String> {
        &self.permissions
    }

    /// Returns true if the session's user holds the given permission.
    ///
    /// Anonymous sessions hold no permissions.
    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.is_authenticated() && self.permissions.contains(permission)
    }

    /// Returns the pending sign-in marker, if any.
    #[must_use]
    pub fn sign_in_state(&self) -> Option<SignInState> {
        self.sign_in_state
    }

    /// Returns the anti-forgery state of the pending sign-in, if any.
    #[must_use]
    pub fn sign_in_csrf(&self) -> Option<&str> {
        self.sign_in_csrf.as_deref()
    }

    /// Records that a sign-in is pending, along with the anti-forgery state
    /// the provider's callback must echo back.
    pub fn begin_sign_in(&mut self, state: SignInState, csrf: Option<String>) {
        self.sign_in_state = Some(state);
        self.sign_in_csrf = csrf;
    }

    /// Attaches an authenticated user and clears any pending sign-in.
    pub fn sign_in<I, P>(&mut self, user_id: impl Into<String>, permissions: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.user_id = Some(user_id.into());
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self.sign_in_state = None;
        self.sign_in_csrf = None;
    }

    /// Returns when the session was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the session was last used.
    #[must_use]
    pub fn last_accessed_at(&self) -> DateTime<Utc> {
        self.last_accessed_at
    }

    /// Marks the session as used now.
    pub fn touch(&mut self) {
        self.last_accessed_at = Utc::now();
    }

    /// Returns true if the session has been idle for longer than `timeout`.
    #[must_use]
    pub fn is_idle(&self, timeout: Duration) -> bool {
        Utc::now() - self.last_accessed_at > timeout
    }
}
