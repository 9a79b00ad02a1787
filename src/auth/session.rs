//! In-memory session state with a single writer.
//!
//! DESIGN
//! ======
//! `SessionHolder` wraps a `tokio::sync::watch` sender. The only mutation is
//! `update(SessionPatch)`, which merges a partial state inside
//! `send_modify`; concurrent callers are serialized and readers always get a
//! whole snapshot. Subscribers observe each committed state.
//!
//! TRADE-OFFS
//! ==========
//! Two in-flight operations that finish out of order (a slow login response
//! landing after a 401-triggered logout) resolve last-write-wins. There is no
//! versioning.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::api::User;

/// Where the session is in its lifecycle. Derived from `SessionState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionPhase {
    Unauthenticated,
    Authenticating,
    Authenticated,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub is_authenticated: bool,
    pub user: Option<User>,
    pub token: Option<String>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl SessionState {
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.is_loading {
            SessionPhase::Authenticating
        } else if self.is_authenticated {
            SessionPhase::Authenticated
        } else if self.error.is_some() {
            SessionPhase::Error
        } else {
            SessionPhase::Unauthenticated
        }
    }
}

/// Partial state. `None` leaves a field untouched; nullable fields use a
/// nested `Option` so they can be cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionPatch {
    pub is_authenticated: Option<bool>,
    pub user: Option<Option<User>>,
    pub token: Option<Option<String>>,
    pub is_loading: Option<bool>,
    pub error: Option<Option<String>>,
}

impl SessionPatch {
    /// Every field reset to the logged-out state.
    #[must_use]
    pub fn logged_out() -> Self {
        Self {
            is_authenticated: Some(false),
            user: Some(None),
            token: Some(None),
            is_loading: Some(false),
            error: Some(None),
        }
    }

    #[must_use]
    pub fn authenticated(user: User, token: String) -> Self {
        Self {
            is_authenticated: Some(true),
            user: Some(Some(user)),
            token: Some(Some(token)),
            is_loading: Some(false),
            error: Some(None),
        }
    }

    /// Loading on, previous error cleared.
    #[must_use]
    pub fn loading() -> Self {
        Self { is_loading: Some(true), error: Some(None), ..Self::default() }
    }

    /// Loading off with an error message; everything else untouched.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self { is_loading: Some(false), error: Some(Some(message.into())), ..Self::default() }
    }

    fn apply(self, state: &mut SessionState) {
        if let Some(v) = self.is_authenticated {
            state.is_authenticated = v;
        }
        if let Some(v) = self.user {
            state.user = v;
        }
        if let Some(v) = self.token {
            state.token = v;
        }
        if let Some(v) = self.is_loading {
            state.is_loading = v;
        }
        if let Some(v) = self.error {
            state.error = v;
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionHolder {
    tx: Arc<watch::Sender<SessionState>>,
}

impl Default for SessionHolder {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHolder {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionState::default());
        Self { tx: Arc::new(tx) }
    }

    /// The single write path. Merges `patch` into the current state.
    pub fn update(&self, patch: SessionPatch) {
        self.tx.send_modify(|state| {
            let before = state.phase();
            patch.apply(state);
            let after = state.phase();
            if before != after {
                tracing::debug!(?before, ?after, "session phase changed");
            }
        });
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    /// Receiver that sees every committed state, starting from the current one.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.tx.borrow().phase()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_authenticated
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.tx.borrow().user.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.tx.borrow().is_loading
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.tx.borrow().error.clone()
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
