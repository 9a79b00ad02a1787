//! Route guards.
//!
//! Every guard reconciles the session with storage before deciding, so an
//! expired token is caught at navigation time without a network call.

use url::form_urlencoded;

pub const LOGIN_PATH: &str = "/login";
pub const LANDING_PATH: &str = "/dashboard";
pub const RETURN_URL_PARAM: &str = "returnUrl";

/// The part of the auth gateway a guard needs.
pub trait SessionAuthority: Send + Sync {
    fn check_auth_status(&self);
    fn is_authenticated(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardKind {
    /// Authenticated users only; others go to login with a return URL.
    Protected,
    /// Unauthenticated users only; others go to the landing route.
    Public,
    /// Entry route: always redirects, to landing or login.
    Redirect,
}

/// Where to send the user instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub path: String,
    pub return_url: Option<String>,
}

impl Navigation {
    #[must_use]
    pub fn to(path: impl Into<String>) -> Self {
        Self { path: path.into(), return_url: None }
    }

    #[must_use]
    pub fn login_returning_to(requested: &str) -> Self {
        Self { path: LOGIN_PATH.to_owned(), return_url: Some(requested.to_owned()) }
    }

    /// Path plus query, e.g. `/login?returnUrl=%2Fusers`.
    #[must_use]
    pub fn to_url(&self) -> String {
        match &self.return_url {
            Some(ret) => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair(RETURN_URL_PARAM, ret)
                    .finish();
                format!("{}?{query}", self.path)
            }
            None => self.path.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow,
    Redirect(Navigation),
}

impl GuardOutcome {
    #[must_use]
    pub fn allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Evaluate `kind` for a navigation to `requested` (path plus query).
pub fn evaluate(authority: &dyn SessionAuthority, kind: GuardKind, requested: &str) -> GuardOutcome {
    authority.check_auth_status();
    let authenticated = authority.is_authenticated();

    let outcome = match (kind, authenticated) {
        (GuardKind::Protected, true) | (GuardKind::Public, false) => GuardOutcome::Allow,
        (GuardKind::Protected, false) => GuardOutcome::Redirect(Navigation::login_returning_to(requested)),
        (GuardKind::Public, true) | (GuardKind::Redirect, true) => GuardOutcome::Redirect(Navigation::to(LANDING_PATH)),
        (GuardKind::Redirect, false) => GuardOutcome::Redirect(Navigation::to(LOGIN_PATH)),
    };
    tracing::debug!(?kind, requested, authenticated, allowed = outcome.allowed(), "guard evaluated");
    outcome
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
