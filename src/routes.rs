//! Route table and navigation.
//!
//! Each top-level path names the guard that protects it. Navigation applies
//! the guard, follows any redirect it produces, and stops at the first page
//! that is allowed. Unknown paths fall back to the landing route, which then
//! goes through its own guard.

use url::form_urlencoded;

use crate::auth::guard::{self, GuardKind, GuardOutcome, LANDING_PATH, RETURN_URL_PARAM, SessionAuthority};

/// Redirect hops followed before navigation gives up.
pub const MAX_REDIRECTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Login,
    Dashboard,
    Users,
    Institutions,
    Reports,
}

impl Page {
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Login => "Iniciar sesión",
            Self::Dashboard => "Panel principal",
            Self::Users => "Usuarios",
            Self::Institutions => "Instituciones",
            Self::Reports => "Reportes",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteEntry {
    /// First path segment without slashes; `""` is the root.
    pub segment: &'static str,
    pub guard: GuardKind,
    /// `None` for entries that only ever redirect.
    pub page: Option<Page>,
}

pub const ROUTES: &[RouteEntry] = &[
    RouteEntry { segment: "", guard: GuardKind::Redirect, page: None },
    RouteEntry { segment: "login", guard: GuardKind::Public, page: Some(Page::Login) },
    RouteEntry { segment: "dashboard", guard: GuardKind::Protected, page: Some(Page::Dashboard) },
    RouteEntry { segment: "users", guard: GuardKind::Protected, page: Some(Page::Users) },
    RouteEntry { segment: "institutions", guard: GuardKind::Protected, page: Some(Page::Institutions) },
    RouteEntry { segment: "reports", guard: GuardKind::Protected, page: Some(Page::Reports) },
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("too many redirects navigating to {url}")]
    TooManyRedirects { url: String },
}

/// Where navigation ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub page: Page,
    /// Final URL, path plus query.
    pub url: String,
    /// Number of redirects followed to get here.
    pub hops: usize,
}

impl Resolved {
    #[must_use]
    pub fn return_url(&self) -> Option<String> {
        return_url_of(&self.url)
    }
}

/// Split `url` into path and optional query.
#[must_use]
pub fn split_url(url: &str) -> (&str, Option<&str>) {
    match url.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (url, None),
    }
}

#[must_use]
pub fn lookup(path: &str) -> Option<&'static RouteEntry> {
    let segment = path.trim_matches('/');
    ROUTES.iter().find(|entry| entry.segment == segment)
}

/// The `returnUrl` query parameter of `url`. Only in-app paths are accepted.
#[must_use]
pub fn return_url_of(url: &str) -> Option<String> {
    let (_, query) = split_url(url);
    form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == RETURN_URL_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| is_app_path(value))
}

/// Absolute in-app path: starts with one `/`, no scheme or host.
#[must_use]
pub fn is_app_path(value: &str) -> bool {
    value.starts_with('/') && !value.starts_with("//")
}

/// Resolve a navigation to `url`, applying guards and following redirects.
///
/// # Errors
///
/// Returns [`RouteError::TooManyRedirects`] if guards keep redirecting past
/// [`MAX_REDIRECTS`].
pub fn navigate(authority: &dyn SessionAuthority, url: &str) -> Result<Resolved, RouteError> {
    let mut current = url.to_owned();
    for hops in 0..=MAX_REDIRECTS {
        let (path, _) = split_url(&current);
        let Some(entry) = lookup(path) else {
            tracing::debug!(url = %current, "unknown route; falling back to landing");
            current = LANDING_PATH.to_owned();
            continue;
        };

        match guard::evaluate(authority, entry.guard, &current) {
            GuardOutcome::Allow => match entry.page {
                Some(page) => return Ok(Resolved { page, url: current, hops }),
                None => current = LANDING_PATH.to_owned(),
            },
            GuardOutcome::Redirect(nav) => current = nav.to_url(),
        }
    }
    tracing::warn!(url, "navigation exceeded redirect limit");
    Err(RouteError::TooManyRedirects { url: url.to_owned() })
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
