//! Request authenticator: bearer attachment and 401 teardown.
//!
//! ARCHITECTURE
//! ============
//! Every request the `ApiClient` sends passes through `RequestAuthenticator`.
//! Excluded endpoints (sign-in, forgot-password) go out untouched. Anything
//! else gets `Authorization: Bearer <token>` when a token is stored. A 401
//! from a non-excluded endpoint runs the local logout synchronously and then
//! hands the response back, so the caller still sees the failure and any
//! guard evaluated afterwards sees the logged-out state.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Request, Response, StatusCode};

use super::token::TokenStore;
use crate::api::endpoints;

/// Source of the token value used to build the bearer header.
pub trait TokenProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

impl TokenProvider for TokenStore {
    fn bearer_token(&self) -> Option<String> {
        self.get_token()
    }
}

/// Local session teardown triggered by an authentication failure.
pub trait LogoutHandler: Send + Sync {
    /// Must finish all local cleanup before returning.
    fn force_logout(&self);
}

/// Path fragments that never receive a bearer header and never trigger teardown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthExcludedEndpoints {
    fragments: Vec<&'static str>,
}

impl Default for AuthExcludedEndpoints {
    fn default() -> Self {
        // `/auth/sign-in` also covers `/auth/sign-in-admin`.
        Self { fragments: vec![endpoints::auth::LOGIN, endpoints::auth::FORGOT_PASSWORD] }
    }
}

impl AuthExcludedEndpoints {
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        self.fragments.iter().any(|fragment| url.contains(fragment))
    }

    #[must_use]
    pub fn fragments(&self) -> &[&'static str] {
        &self.fragments
    }
}

#[derive(Clone)]
pub struct RequestAuthenticator {
    excluded: AuthExcludedEndpoints,
    tokens: Arc<dyn TokenProvider>,
    on_unauthorized: Arc<dyn LogoutHandler>,
}

impl RequestAuthenticator {
    #[must_use]
    pub fn new(tokens: Arc<dyn TokenProvider>, on_unauthorized: Arc<dyn LogoutHandler>) -> Self {
        Self { excluded: AuthExcludedEndpoints::default(), tokens, on_unauthorized }
    }

    #[must_use]
    pub fn excluded(&self) -> &AuthExcludedEndpoints {
        &self.excluded
    }

    /// Stamp the bearer header onto an outgoing request when it needs one.
    #[must_use]
    pub fn prepare(&self, mut request: Request) -> Request {
        if self.excluded.matches(request.url().as_str()) {
            return request;
        }
        let Some(token) = self.tokens.bearer_token() else {
            return request;
        };
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers_mut().insert(AUTHORIZATION, value);
            }
            Err(e) => tracing::warn!(error = %e, "stored token is not a valid header value; sending unauthenticated"),
        }
        request
    }

    /// React to a response. A 401 from a non-excluded endpoint tears down the
    /// local session before the response is returned unchanged.
    pub fn inspect(&self, url: &str, response: Response) -> Response {
        if response.status() == StatusCode::UNAUTHORIZED && !self.excluded.matches(url) {
            tracing::warn!(%url, "authentication rejected by server; logging out");
            self.on_unauthorized.force_logout();
        }
        response
    }

    /// Prepare, send, and inspect in one step.
    ///
    /// # Errors
    ///
    /// Propagates transport errors from `client` untouched.
    pub async fn execute(&self, client: &reqwest::Client, request: Request) -> Result<Response, reqwest::Error> {
        let url = request.url().to_string();
        let request = self.prepare(request);
        let response = client.execute(request).await?;
        Ok(self.inspect(&url, response))
    }
}

#[cfg(test)]
#[path = "interceptor_test.rs"]
mod tests;
