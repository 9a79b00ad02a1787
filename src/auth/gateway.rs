//! Auth gateway: login, logout, password flows, and session reconciliation.
//!
//! The gateway is the only component that moves the session between
//! authenticated and unauthenticated on purpose. It writes the token store
//! and the session holder together so the two never disagree for longer
//! than one call.
//!
//! ERROR HANDLING
//! ==============
//! Every network failure comes back as a typed `AuthError` with a
//! user-facing message; nothing here panics or leaks a transport error.
//! Logout is the exception: it cannot fail. Local teardown always happens
//! and the server call afterwards is best-effort.

use std::sync::Arc;

use reqwest::Method;

use super::guard::SessionAuthority;
use super::interceptor::{LogoutHandler, RequestAuthenticator};
use super::session::{SessionHolder, SessionPatch, SessionPhase, SessionState};
use super::storage::KeyValueStore;
use super::token::TokenStore;
use crate::api::endpoints::auth as endpoints;
use crate::api::error::{MSG_AUTH_GENERIC, MSG_UNEXPECTED_RESPONSE};
use crate::api::{ApiClient, ApiError, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, LoginResponse, User};
use crate::config::ClientConfig;

pub const MSG_REQUIRED: &str = "Este campo es requerido";

/// Failures surfaced by the gateway share the API error taxonomy.
pub type AuthError = ApiError;

/// Result of a logout. Local teardown has always happened by the time this
/// is returned; `remote_acknowledged` only reports the courtesy call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoutAck {
    pub remote_acknowledged: bool,
}

// =============================================================================
// SESSION TEARDOWN
// =============================================================================

/// Clears durable auth data and resets the holder in one synchronous step.
#[derive(Debug, Clone)]
pub struct SessionTeardown {
    tokens: TokenStore,
    session: SessionHolder,
}

impl SessionTeardown {
    #[must_use]
    pub fn new(tokens: TokenStore, session: SessionHolder) -> Self {
        Self { tokens, session }
    }

    pub fn run(&self) {
        self.tokens.clear_auth_data();
        self.session.update(SessionPatch::logged_out());
    }
}

impl LogoutHandler for SessionTeardown {
    fn force_logout(&self) {
        self.run();
    }
}

// =============================================================================
// AUTH GATEWAY
// =============================================================================

#[derive(Clone)]
pub struct AuthGateway {
    api: ApiClient,
    tokens: TokenStore,
    session: SessionHolder,
    teardown: SessionTeardown,
}

impl AuthGateway {
    /// Wire a gateway, its API client, and the request authenticator over
    /// one storage medium. The session is initialized from storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn connect(config: Arc<ClientConfig>, storage: Arc<dyn KeyValueStore>) -> Result<Self, reqwest::Error> {
        let tokens = TokenStore::new(storage);
        let session = SessionHolder::new();
        let teardown = SessionTeardown::new(tokens.clone(), session.clone());
        let authenticator = RequestAuthenticator::new(Arc::new(tokens.clone()), Arc::new(teardown));
        let api = ApiClient::new(config, authenticator)?;
        Ok(Self::new(api, tokens, session))
    }

    /// Build from existing parts. `api` should authenticate requests with a
    /// teardown over the same `tokens` and `session`.
    #[must_use]
    pub fn new(api: ApiClient, tokens: TokenStore, session: SessionHolder) -> Self {
        let teardown = SessionTeardown::new(tokens.clone(), session.clone());
        let gateway = Self { api, tokens, session, teardown };
        gateway.initialize();
        gateway
    }

    /// Load the session from storage: authenticated only with a non-expired
    /// token and a cached profile.
    pub fn initialize(&self) {
        let token = self.tokens.get_token();
        let user = self.tokens.get_user();
        match (token, user) {
            (Some(token), Some(user)) if !self.tokens.is_token_expired(Some(&token)) => {
                tracing::info!(cedula = %user.cedula, "restored session from storage");
                self.session.update(SessionPatch::authenticated(user, token));
            }
            _ => self.session.update(SessionPatch::logged_out()),
        }
    }

    /// Sign in with cedula and password.
    ///
    /// On success the token and profile are persisted and the session is
    /// authenticated. On failure the session records the error message and
    /// stored credentials are left untouched.
    ///
    /// # Errors
    ///
    /// 401 maps to "Credenciales inválidas", an unreachable server to
    /// "Error de conexión con el servidor"; a server-supplied message always
    /// wins.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, AuthError> {
        self.session.update(SessionPatch::loading());

        let endpoint = if self.api.config().admin_login { endpoints::LOGIN_ADMIN } else { endpoints::LOGIN };
        let result = self
            .api
            .send::<_, LoginResponse>(Method::POST, endpoint, Some(credentials), MSG_AUTH_GENERIC)
            .await;

        let response = match result {
            Ok(envelope) => match envelope.data {
                Some(data) => data,
                // A 2xx message here describes success, not the failure.
                None => {
                    let message = MSG_UNEXPECTED_RESPONSE.to_owned();
                    return Err(self.login_failed(ApiError::Decode { message }));
                }
            },
            Err(e) => return Err(self.login_failed(e)),
        };

        let profile = response.profile();
        self.tokens.save_token(&response.token);
        self.tokens.save_user(&profile);
        tracing::info!(cedula = %profile.cedula, "login succeeded");
        self.session.update(SessionPatch::authenticated(profile, response.token.clone()));
        Ok(response)
    }

    fn login_failed(&self, err: AuthError) -> AuthError {
        tracing::warn!(error = %err, "login failed");
        self.session.update(SessionPatch::failed(err.to_string()));
        err
    }

    /// End the session. Local state is cleared first and unconditionally;
    /// the server is then told with the old token, best-effort.
    pub async fn logout(&self) -> LogoutAck {
        let token = self.tokens.get_token();
        self.teardown.run();
        tracing::info!("logged out locally");

        let Some(token) = token else {
            return LogoutAck { remote_acknowledged: false };
        };
        match self.api.post_with_bearer::<serde_json::Value>(endpoints::LOGOUT, &token).await {
            Ok(_) => LogoutAck { remote_acknowledged: true },
            Err(e) => {
                tracing::warn!(error = %e, "remote logout failed; local session already cleared");
                LogoutAck { remote_acknowledged: false }
            }
        }
    }

    /// Local-only logout, no network.
    pub fn logout_local(&self) {
        self.teardown.run();
    }

    /// Ask the server to start password recovery. Returns the server's message.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for a blank identifier; otherwise the mapped API failure.
    pub async fn forgot_password(&self, identifier: &str) -> Result<String, AuthError> {
        let cedula = identifier.trim();
        if cedula.is_empty() {
            return Err(ApiError::Validation(MSG_REQUIRED.to_owned()));
        }
        let body = ForgotPasswordRequest { cedula: cedula.to_owned() };
        let resp = self
            .api
            .send::<_, serde_json::Value>(Method::POST, endpoints::FORGOT_PASSWORD, Some(&body), MSG_AUTH_GENERIC)
            .await?;
        Ok(resp.message)
    }

    /// Change the signed-in user's password. Returns the server's message.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for blank fields; otherwise the mapped API failure.
    pub async fn change_password(&self, current: &str, new: &str) -> Result<String, AuthError> {
        if current.is_empty() || new.is_empty() {
            return Err(ApiError::Validation(MSG_REQUIRED.to_owned()));
        }
        let body = ChangePasswordRequest { clave_actual: current.to_owned(), clave_nueva: new.to_owned() };
        let resp = self
            .api
            .send::<_, serde_json::Value>(Method::POST, endpoints::CHANGE_PASSWORD, Some(&body), MSG_AUTH_GENERIC)
            .await?;
        Ok(resp.message)
    }

    /// Ask the server whether the current token is still accepted. A 401
    /// tears the session down through the request authenticator.
    ///
    /// # Errors
    ///
    /// The mapped API failure.
    pub async fn check_remote(&self) -> Result<(), AuthError> {
        self.api.get::<serde_json::Value>(endpoints::CHECK_AUTH).await.map(|_| ())
    }

    /// Reconcile the holder with storage. Idempotent and network-free.
    ///
    /// A holder that claims authentication without a live token is logged
    /// out; a holder that does not, while storage has a live token and
    /// profile (a login from another process), is re-initialized.
    pub fn check_auth_status(&self) {
        let stored = self.tokens.get_token();
        let valid = stored.as_deref().is_some_and(|t| !self.tokens.is_token_expired(Some(t)));
        let state = self.session.snapshot();

        if !valid {
            if state.is_authenticated {
                tracing::info!("stored token missing or expired; logging out");
                self.teardown.run();
            }
            return;
        }
        if !state.is_authenticated || state.token != stored {
            self.initialize();
        }
    }

    #[must_use]
    pub fn session(&self) -> &SessionHolder {
        &self.session
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.session.snapshot()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.session.current_user()
    }

    /// Token value for building headers; not for authorization decisions.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.tokens.get_token()
    }
}

impl SessionAuthority for AuthGateway {
    fn check_auth_status(&self) {
        AuthGateway::check_auth_status(self);
    }

    fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }
}

#[cfg(test)]
#[path = "gateway_test.rs"]
mod tests;
