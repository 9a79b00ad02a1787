//! Composition root.
//!
//! `App` builds every component explicitly and owns the current location.
//! Nothing in the crate reaches for a global: the gateway, the API client,
//! and the request authenticator all receive their collaborators here.

use std::sync::{Arc, Mutex, PoisonError};

use crate::api::ApiClient;
use crate::auth::form::{FieldError, LoginForm};
use crate::auth::gateway::{AuthError, AuthGateway, LogoutAck, SessionTeardown};
use crate::auth::guard::{LANDING_PATH, LOGIN_PATH};
use crate::auth::interceptor::RequestAuthenticator;
use crate::auth::session::SessionHolder;
use crate::auth::storage::KeyValueStore;
use crate::auth::token::TokenStore;
use crate::config::ClientConfig;
use crate::routes::{self, Resolved, RouteError};
use crate::ui::notification::NotificationService;
use crate::ui::preloader::{LoaderKind, PreloaderService};

#[derive(Debug, thiserror::Error)]
pub enum LoginFailure {
    #[error("el formulario tiene campos inválidos")]
    Invalid(Vec<FieldError>),
    #[error(transparent)]
    Rejected(#[from] AuthError),
    #[error(transparent)]
    Navigation(#[from] RouteError),
}

pub struct App {
    config: Arc<ClientConfig>,
    gateway: AuthGateway,
    notifications: NotificationService,
    preloader: PreloaderService,
    location: Mutex<Option<Resolved>>,
}

impl App {
    /// Wire every component over `storage`. The session is initialized
    /// from whatever `storage` already holds.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ClientConfig, storage: Arc<dyn KeyValueStore>) -> Result<Self, reqwest::Error> {
        let config = Arc::new(config);
        let preloader = PreloaderService::default();

        let tokens = TokenStore::new(storage);
        let session = SessionHolder::new();
        let teardown = SessionTeardown::new(tokens.clone(), session.clone());
        let authenticator = RequestAuthenticator::new(Arc::new(tokens.clone()), Arc::new(teardown));
        let api = ApiClient::new(Arc::clone(&config), authenticator)?.with_preloader(preloader.clone());
        let gateway = AuthGateway::new(api, tokens, session);

        tracing::info!(
            app = %config.app_name,
            version = %config.version,
            api_url = %config.api_url,
            authenticated = gateway.session().is_authenticated(),
            "app initialized"
        );

        Ok(Self { config, gateway, notifications: NotificationService::new(), preloader, location: Mutex::new(None) })
    }

    /// Navigate to `url` through the route table, showing the route
    /// preloader while guards run.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] if guards never settle on a page.
    pub fn navigate(&self, url: &str) -> Result<Resolved, RouteError> {
        let show = self.preloader.config().show_on_route_change && !self.preloader.is_route_excluded(url);
        if show {
            self.preloader.show(None, LoaderKind::Route);
        }
        let result = routes::navigate(&self.gateway, url);
        if show {
            self.preloader.hide(false);
        }

        if let Ok(resolved) = &result {
            tracing::info!(requested = url, url = %resolved.url, page = ?resolved.page, "navigated");
            *self.location.lock().unwrap_or_else(PoisonError::into_inner) = Some(resolved.clone());
        }
        result
    }

    /// Validate the form, sign in, and navigate to `return_url` (or the
    /// landing route). On failure an error notification is shown, and a
    /// credentials rejection flags both form fields.
    ///
    /// # Errors
    ///
    /// [`LoginFailure::Invalid`] before any request is sent,
    /// [`LoginFailure::Rejected`] for any gateway failure.
    pub async fn login(&self, form: &mut LoginForm, return_url: Option<&str>) -> Result<Resolved, LoginFailure> {
        form.clear_credentials_error();
        let request = form.validate().map_err(LoginFailure::Invalid)?;

        if let Err(err) = self.gateway.login(&request).await {
            self.notifications.show_error(err.to_string());
            if err.is_authentication() {
                form.mark_credentials_invalid();
            }
            return Err(err.into());
        }

        let target = return_url.filter(|url| routes::is_app_path(url)).unwrap_or(LANDING_PATH);
        Ok(self.navigate(target)?)
    }

    /// Log out, then navigate to the login route.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] if the login route cannot be reached.
    pub async fn logout(&self) -> Result<LogoutAck, RouteError> {
        let ack = self.gateway.logout().await;
        self.navigate(LOGIN_PATH)?;
        Ok(ack)
    }

    #[must_use]
    pub fn location(&self) -> Option<Resolved> {
        self.location.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// `returnUrl` carried by the current location, if any.
    #[must_use]
    pub fn pending_return_url(&self) -> Option<String> {
        self.location().and_then(|loc| loc.return_url())
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn gateway(&self) -> &AuthGateway {
        &self.gateway
    }

    #[must_use]
    pub fn notifications(&self) -> &NotificationService {
        &self.notifications
    }

    #[must_use]
    pub fn preloader(&self) -> &PreloaderService {
        &self.preloader
    }
}

#[cfg(test)]
#[path = "app_test.rs"]
mod tests;
