//! HTTP client for the NutriZulia API.
//!
//! Every call is routed through the `RequestAuthenticator` and its result is
//! normalized into `ApiResponse<T>` or an `ApiError`. Callers never handle
//! raw transport errors or undecoded bodies.

use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::Instrument;
use uuid::Uuid;

use super::error::{ApiError, MSG_SERVER, MSG_UNEXPECTED_RESPONSE};
use super::types::ApiResponse;
use crate::auth::interceptor::RequestAuthenticator;
use crate::config::ClientConfig;
use crate::ui::preloader::{LoaderKind, PreloaderService};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    authenticator: RequestAuthenticator,
    preloader: Option<PreloaderService>,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: Arc<ClientConfig>, authenticator: RequestAuthenticator) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeouts.request())
            .connect_timeout(config.timeouts.connect())
            .user_agent(format!("{}/{}", config.app_name, config.version))
            .build()?;
        Ok(Self { http, config, authenticator, preloader: None })
    }

    /// Show `preloader` while requests are in flight.
    #[must_use]
    pub fn with_preloader(mut self, preloader: PreloaderService) -> Self {
        self.preloader = Some(preloader);
        self
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn authenticator(&self) -> &RequestAuthenticator {
        &self.authenticator
    }

    /// `GET` an endpoint and unwrap the envelope.
    ///
    /// # Errors
    ///
    /// Any transport failure or non-success status, mapped to [`ApiError`].
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<ApiResponse<T>, ApiError> {
        self.send::<(), T>(Method::GET, endpoint, None, MSG_SERVER).await
    }

    /// `POST` a JSON body and unwrap the envelope.
    ///
    /// # Errors
    ///
    /// Any transport failure or non-success status, mapped to [`ApiError`].
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.send(Method::POST, endpoint, Some(body), MSG_SERVER).await
    }

    /// Send a request through the authenticator. `fallback` is the message
    /// used for failures without a server message or dedicated default.
    ///
    /// # Errors
    ///
    /// Any transport failure or non-success status, mapped to [`ApiError`].
    pub async fn send<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
        fallback: &str,
    ) -> Result<ApiResponse<T>, ApiError> {
        let url = self.config.api_url_for(endpoint);
        let request_id = Uuid::new_v4();
        let mut builder = self
            .http
            .request(method.clone(), &url)
            .header(REQUEST_ID_HEADER, request_id.to_string());
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let request = builder.build().map_err(|e| ApiError::from_transport(&e, fallback))?;

        let span = tracing::debug_span!("api_request", %method, %endpoint, %request_id);
        let _loading = self.loading_guard(&url);
        async {
            let result = self.authenticator.execute(&self.http, request).await;
            let response = result.map_err(|e| {
                tracing::warn!(error = %e, "request failed before a response arrived");
                ApiError::from_transport(&e, fallback)
            })?;
            read_envelope(response, fallback).await
        }
        .instrument(span)
        .await
    }

    /// `POST` with an explicit bearer token, bypassing the authenticator.
    ///
    /// Used for the courtesy logout call: the token has already been cleared
    /// locally, and a 401 here must not tear down a session started since.
    ///
    /// # Errors
    ///
    /// Any transport failure or non-success status, mapped to [`ApiError`].
    pub async fn post_with_bearer<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        token: &str,
    ) -> Result<ApiResponse<T>, ApiError> {
        let url = self.config.api_url_for(endpoint);
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string())
            .send()
            .await
            .map_err(|e| ApiError::from_transport(&e, MSG_SERVER))?;
        read_envelope(response, MSG_SERVER).await
    }

    fn loading_guard(&self, url: &str) -> Option<LoadingGuard> {
        let preloader = self.preloader.as_ref()?;
        if !preloader.config().show_on_http_requests || preloader.is_http_url_excluded(url) {
            return None;
        }
        preloader.show(None, LoaderKind::Http);
        Some(LoadingGuard(preloader.clone()))
    }
}

/// Releases one preloader show when dropped, whichever way the request ends.
struct LoadingGuard(PreloaderService);

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.hide(false);
    }
}

async fn read_envelope<T: DeserializeOwned>(response: reqwest::Response, fallback: &str) -> Result<ApiResponse<T>, ApiError> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(|e| ApiError::from_transport(&e, fallback))?;

    if status.is_success() {
        return serde_json::from_slice::<ApiResponse<T>>(&bytes).map_err(|e| {
            tracing::warn!(error = %e, %status, "unexpected response body");
            ApiError::Decode { message: MSG_UNEXPECTED_RESPONSE.to_owned() }
        });
    }

    let server_message = serde_json::from_slice::<ApiResponse<serde_json::Value>>(&bytes)
        .ok()
        .and_then(|env| env.server_message().map(str::to_owned));
    tracing::debug!(%status, message = ?server_message, "api call failed");
    Err(ApiError::from_status(status.as_u16(), server_message.as_deref(), fallback))
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
