//! Bearer token and cached profile persistence.
//!
//! Tokens are JWT-shaped. The payload is decoded only to read `exp`; the
//! signature is never checked here, the server does that. Anything that
//! cannot be decoded counts as expired.
//!
//! Storage failures never escape this module: reads degrade to "nothing
//! stored" and writes are best-effort, both logged.

use std::sync::Arc;

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde::Deserialize;
use time::OffsetDateTime;

use super::storage::KeyValueStore;
use crate::api::User;

pub const TOKEN_KEY: &str = "nutrizulia_auth_token";
pub const USER_KEY: &str = "nutrizulia_user_data";

// Token payloads show up both with and without padding.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// Read the `exp` claim (seconds since the Unix epoch) without verifying the token.
#[must_use]
pub fn decode_expiry(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = PAYLOAD_ENGINE.decode(payload).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    claims.exp
}

/// Whether `token` is expired at `now` (seconds). Undecodable tokens and
/// tokens without `exp` are expired.
#[must_use]
pub fn is_expired_at(token: &str, now: i64) -> bool {
    decode_expiry(token).is_none_or(|exp| exp < now)
}

#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore").finish_non_exhaustive()
    }
}

impl TokenStore {
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    pub fn save_token(&self, token: &str) {
        if let Err(e) = self.storage.set(TOKEN_KEY, token) {
            tracing::error!(error = %e, "failed to save auth token");
        }
    }

    #[must_use]
    pub fn get_token(&self) -> Option<String> {
        match self.storage.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::error!(error = %e, "failed to read auth token");
                None
            }
        }
    }

    pub fn clear_token(&self) {
        if let Err(e) = self.storage.remove(TOKEN_KEY) {
            tracing::warn!(error = %e, "failed to clear auth token");
        }
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.get_token().is_some()
    }

    pub fn save_user(&self, user: &User) {
        let raw = match serde_json::to_string(user) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize user profile");
                return;
            }
        };
        if let Err(e) = self.storage.set(USER_KEY, &raw) {
            tracing::error!(error = %e, "failed to save user profile");
        }
    }

    #[must_use]
    pub fn get_user(&self) -> Option<User> {
        let raw = match self.storage.get(USER_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::error!(error = %e, "failed to read user profile");
                return None;
            }
        };
        serde_json::from_str(&raw)
            .inspect_err(|e| tracing::warn!(error = %e, "discarding unreadable cached user profile"))
            .ok()
    }

    /// Remove both the token and the cached profile. Each removal is attempted
    /// even if the other fails.
    pub fn clear_auth_data(&self) {
        self.clear_token();
        if let Err(e) = self.storage.remove(USER_KEY) {
            tracing::warn!(error = %e, "failed to clear user profile");
        }
    }

    /// Expiry check for `token`, or the stored token when `None`.
    #[must_use]
    pub fn is_token_expired(&self, token: Option<&str>) -> bool {
        let stored;
        let token = match token {
            Some(t) => t,
            None => {
                stored = self.get_token();
                match stored.as_deref() {
                    Some(t) => t,
                    None => return true,
                }
            }
        };
        let expired = is_expired_at(token, OffsetDateTime::now_utc().unix_timestamp());
        if expired {
            tracing::debug!("auth token expired or unreadable");
        }
        expired
    }

    /// Expiry instant for `token`, or the stored token when `None`.
    #[must_use]
    pub fn token_expiration(&self, token: Option<&str>) -> Option<OffsetDateTime> {
        let exp = match token {
            Some(t) => decode_expiry(t)?,
            None => decode_expiry(&self.get_token()?)?,
        };
        OffsetDateTime::from_unix_timestamp(exp).ok()
    }
}

#[cfg(test)]
#[path = "token_test.rs"]
mod tests;
