//! Error taxonomy for API calls.
//!
//! ERROR HANDLING
//! ==============
//! Every failure is mapped here once, at the service-call boundary, into a
//! variant carrying a user-facing message. The message prefers what the
//! server said and falls back to a status-coded default, so callers can show
//! `err.to_string()` directly.

use reqwest::StatusCode;

pub const MSG_INVALID_CREDENTIALS: &str = "Credenciales inválidas";
pub const MSG_CONNECTION: &str = "Error de conexión con el servidor";
pub const MSG_AUTH_GENERIC: &str = "Error de autenticación";
pub const MSG_NOT_FOUND: &str = "Recurso no encontrado";
pub const MSG_CONFLICT: &str = "El recurso ya existe";
pub const MSG_SERVER: &str = "Error en el servidor";
pub const MSG_UNEXPECTED_RESPONSE: &str = "Respuesta inesperada del servidor";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Rejected client-side before anything was sent.
    #[error("{0}")]
    Validation(String),
    /// HTTP 401.
    #[error("{message}")]
    Authentication { message: String },
    /// Network unreachable, timeout, or request never completed (status 0).
    #[error("{message}")]
    Connectivity { message: String },
    /// HTTP 409.
    #[error("{message}")]
    Conflict { message: String },
    /// HTTP 404.
    #[error("{message}")]
    NotFound { message: String },
    /// Any other non-success status.
    #[error("{message}")]
    Server { status: u16, message: String },
    /// Success status with a body we could not use.
    #[error("{message}")]
    Decode { message: String },
}

impl ApiError {
    /// Map a non-success status to a variant. `fallback` is used for statuses
    /// without a dedicated default message when the server said nothing.
    #[must_use]
    pub fn from_status(status: u16, server_message: Option<&str>, fallback: &str) -> Self {
        let pick = |default: &str| server_message.map_or_else(|| default.to_owned(), str::to_owned);
        match status {
            0 => Self::Connectivity { message: pick(MSG_CONNECTION) },
            401 => Self::Authentication { message: pick(MSG_INVALID_CREDENTIALS) },
            404 => Self::NotFound { message: pick(MSG_NOT_FOUND) },
            409 => Self::Conflict { message: pick(MSG_CONFLICT) },
            _ => Self::Server { status, message: pick(fallback) },
        }
    }

    /// Map a transport-level failure. Connect, timeout and request errors
    /// never reached the server and count as status 0. A request that could
    /// not even be built is a validation failure.
    #[must_use]
    pub fn from_transport(err: &reqwest::Error, fallback: &str) -> Self {
        if err.is_builder() {
            return Self::Validation(err.to_string());
        }
        if err.is_connect() || err.is_timeout() || err.is_request() {
            return Self::from_status(0, None, fallback);
        }
        if err.is_decode() {
            return Self::Decode { message: MSG_UNEXPECTED_RESPONSE.to_owned() };
        }
        match err.status() {
            Some(status) => Self::from_status(status.as_u16(), None, fallback),
            None => Self::from_status(0, None, fallback),
        }
    }

    /// HTTP status this error corresponds to; 0 when the server was never reached.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Validation(_) | Self::Decode { .. } => None,
            Self::Connectivity { .. } => Some(0),
            Self::Authentication { .. } => Some(StatusCode::UNAUTHORIZED.as_u16()),
            Self::NotFound { .. } => Some(StatusCode::NOT_FOUND.as_u16()),
            Self::Conflict { .. } => Some(StatusCode::CONFLICT.as_u16()),
            Self::Server { status, .. } => Some(*status),
        }
    }

    #[must_use]
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    #[must_use]
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity { .. })
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
