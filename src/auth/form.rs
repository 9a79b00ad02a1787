//! Login form model: cedula composition and field validation.

use std::fmt;
use std::str::FromStr;

use super::gateway::MSG_REQUIRED;
use crate::api::LoginRequest;

pub const MSG_CEDULA_DIGITS: &str = "El número de cédula debe contener solo números";

/// Cedula prefix: Venezuelan (`V`) or foreign resident (`E`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CedulaType {
    #[default]
    V,
    E,
}

impl CedulaType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V => "V",
            Self::E => "E",
        }
    }
}

impl fmt::Display for CedulaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("tipo de cédula inválido: {0} (use V o E)")]
pub struct InvalidCedulaType(pub String);

impl FromStr for CedulaType {
    type Err = InvalidCedulaType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "V" | "v" => Ok(Self::V),
            "E" | "e" => Ok(Self::E),
            other => Err(InvalidCedulaType(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Numero,
    Clave,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: LoginField,
    pub message: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub tipo: CedulaType,
    pub numero: String,
    pub clave: String,
    credentials_rejected: bool,
}

impl LoginForm {
    #[must_use]
    pub fn new(tipo: CedulaType, numero: impl Into<String>, clave: impl Into<String>) -> Self {
        Self { tipo, numero: numero.into(), clave: clave.into(), credentials_rejected: false }
    }

    /// `<type>-<number>`, e.g. `V-12345678`.
    #[must_use]
    pub fn cedula(&self) -> String {
        format!("{}-{}", self.tipo, self.numero)
    }

    #[must_use]
    pub fn field_error(&self, field: LoginField) -> Option<&'static str> {
        match field {
            LoginField::Numero if self.numero.is_empty() => Some(MSG_REQUIRED),
            LoginField::Numero if !self.numero.chars().all(|c| c.is_ascii_digit()) => Some(MSG_CEDULA_DIGITS),
            LoginField::Clave if self.clave.is_empty() => Some(MSG_REQUIRED),
            _ => None,
        }
    }

    /// Every failing validator, in field order.
    #[must_use]
    pub fn errors(&self) -> Vec<FieldError> {
        [LoginField::Numero, LoginField::Clave]
            .into_iter()
            .filter_map(|field| self.field_error(field).map(|message| FieldError { field, message }))
            .collect()
    }

    /// Build the request body, or the list of field errors.
    ///
    /// # Errors
    ///
    /// Returns every failing validator when any field is invalid.
    pub fn validate(&self) -> Result<LoginRequest, Vec<FieldError>> {
        let errors = self.errors();
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(LoginRequest { cedula: self.cedula(), clave: self.clave.clone() })
    }

    /// Flag both credential fields after the server rejected them.
    pub fn mark_credentials_invalid(&mut self) {
        self.credentials_rejected = true;
    }

    pub fn clear_credentials_error(&mut self) {
        self.credentials_rejected = false;
    }

    /// Whether the field should render as invalid.
    #[must_use]
    pub fn is_invalid(&self, field: LoginField) -> bool {
        self.credentials_rejected || self.field_error(field).is_some()
    }
}

#[cfg(test)]
#[path = "form_test.rs"]
mod tests;
