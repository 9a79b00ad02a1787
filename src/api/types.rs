//! Wire types shared with the NutriZulia API. JSON is camelCase.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Uniform response envelope wrapping both success and error bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<HashMap<String, String>>,
}

impl<T> ApiResponse<T> {
    /// Server-supplied message, if non-blank.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        let msg = self.message.trim();
        (!msg.is_empty()).then_some(msg)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rol {
    pub id: i64,
    #[serde(alias = "tipo")]
    pub nombre: String,
}

/// User profile as returned by the API and cached next to the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub cedula: String,
    pub nombres: String,
    pub apellidos: String,
    #[serde(default)]
    pub fecha_nacimiento: String,
    #[serde(default)]
    pub genero: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(default)]
    pub correo: String,
    #[serde(default)]
    pub is_enabled: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<Rol>,
}

impl User {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.nombres, self.apellidos).trim().to_owned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub cedula: String,
    pub clave: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "type", default)]
    pub token_type: String,
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rol: Option<Rol>,
}

impl LoginResponse {
    /// The user profile with the login role folded into its role set.
    #[must_use]
    pub fn profile(&self) -> User {
        let mut user = self.user.clone();
        if let Some(rol) = &self.rol {
            if !user.roles.iter().any(|r| r.id == rol.id) {
                user.roles.push(rol.clone());
            }
        }
        user
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub cedula: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub clave_actual: String,
    pub clave_nueva: String,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
