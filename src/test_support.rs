//! Shared fixtures for unit tests: sample profiles, unsigned tokens, a
//! storage medium that always fails, and in-process stub API servers.

use std::sync::{Arc, Mutex};

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::api::User;
use crate::auth::storage::{KeyValueStore, MemoryStore, StorageError};
use crate::config::ClientConfig;

pub fn sample_user() -> User {
    User {
        id: 1,
        cedula: "V-12345678".into(),
        nombres: "Ana".into(),
        apellidos: "Pérez".into(),
        fecha_nacimiento: "1990-01-01".into(),
        genero: "F".into(),
        telefono: Some("0414-1234567".into()),
        correo: "ana@example.test".into(),
        is_enabled: true,
        roles: Vec::new(),
    }
}

pub fn now_secs() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

/// Unsigned JWT-shaped token with the given payload.
pub fn token_with_payload(payload: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{body}.signature")
}

pub fn token_expiring_at(exp: i64) -> String {
    token_with_payload(&serde_json::json!({ "sub": "V-12345678", "exp": exp }))
}

/// Token valid for the next hour.
pub fn fresh_token() -> String {
    token_expiring_at(now_secs() + 3600)
}

pub fn memory_store() -> Arc<dyn KeyValueStore> {
    Arc::new(MemoryStore::new())
}

/// Storage medium that rejects every operation, like disabled browser storage.
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("disabled".into()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("quota exceeded".into()))
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("disabled".into()))
    }
}

/// Serve `router` on an ephemeral local port and return its origin.
pub async fn spawn_stub(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn config_for(origin: &str) -> ClientConfig {
    ClientConfig::new(origin).unwrap()
}

/// Origin with nothing listening.
pub fn unreachable_config() -> ClientConfig {
    ClientConfig::new("http://127.0.0.1:1").unwrap()
}

/// Records the `Authorization` header of each request a stub receives.
#[derive(Clone, Default)]
pub struct SeenAuth(Arc<Mutex<Vec<Option<String>>>>);

impl SeenAuth {
    pub fn record(&self, headers: &axum::http::HeaderMap) {
        let value = headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        self.0.lock().unwrap().push(value);
    }

    pub fn all(&self) -> Vec<Option<String>> {
        self.0.lock().unwrap().clone()
    }
}

pub fn envelope(status: u16, message: &str, data: Option<serde_json::Value>) -> serde_json::Value {
    let mut body = serde_json::json!({
        "status": status,
        "message": message,
        "timestamp": "2025-01-01T00:00:00Z",
        "path": "/api/v1/test"
    });
    if let Some(data) = data {
        body["data"] = data;
    }
    body
}
