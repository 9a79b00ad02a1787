//! REST API plumbing: endpoint catalog, wire types, error taxonomy, and the
//! HTTP client every call goes through.
//!
//! DESIGN
//! ======
//! `ApiClient` owns the `reqwest::Client` and routes each request through the
//! `RequestAuthenticator`, so bearer attachment and 401 teardown are applied
//! uniformly. Failures are mapped into `ApiError` at this boundary; nothing
//! above it sees a raw `reqwest::Error`.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod types;

pub use client::ApiClient;
pub use error::ApiError;
pub use types::{ApiResponse, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, LoginResponse, Rol, User};
