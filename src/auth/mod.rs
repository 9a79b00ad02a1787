//! Session and authentication core.
//!
//! ARCHITECTURE
//! ============
//! `storage` is the durable medium. `token` keeps the token and cached
//! profile on it. `session` is the in-memory state everything else reads.
//! `gateway` is the only deliberate writer of both, `interceptor` tears
//! them down on a 401, and `guard` decides navigation from them.
//!
//! The interceptor reaches the gateway's teardown through the
//! `LogoutHandler` trait, so neither module depends on the other's type.

pub mod form;
pub mod gateway;
pub mod guard;
pub mod interceptor;
pub mod session;
pub mod storage;
pub mod token;

pub use form::{CedulaType, LoginField, LoginForm};
pub use gateway::{AuthError, AuthGateway, LogoutAck, SessionTeardown};
pub use guard::{GuardKind, GuardOutcome, Navigation, SessionAuthority};
pub use interceptor::{LogoutHandler, RequestAuthenticator, TokenProvider};
pub use session::{SessionHolder, SessionPatch, SessionPhase, SessionState};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use token::TokenStore;
