//! CineStack core - local login and session persistence.
//!
//! Verifies a username-or-email and password against a credential
//! repository, and keeps a single persisted session so later launches can
//! skip the login screen until the user logs out.

pub mod auth;
pub mod config;
pub mod login;
pub mod navigation;
pub mod store;

pub use auth::{
    CredentialRepository, CredentialVerifier, RegisterError, SessionRecord, SessionStore,
    UserDirectory, UserRecord,
};
pub use config::Config;
pub use login::{Authenticator, LoginAttempt, LoginError, LoginOutcome, ValidationError};
pub use navigation::{launch_route, Navigator, Route};
pub use store::{Batch, FileStore, KeyValueStore, MemoryStore, StoreError, Value};
