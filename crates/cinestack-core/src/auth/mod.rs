//! Authentication module for verifying credentials and persisting sessions.
//!
//! This module provides:
//! - `CredentialVerifier`: checks a username-or-email and password against a
//!   `CredentialRepository`
//! - `SessionStore`: the single persisted login session, over a `KeyValueStore`
//!
//! Sessions never expire; they last until logout.

pub mod credentials;
pub mod session;

pub use credentials::{
    CredentialRepository, CredentialVerifier, RegisterError, UserDirectory, UserRecord,
};
pub use session::{SessionRecord, SessionStore};
