//! Login orchestration: validate the form, verify credentials, and persist
//! a session when the user asked to be remembered.

use thiserror::Error;
use tracing::{debug, info};

use crate::auth::{CredentialRepository, CredentialVerifier, SessionStore};
use crate::navigation::Navigator;
use crate::store::{KeyValueStore, StoreError};

/// One submission of the login form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginAttempt {
    pub identifier: String,
    pub password: String,
    pub remember_me: bool,
}

impl LoginAttempt {
    pub fn new(identifier: &str, password: &str, remember_me: bool) -> Self {
        Self {
            identifier: identifier.to_string(),
            password: password.to_string(),
            remember_me,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Success,
    /// Unknown identifier or wrong password; the two are not told apart
    InvalidCredentials,
}

impl LoginOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            LoginOutcome::Success => "Login successful!",
            LoginOutcome::InvalidCredentials => "Invalid username/email or password",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, LoginOutcome::Success)
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Username or email is required")]
    MissingIdentifier,

    #[error("Password is required")]
    MissingPassword,
}

#[derive(Error, Debug)]
pub enum LoginError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to persist session: {0}")]
    Store(#[from] StoreError),
}

/// Check the form before anything touches the verifier. Returns the trimmed
/// identifier; the password is significant as typed and never trimmed.
///
/// Only ASCII control characters and spaces (up to U+0020) are trimmed.
/// Other Unicode whitespace, such as a non-breaking space, is kept.
pub fn validate(attempt: &LoginAttempt) -> Result<&str, ValidationError> {
    let identifier = attempt.identifier.trim_matches(|c: char| c <= ' ');
    if identifier.is_empty() {
        return Err(ValidationError::MissingIdentifier);
    }
    if attempt.password.is_empty() {
        return Err(ValidationError::MissingPassword);
    }
    Ok(identifier)
}

/// Ties the credential verifier to the session store.
pub struct Authenticator<R, S> {
    verifier: CredentialVerifier<R>,
    sessions: SessionStore<S>,
}

impl<R: CredentialRepository, S: KeyValueStore> Authenticator<R, S> {
    pub fn new(verifier: CredentialVerifier<R>, sessions: SessionStore<S>) -> Self {
        Self { verifier, sessions }
    }

    /// Run a login attempt.
    ///
    /// Without `remember_me` a successful login persists nothing: the user is
    /// authenticated for this run only. With it, the session is stored under
    /// the identifier exactly as submitted (after trimming), even when that
    /// identifier is an email.
    pub fn login(&mut self, attempt: &LoginAttempt) -> Result<LoginOutcome, LoginError> {
        let identifier = validate(attempt)?;

        if !self.verifier.verify(identifier, &attempt.password) {
            debug!("Login rejected");
            return Ok(LoginOutcome::InvalidCredentials);
        }

        if attempt.remember_me {
            let full_name = self.verifier.full_name(identifier).unwrap_or_default();
            self.sessions.create_session(identifier, &full_name, "")?;
        }

        info!(remember_me = attempt.remember_me, "Login successful");
        Ok(LoginOutcome::Success)
    }

    pub fn logout(&mut self, navigator: &dyn Navigator) -> Result<(), StoreError> {
        self.sessions.logout(navigator)
    }

    pub fn verifier(&self) -> &CredentialVerifier<R> {
        &self.verifier
    }

    pub fn sessions(&self) -> &SessionStore<S> {
        &self.sessions
    }

    pub fn sessions_mut(&mut self) -> &mut SessionStore<S> {
        &mut self.sessions
    }
}
