use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
}

impl UserRecord {
    pub fn new(username: &str, full_name: &str, email: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            full_name: full_name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    /// Exact, case-sensitive match on username or email
    pub fn matches_identifier(&self, identifier: &str) -> bool {
        self.username == identifier || self.email == identifier
    }
}

/// Source of user records for the verifier.
pub trait CredentialRepository {
    /// Look up a user by exact username or email. Absence is not an error.
    fn find_user_by_identifier(&self, identifier: &str) -> Option<UserRecord>;
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegisterError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Username already taken")]
    DuplicateUsername,

    #[error("Email already registered")]
    DuplicateEmail,
}

/// User records kept as a JSON list on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserDirectory {
    users: Vec<UserRecord>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_users(users: Vec<UserRecord>) -> Self {
        Self { users }
    }

    /// Load the directory from disk; a missing file is an empty directory
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No user directory file");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read user directory: {}", path.display()))?;
        let users: Vec<UserRecord> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse user directory: {}", path.display()))?;
        Ok(Self { users })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.users)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write user directory: {}", path.display()))?;
        Ok(())
    }

    /// Add a new user. Username, email and password must be non-empty and
    /// neither the username nor the email may already be in use.
    pub fn register(&mut self, record: UserRecord) -> Result<(), RegisterError> {
        if record.username.trim().is_empty() {
            return Err(RegisterError::MissingField("Username"));
        }
        if record.email.trim().is_empty() {
            return Err(RegisterError::MissingField("Email"));
        }
        if record.password.is_empty() {
            return Err(RegisterError::MissingField("Password"));
        }
        if self.users.iter().any(|u| u.username == record.username) {
            warn!(username = %record.username, "Registration rejected: username taken");
            return Err(RegisterError::DuplicateUsername);
        }
        if self.users.iter().any(|u| u.email == record.email) {
            warn!(username = %record.username, "Registration rejected: email taken");
            return Err(RegisterError::DuplicateEmail);
        }

        debug!(username = %record.username, "Registered user");
        self.users.push(record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl CredentialRepository for UserDirectory {
    fn find_user_by_identifier(&self, identifier: &str) -> Option<UserRecord> {
        self.users
            .iter()
            .find(|u| u.matches_identifier(identifier))
            .cloned()
    }
}

/// Checks submitted credentials against a repository.
pub struct CredentialVerifier<R> {
    repository: R,
}

impl<R: CredentialRepository> CredentialVerifier<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// True only if a user matches `identifier` and its password equals
    /// `password` exactly. Unknown users and wrong passwords both give false.
    pub fn verify(&self, identifier: &str, password: &str) -> bool {
        let matched = self
            .repository
            .find_user_by_identifier(identifier)
            .map(|user| user.password == password)
            .unwrap_or(false);
        debug!(matched, "Verified credentials");
        matched
    }

    /// Full name of the user matching `identifier`, if any
    pub fn full_name(&self, identifier: &str) -> Option<String> {
        self.repository
            .find_user_by_identifier(identifier)
            .map(|user| user.full_name)
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> UserDirectory {
        UserDirectory::from_users(vec![
            UserRecord::new("alice", "Alice Liddell", "alice@example.com", "secret1"),
            UserRecord::new("bob", "Bob Stone", "bob@example.com", " padded "),
        ])
    }

    #[test]
    fn test_verify_known_users() {
        let verifier = CredentialVerifier::new(directory());
        assert!(verifier.verify("alice", "secret1"));
        assert!(verifier.verify("alice@example.com", "secret1"));
        assert!(verifier.verify("bob", " padded "));
    }

    #[test]
    fn test_verify_rejects_mismatch_and_unknown() {
        let verifier = CredentialVerifier::new(directory());
        assert!(!verifier.verify("alice", "wrong"));
        assert!(!verifier.verify("alice", "secret1 "));
        assert!(!verifier.verify("bob", "padded"));
        assert!(!verifier.verify("carol", "secret1"));
        assert!(!verifier.verify("", ""));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let verifier = CredentialVerifier::new(directory());
        assert!(!verifier.verify("Alice", "secret1"));
        assert!(!verifier.verify("ALICE@example.com", "secret1"));
    }

    #[test]
    fn test_full_name_lookup() {
        let verifier = CredentialVerifier::new(directory());
        assert_eq!(verifier.full_name("alice"), Some("Alice Liddell".to_string()));
        assert_eq!(verifier.full_name("bob@example.com"), Some("Bob Stone".to_string()));
        assert_eq!(verifier.full_name("carol"), None);
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut dir = directory();
        assert_eq!(
            dir.register(UserRecord::new("alice", "Other", "new@example.com", "pw")),
            Err(RegisterError::DuplicateUsername)
        );
        assert_eq!(
            dir.register(UserRecord::new("carol", "Carol", "bob@example.com", "pw")),
            Err(RegisterError::DuplicateEmail)
        );
        assert_eq!(dir.len(), 2);
    }

    #[test]
    fn test_register_rejects_missing_fields() {
        let mut dir = UserDirectory::new();
        assert_eq!(
            dir.register(UserRecord::new("  ", "X", "x@example.com", "pw")),
            Err(RegisterError::MissingField("Username"))
        );
        assert_eq!(
            dir.register(UserRecord::new("x", "X", "", "pw")),
            Err(RegisterError::MissingField("Email"))
        );
        assert_eq!(
            dir.register(UserRecord::new("x", "X", "x@example.com", "")),
            Err(RegisterError::MissingField("Password"))
        );
        assert!(dir.is_empty());
    }

    #[test]
    fn test_directory_save_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("users.json");

        let mut dir = UserDirectory::new();
        dir.register(UserRecord::new("carol", "Carol King", "carol@example.com", "pw"))
            .unwrap();
        dir.save(&path).unwrap();

        let loaded = UserDirectory::load(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        let carol = loaded.find_user_by_identifier("carol@example.com").unwrap();
        assert_eq!(carol.username, "carol");
    }

    #[test]
    fn test_load_missing_directory_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let loaded = UserDirectory::load(&tmp.path().join("nope.json")).unwrap();
        assert!(loaded.is_empty());
    }
}
