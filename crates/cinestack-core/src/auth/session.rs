use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::navigation::{Navigator, Route};
use crate::store::{Batch, KeyValueStore, StoreError};

const KEY_IS_LOGGED_IN: &str = "isLoggedIn";
const KEY_USERNAME: &str = "username";
const KEY_FULL_NAME: &str = "fullName";
const KEY_EMAIL: &str = "email";

/// Snapshot of the persisted session.
///
/// When `is_active` is false the other fields may be empty or stale and
/// should not be relied on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub is_active: bool,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
}

/// The single persisted login session of an installation.
///
/// Every mutation is one committed batch on the backing store, so it is
/// durable by the time the call returns.
pub struct SessionStore<S> {
    store: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Whether a session is persisted; false if none was ever written
    pub fn is_active(&self) -> Result<bool, StoreError> {
        self.store.get_bool(KEY_IS_LOGGED_IN, false)
    }

    /// Overwrite the session with an active one for this user.
    /// Inputs are not validated; the caller has already verified them.
    pub fn create_session(
        &mut self,
        username: &str,
        full_name: &str,
        email: &str,
    ) -> Result<(), StoreError> {
        let batch = Batch::new()
            .put_bool(KEY_IS_LOGGED_IN, true)
            .put_string(KEY_USERNAME, username)
            .put_string(KEY_FULL_NAME, full_name)
            .put_string(KEY_EMAIL, email);
        self.store.commit(batch)?;
        info!(username, namespace = self.store.namespace(), "Session created");
        Ok(())
    }

    pub fn username(&self) -> Result<Option<String>, StoreError> {
        self.store.get_string(KEY_USERNAME)
    }

    pub fn full_name(&self) -> Result<Option<String>, StoreError> {
        self.store.get_string(KEY_FULL_NAME)
    }

    pub fn email(&self) -> Result<Option<String>, StoreError> {
        self.store.get_string(KEY_EMAIL)
    }

    pub fn record(&self) -> Result<SessionRecord, StoreError> {
        Ok(SessionRecord {
            is_active: self.is_active()?,
            username: self.username()?,
            full_name: self.full_name()?,
            email: self.email()?,
        })
    }

    /// Reset the session to its inactive default. No navigation.
    pub fn clear_session(&mut self) -> Result<(), StoreError> {
        self.store.commit(Batch::new().clear())?;
        debug!(namespace = self.store.namespace(), "Session cleared");
        Ok(())
    }

    /// Clear the session, then send the user back to login
    pub fn logout(&mut self, navigator: &dyn Navigator) -> Result<(), StoreError> {
        self.clear_session()?;
        info!("Logged out");
        navigator.navigate(Route::Login);
        Ok(())
    }

    /// Gate for screens behind login. Routes to login and returns false
    /// when no session is active.
    pub fn require_session(&self, navigator: &dyn Navigator) -> Result<bool, StoreError> {
        if self.is_active()? {
            return Ok(true);
        }
        navigator.navigate(Route::Login);
        Ok(false)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileStore, MemoryStore};
    use std::cell::RefCell;

    fn sessions() -> SessionStore<MemoryStore> {
        SessionStore::new(MemoryStore::new("CineStackSession"))
    }

    #[derive(Default)]
    struct RecordingNavigator {
        routes: RefCell<Vec<Route>>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, route: Route) {
            self.routes.borrow_mut().push(route);
        }
    }

    #[test]
    fn test_default_is_inactive() {
        let sessions = sessions();
        assert!(!sessions.is_active().unwrap());
        assert_eq!(sessions.username().unwrap(), None);
        assert_eq!(sessions.record().unwrap(), SessionRecord::default());
    }

    #[test]
    fn test_create_session_round_trip() {
        let mut sessions = sessions();
        sessions
            .create_session("alice", "Alice Liddell", "alice@example.com")
            .unwrap();

        assert!(sessions.is_active().unwrap());
        assert_eq!(sessions.username().unwrap().as_deref(), Some("alice"));
        assert_eq!(sessions.full_name().unwrap().as_deref(), Some("Alice Liddell"));
        assert_eq!(sessions.email().unwrap().as_deref(), Some("alice@example.com"));
    }

    #[test]
    fn test_create_session_is_idempotent() {
        let mut once = sessions();
        once.create_session("alice", "Alice", "a@x").unwrap();

        let mut twice = sessions();
        twice.create_session("alice", "Alice", "a@x").unwrap();
        twice.create_session("alice", "Alice", "a@x").unwrap();

        assert_eq!(once.record().unwrap(), twice.record().unwrap());
        assert_eq!(once.store().len(), twice.store().len());
    }

    #[test]
    fn test_create_session_overwrites() {
        let mut sessions = sessions();
        sessions.create_session("alice", "Alice", "a@x").unwrap();
        sessions.create_session("bob", "", "").unwrap();

        let record = sessions.record().unwrap();
        assert!(record.is_active);
        assert_eq!(record.username.as_deref(), Some("bob"));
        assert_eq!(record.full_name.as_deref(), Some(""));
        assert_eq!(record.email.as_deref(), Some(""));
    }

    #[test]
    fn test_clear_session_always_inactive() {
        let mut fresh = sessions();
        fresh.clear_session().unwrap();
        assert!(!fresh.is_active().unwrap());

        let mut active = sessions();
        active.create_session("alice", "Alice", "a@x").unwrap();
        active.clear_session().unwrap();
        assert!(!active.is_active().unwrap());
        assert_eq!(active.username().unwrap(), None);
        assert!(active.store().is_empty());
    }

    #[test]
    fn test_logout_clears_then_routes_to_login() {
        let mut sessions = sessions();
        sessions.create_session("alice", "Alice", "").unwrap();

        let nav = RecordingNavigator::default();
        sessions.logout(&nav).unwrap();

        assert!(!sessions.is_active().unwrap());
        assert_eq!(*nav.routes.borrow(), vec![Route::Login]);
    }

    #[test]
    fn test_require_session() {
        let mut sessions = sessions();
        let nav = RecordingNavigator::default();

        assert!(!sessions.require_session(&nav).unwrap());
        assert_eq!(*nav.routes.borrow(), vec![Route::Login]);

        sessions.create_session("alice", "Alice", "").unwrap();
        assert!(sessions.require_session(&nav).unwrap());
        assert_eq!(nav.routes.borrow().len(), 1);
    }

    #[test]
    fn test_session_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut sessions =
                SessionStore::new(FileStore::open(dir.path(), "CineStackSession").unwrap());
            sessions.create_session("alice", "Alice", "").unwrap();
        }

        let sessions = SessionStore::new(FileStore::open(dir.path(), "CineStackSession").unwrap());
        assert!(sessions.is_active().unwrap());
        assert_eq!(sessions.username().unwrap().as_deref(), Some("alice"));
    }
}
