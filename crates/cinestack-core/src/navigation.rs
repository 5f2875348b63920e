//! Seam between the session core and whatever presents screens.

use crate::auth::SessionStore;
use crate::store::{KeyValueStore, StoreError};

/// Where the front end should take the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The authentication entry point
    Login,
    /// The main screen behind login
    Home,
}

/// Implemented by the front end to present a route.
pub trait Navigator {
    fn navigate(&self, route: Route);
}

impl<F: Fn(Route)> Navigator for F {
    fn navigate(&self, route: Route) {
        self(route)
    }
}

/// Route to show at launch: skip login when a session is persisted.
pub fn launch_route<S: KeyValueStore>(sessions: &SessionStore<S>) -> Result<Route, StoreError> {
    Ok(if sessions.is_active()? {
        Route::Home
    } else {
        Route::Login
    })
}
