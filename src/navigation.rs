//! Navigation collaborator.
//!
//! SYSTEM CONTEXT
//! ==============
//! Routing is owned by the UI shell. This layer only ever issues one
//! instruction: "go to the login route" when a session cannot be renewed.
//! `redirect_to_login` guards that instruction so it is a no-op while the
//! user is already on the login route.

use std::sync::{Mutex, PoisonError};

use tracing::{debug, info};

/// Routing seam implemented by the UI shell.
pub trait Navigator: Send + Sync {
    /// Current route path, e.g. `/boards/42`.
    fn current_route(&self) -> String;
    /// Navigate to `route`.
    fn navigate(&self, route: &str);
}

/// Send the user to `login_route` unless they are already there. Returns
/// whether a navigation was issued.
pub fn redirect_to_login(navigator: &dyn Navigator, login_route: &str) -> bool {
    let current = navigator.current_route();
    if same_route(&current, login_route) {
        debug!(route = login_route, "already on login route; redirect skipped");
        return false;
    }
    info!(from = %current, to = login_route, "session expired; redirecting to login");
    navigator.navigate(login_route);
    true
}

fn same_route(a: &str, b: &str) -> bool {
    route_path(a) == route_path(b)
}

fn route_path(route: &str) -> &str {
    let path = route.split(['?', '#']).next().unwrap_or(route);
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

// =============================================================================
// IN-MEMORY NAVIGATOR
// =============================================================================

/// Navigator that tracks the current route in memory and records every
/// navigation. Used by the CLI and by headless embedders.
#[derive(Debug)]
pub struct InMemoryNavigator {
    current: Mutex<String>,
    history: Mutex<Vec<String>>,
}

impl InMemoryNavigator {
    #[must_use]
    pub fn new(initial_route: impl Into<String>) -> Self {
        Self { current: Mutex::new(initial_route.into()), history: Mutex::new(Vec::new()) }
    }

    /// Routes navigated to, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for InMemoryNavigator {
    fn current_route(&self) -> String {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn navigate(&self, route: &str) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = route.to_owned();
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route.to_owned());
    }
}

#[cfg(test)]
#[path = "navigation_test.rs"]
mod tests;
