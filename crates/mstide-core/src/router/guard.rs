use std::sync::Arc;

use tracing::debug;

use crate::session::SessionStore;

use super::ResolvedRoute;

/// Where unauthenticated visitors of protected routes are sent.
pub const HOME_PATH: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    Proceed,
    Redirect(String),
}

/// Runs before every route transition and decides whether it may complete.
///
/// Public routes always proceed. Protected routes proceed on a cached
/// logged-in state without asking the backend; otherwise the session is
/// verified first and a visitor who is still logged out is sent home.
#[derive(Clone)]
pub struct NavigationGuard {
    store: Arc<SessionStore>,
    home: String,
}

impl NavigationGuard {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self::with_home(store, HOME_PATH)
    }

    pub fn with_home(store: Arc<SessionStore>, home: impl Into<String>) -> Self {
        Self {
            store,
            home: home.into(),
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub async fn before_each(&self, target: &ResolvedRoute) -> NavigationDecision {
        if !target.requires_auth() {
            return NavigationDecision::Proceed;
        }

        if self.store.is_logged_in() {
            debug!(path = %target.path, "Protected route, trusting cached session");
            return NavigationDecision::Proceed;
        }

        debug!(path = %target.path, "Protected route, verifying session");
        self.store.verify_session().await;

        if self.store.is_logged_in() {
            NavigationDecision::Proceed
        } else {
            NavigationDecision::Redirect(self.home.clone())
        }
    }
}
