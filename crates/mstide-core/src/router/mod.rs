//! Client-side routing for the database pages.
//!
//! This module provides:
//! - `RouteTable`: the page routes and their `requires_auth` metadata
//! - `NavigationGuard`: the per-navigation session check
//! - `Router`: resolves a path, runs the guard and tracks the current page

pub mod guard;
pub mod routes;

use tracing::{debug, info, warn};

pub use guard::{NavigationDecision, NavigationGuard, HOME_PATH};
pub use routes::{ResolvedRoute, Route, RouteName, RouteTable, APP_TITLE};

/// Redirects followed for one navigation before giving up.
/// The guard only ever redirects home, so one hop is the normal case.
const MAX_REDIRECTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// The transition completed, possibly somewhere other than requested.
    Completed {
        route: ResolvedRoute,
        redirected_from: Option<String>,
    },
    /// Nothing was entered; the current page is unchanged.
    Blocked { attempted: String },
}

pub struct Router {
    routes: RouteTable,
    guard: NavigationGuard,
    current: Option<ResolvedRoute>,
}

impl Router {
    pub fn new(routes: RouteTable, guard: NavigationGuard) -> Self {
        Self {
            routes,
            guard,
            current: None,
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn guard(&self) -> &NavigationGuard {
        &self.guard
    }

    pub fn current(&self) -> Option<&ResolvedRoute> {
        self.current.as_ref()
    }

    /// Title for the page currently shown.
    /// A redirected or blocked navigation never shows its target's title.
    pub fn window_title(&self) -> String {
        self.current
            .as_ref()
            .map(ResolvedRoute::window_title)
            .unwrap_or_else(|| APP_TITLE.to_string())
    }

    /// Navigate to `path`, following guard redirects.
    pub async fn navigate(&mut self, path: &str) -> Navigation {
        let mut target = path.to_string();
        let mut redirected_from = None;

        for _ in 0..=MAX_REDIRECTS {
            let Some(route) = self.routes.resolve(&target) else {
                warn!(path = %target, "No route matches path");
                return Navigation::Blocked {
                    attempted: path.to_string(),
                };
            };
            debug!(path = %route.path, title = %route.window_title(), "Navigating");

            match self.guard.before_each(&route).await {
                NavigationDecision::Proceed => {
                    self.current = Some(route.clone());
                    return Navigation::Completed {
                        route,
                        redirected_from,
                    };
                }
                NavigationDecision::Redirect(next) => {
                    info!(from = %route.path, to = %next, "Navigation redirected");
                    if redirected_from.is_none() {
                        redirected_from = Some(route.path);
                    }
                    target = next;
                }
            }
        }

        warn!(path = path, "Too many redirects, navigation blocked");
        Navigation::Blocked {
            attempted: path.to_string(),
        }
    }
}
