//! Route table and path matching.
//!
//! Patterns are slash separated. A `:name` segment captures one path
//! segment, a `*` segment swallows the rest of the path. The first route
//! that matches, in declaration order, wins.

/// Prefix of every window title.
pub const APP_TITLE: &str = "MSTIDE DB 2.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteName {
    Home,
    About,
    CompoundNew,
    CompoundEdit,
    CompoundView,
    CompoundList,
    CompoundCompare,
    FragmentNew,
    FragmentEdit,
    FragmentView,
    FragmentList,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub pattern: &'static str,
    pub name: RouteName,
    pub title: Option<&'static str>,
    /// Entering this route needs an active session.
    pub requires_auth: bool,
}

impl Route {
    pub const fn public(pattern: &'static str, name: RouteName, title: &'static str) -> Self {
        Self {
            pattern,
            name,
            title: Some(title),
            requires_auth: false,
        }
    }

    pub const fn protected(pattern: &'static str, name: RouteName, title: &'static str) -> Self {
        Self {
            pattern,
            name,
            title: Some(title),
            requires_auth: true,
        }
    }

    /// Match `segments` against this route's pattern, capturing parameters.
    fn matches(&self, segments: &[&str]) -> Option<Vec<(&'static str, String)>> {
        let mut params = Vec::new();
        let mut pattern = self.pattern.split('/').filter(|s| !s.is_empty());
        let mut rest = segments.iter();

        loop {
            match (pattern.next(), rest.next()) {
                (Some("*"), _) => return Some(params),
                (Some(p), Some(seg)) => {
                    if let Some(name) = p.strip_prefix(':') {
                        params.push((name, (*seg).to_string()));
                    } else if p != *seg {
                        return None;
                    }
                }
                (None, None) => return Some(params),
                _ => return None,
            }
        }
    }
}

const STANDARD_ROUTES: &[Route] = &[
    Route::public("/", RouteName::Home, "Home"),
    Route::public("/about", RouteName::About, "About"),
    Route::protected("/compound/new", RouteName::CompoundNew, "Add New Compound"),
    Route::protected("/compound/edit/:id", RouteName::CompoundEdit, "Edit Compound"),
    Route::public("/compound/view/:id", RouteName::CompoundView, "View Compound"),
    Route::public("/compound/list", RouteName::CompoundList, "List Of Compounds"),
    Route::public("/compound/compare", RouteName::CompoundCompare, "Compare Compounds"),
    Route::protected("/fragment/new", RouteName::FragmentNew, "Add New Fragment"),
    Route::protected("/fragment/edit/:id", RouteName::FragmentEdit, "Edit Fragment"),
    Route::public("/fragment/view/:id", RouteName::FragmentView, "View Fragment"),
    Route::public("/fragment/list", RouteName::FragmentList, "List Of Fragments"),
    Route::public("/*", RouteName::NotFound, "404 - Not Found"),
];

/// A route matched against a concrete path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub route: Route,
    /// Normalized path, without query string, fragment or empty segments.
    pub path: String,
    pub params: Vec<(&'static str, String)>,
}

impl ResolvedRoute {
    pub fn name(&self) -> RouteName {
        self.route.name
    }

    pub fn requires_auth(&self) -> bool {
        self.route.requires_auth
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn window_title(&self) -> String {
        match self.route.title {
            Some(title) => format!("{} - {}", APP_TITLE, title),
            None => APP_TITLE.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// The compound and fragment pages of the database client.
    pub fn standard() -> Self {
        Self::new(STANDARD_ROUTES.to_vec())
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Find the first route matching `path`.
    /// `None` only when the table has no catch-all.
    pub fn resolve(&self, path: &str) -> Option<ResolvedRoute> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let normalized = format!("/{}", segments.join("/"));

        self.routes.iter().find_map(|route| {
            route.matches(&segments).map(|params| ResolvedRoute {
                route: *route,
                path: normalized.clone(),
                params,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(path: &str) -> ResolvedRoute {
        RouteTable::standard()
            .resolve(path)
            .expect("standard table has a catch-all")
    }

    #[test]
    fn test_resolve_static_routes() {
        assert_eq!(resolve("/").name(), RouteName::Home);
        assert_eq!(resolve("/about").name(), RouteName::About);
        assert_eq!(resolve("/compound/list").name(), RouteName::CompoundList);
        assert_eq!(resolve("/compound/compare").name(), RouteName::CompoundCompare);
        assert_eq!(resolve("/fragment/list").name(), RouteName::FragmentList);
    }

    #[test]
    fn test_new_is_not_captured_as_id() {
        // "/compound/new" is declared before any ":id" pattern could claim it
        let route = resolve("/compound/new");
        assert_eq!(route.name(), RouteName::CompoundNew);
        assert!(route.params.is_empty());
    }

    #[test]
    fn test_resolve_captures_params() {
        let route = resolve("/compound/edit/42");
        assert_eq!(route.name(), RouteName::CompoundEdit);
        assert_eq!(route.param("id"), Some("42"));
        assert_eq!(route.param("missing"), None);

        let route = resolve("/fragment/view/abc");
        assert_eq!(route.name(), RouteName::FragmentView);
        assert_eq!(route.param("id"), Some("abc"));
    }

    #[test]
    fn test_resolve_normalizes_path() {
        let route = resolve("/compound//view/9/?tab=mass#top");
        assert_eq!(route.name(), RouteName::CompoundView);
        assert_eq!(route.path, "/compound/view/9");
        assert_eq!(resolve("").path, "/");
        assert_eq!(resolve("about").name(), RouteName::About);
    }

    #[test]
    fn test_unknown_paths_fall_through_to_not_found() {
        assert_eq!(resolve("/nope").name(), RouteName::NotFound);
        assert_eq!(resolve("/compound/edit").name(), RouteName::NotFound);
        assert_eq!(resolve("/compound/edit/1/extra").name(), RouteName::NotFound);
    }

    #[test]
    fn test_protected_routes() {
        let protected: Vec<RouteName> = RouteTable::standard()
            .routes()
            .iter()
            .filter(|r| r.requires_auth)
            .map(|r| r.name)
            .collect();
        assert_eq!(
            protected,
            vec![
                RouteName::CompoundNew,
                RouteName::CompoundEdit,
                RouteName::FragmentNew,
                RouteName::FragmentEdit,
            ]
        );
    }

    #[test]
    fn test_window_title() {
        assert_eq!(resolve("/about").window_title(), "MSTIDE DB 2.0 - About");
        assert_eq!(resolve("/x/y").window_title(), "MSTIDE DB 2.0 - 404 - Not Found");

        let untitled = Route {
            pattern: "/bare",
            name: RouteName::About,
            title: None,
            requires_auth: false,
        };
        let table = RouteTable::new(vec![untitled]);
        let route = table.resolve("/bare").expect("matches");
        assert_eq!(route.window_title(), "MSTIDE DB 2.0");
    }

    #[test]
    fn test_table_without_catch_all() {
        let table = RouteTable::new(vec![Route::public("/", RouteName::Home, "Home")]);
        assert!(table.resolve("/elsewhere").is_none());
    }
}
