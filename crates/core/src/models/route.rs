use serde::{Deserialize, Serialize};

/// Every view the client can navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    Root,
    Login,
    Dashboard,
    Transactions,
    Estimated,
}

impl Route {
    /// Where an authenticated user lands by default.
    pub const DEFAULT_PROTECTED: Route = Route::Dashboard;

    pub fn path(self) -> &'static str {
        match self {
            Route::Root => "/",
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
            Route::Transactions => "/transactions",
            Route::Estimated => "/estimated",
        }
    }

    /// Resolve a path; unknown paths fall back to [`Route::Root`].
    pub fn from_path(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "/login" => Route::Login,
            "/dashboard" => Route::Dashboard,
            "/transactions" => Route::Transactions,
            "/estimated" => Route::Estimated,
            _ => Route::Root,
        }
    }

    /// Protected views require a session to render.
    pub fn is_protected(self) -> bool {
        matches!(self, Route::Dashboard | Route::Transactions | Route::Estimated)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Outcome of a navigation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The requested view may mount.
    Render(Route),
    /// Go here instead.
    Redirect(Route),
}

impl Navigation {
    pub fn target(self) -> Route {
        match self {
            Navigation::Render(route) | Navigation::Redirect(route) => route,
        }
    }

    pub fn is_redirect(self) -> bool {
        matches!(self, Navigation::Redirect(_))
    }
}
