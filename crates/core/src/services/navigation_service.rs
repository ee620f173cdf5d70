use std::sync::Arc;

use crate::models::route::{Navigation, Route};

use super::session_service::SessionStore;

/// Gate evaluated on every navigation.
///
/// It keeps no state of its own: each call asks the [`SessionStore`] again,
/// so a back-navigation after logout is redirected like any other.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    session: Arc<SessionStore>,
}

impl RouteGuard {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    /// Decide whether `route` may mount, or where to go instead.
    pub fn check(&self, route: Route) -> Navigation {
        let authenticated = self.session.is_authenticated();
        let outcome = match route {
            Route::Root if authenticated => Navigation::Redirect(Route::DEFAULT_PROTECTED),
            Route::Root => Navigation::Redirect(Route::Login),
            Route::Login if authenticated => Navigation::Redirect(Route::DEFAULT_PROTECTED),
            Route::Login => Navigation::Render(Route::Login),
            protected if authenticated => Navigation::Render(protected),
            _ => Navigation::Redirect(Route::Login),
        };
        if let Navigation::Redirect(to) = outcome {
            tracing::debug!(from = %route, %to, "navigation redirected");
        }
        outcome
    }

    /// Follow redirects until a view renders. Redirect chains are at most two
    /// hops (`/` → `/login`), so this always terminates.
    pub fn resolve(&self, route: Route) -> Route {
        let mut current = route;
        loop {
            match self.check(current) {
                Navigation::Render(view) => return view,
                Navigation::Redirect(next) => current = next,
            }
        }
    }

    /// [`RouteGuard::resolve`] for a raw path.
    pub fn navigate(&self, path: &str) -> Route {
        self.resolve(Route::from_path(path))
    }
}
