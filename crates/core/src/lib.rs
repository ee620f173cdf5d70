pub mod api;
pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod services;
pub mod storage;

use std::sync::Arc;

use api::http::HttpBudgetApi;
use api::traits::BudgetApi;
use chrono::NaiveDate;
use config::ClientConfig;
use errors::CoreError;
use models::route::{Navigation, Route};
use models::session::{LoginForm, Session};
use services::{
    dashboard_service::DashboardOrchestrator, estimate_service::EstimateBrowser,
    navigation_service::RouteGuard, session_service::SessionStore,
    transaction_service::TransactionBrowser,
};
use storage::file_store::FileStore;
use storage::store::KeyValueStore;

/// Main entry point for the Budget Tracker core library.
///
/// Owns the one [`SessionStore`] and hands it to every component that talks
/// to the API, so a rejected credential anywhere ends the session everywhere.
#[must_use]
pub struct BudgetTracker {
    config: ClientConfig,
    session: Arc<SessionStore>,
    guard: RouteGuard,
    dashboard: DashboardOrchestrator,
    transactions: TransactionBrowser,
    estimates: EstimateBrowser,
}

impl std::fmt::Debug for BudgetTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BudgetTracker")
            .field("api_url", &self.config.api_url)
            .field("identity", &self.session.current_identity())
            .finish()
    }
}

impl BudgetTracker {
    /// Build a client that talks HTTP to `config.api_url` and persists the
    /// session at `config.session_path`.
    pub fn connect(config: ClientConfig) -> Result<Self, CoreError> {
        let config = config.validated()?;
        let api: Arc<dyn BudgetApi> = Arc::new(HttpBudgetApi::new(&config));
        let storage = FileStore::open(config.session_path.clone())?;
        tracing::info!(api_url = %config.api_url, "budget tracker client ready");
        Self::with_parts(config, api, Box::new(storage))
    }

    /// Build a client from explicit parts (custom transport or storage).
    pub fn with_parts(
        config: ClientConfig,
        api: Arc<dyn BudgetApi>,
        storage: Box<dyn KeyValueStore>,
    ) -> Result<Self, CoreError> {
        let session = Arc::new(SessionStore::restore(Arc::clone(&api), storage)?);
        Ok(Self {
            config,
            guard: RouteGuard::new(Arc::clone(&session)),
            dashboard: DashboardOrchestrator::new(Arc::clone(&api), Arc::clone(&session)),
            transactions: TransactionBrowser::new(Arc::clone(&api), Arc::clone(&session)),
            estimates: EstimateBrowser::new(api, Arc::clone(&session)),
            session,
        })
    }

    // ── Session ─────────────────────────────────────────────────────

    /// Log in with the form's username and password.
    pub async fn sign_in(&self, form: &LoginForm) -> Result<Session, CoreError> {
        self.session.sign_in(form).await
    }

    /// Log out. The session and every view's data are always cleared in
    /// memory; an error means the persisted session could not be removed.
    pub async fn sign_out(&self) -> Result<(), CoreError> {
        self.session.logout().await
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    #[must_use]
    pub fn current_identity(&self) -> Option<String> {
        self.session.current_identity()
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    // ── Navigation ──────────────────────────────────────────────────

    /// Check a single navigation step.
    #[must_use]
    pub fn check_route(&self, route: Route) -> Navigation {
        self.guard.check(route)
    }

    /// The view that actually renders for `path`, after redirects.
    #[must_use]
    pub fn navigate(&self, path: &str) -> Route {
        self.guard.navigate(path)
    }

    /// Navigate to `path` and load whatever the rendered view needs.
    /// Returns the view that rendered.
    pub async fn open(&self, path: &str, today: NaiveDate) -> Route {
        let route = self.navigate(path);
        match route {
            Route::Dashboard => self.dashboard.mount(today).await,
            Route::Transactions => {
                let _ = self.transactions.load().await;
            }
            Route::Estimated => {
                let _ = self.estimates.load().await;
            }
            Route::Login | Route::Root => {}
        }
        route
    }

    // ── Views ───────────────────────────────────────────────────────

    #[must_use]
    pub fn dashboard(&self) -> &DashboardOrchestrator {
        &self.dashboard
    }

    #[must_use]
    pub fn transactions(&self) -> &TransactionBrowser {
        &self.transactions
    }

    #[must_use]
    pub fn estimates(&self) -> &EstimateBrowser {
        &self.estimates
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}
