use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::estimate::BudgetEstimateRecord;
use crate::models::summary::SummaryTotals;
use crate::models::transaction::{TransactionDraft, TransactionId, TransactionRecord};

/// The remote budget API, one method per endpoint.
///
/// Every method except [`BudgetApi::login`] takes the session token and is
/// expected to send it as `Authorization: Token <token>`. Implementations map
/// 401/403 to [`CoreError::Auth`] and 404 to [`CoreError::NotFound`]; callers
/// rely on that to end the session or reconcile their view.
#[async_trait]
pub trait BudgetApi: Send + Sync {
    /// `POST /login/`; returns the issued token.
    /// A rejected username/password is [`CoreError::InvalidCredentials`].
    async fn login(&self, username: &str, password: &str) -> Result<String, CoreError>;

    /// `POST /logout/`. Callers ignore the result.
    async fn logout(&self, token: &str) -> Result<(), CoreError>;

    /// `GET /summary/?year=&month=`
    async fn summary(&self, token: &str, year: i32, month: u32) -> Result<SummaryTotals, CoreError>;

    /// `GET /available-years/`
    async fn available_years(&self, token: &str) -> Result<Vec<i32>, CoreError>;

    /// `GET /available-months/?year=`; month numbers in whatever order the server likes.
    async fn available_months(&self, token: &str, year: i32) -> Result<Vec<u32>, CoreError>;

    /// `GET /transactions/`
    async fn list_transactions(&self, token: &str) -> Result<Vec<TransactionRecord>, CoreError>;

    /// `POST /transactions/`
    async fn create_transaction(&self, token: &str, draft: &TransactionDraft) -> Result<(), CoreError>;

    /// `PUT /transactions/{id}/`, a full-record replace.
    async fn update_transaction(
        &self,
        token: &str,
        id: TransactionId,
        draft: &TransactionDraft,
    ) -> Result<(), CoreError>;

    /// `DELETE /transactions/{id}/`
    async fn delete_transaction(&self, token: &str, id: TransactionId) -> Result<(), CoreError>;

    /// `GET /budget/`
    async fn list_budget_estimates(&self, token: &str) -> Result<Vec<BudgetEstimateRecord>, CoreError>;
}
