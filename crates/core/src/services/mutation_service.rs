use std::sync::Arc;

use crate::api::traits::BudgetApi;
use crate::errors::CoreError;
use crate::models::transaction::{TransactionDraft, TransactionId};

use super::session_service::SessionStore;

/// One write against the transactions endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Create(TransactionDraft),
    Update(TransactionId, TransactionDraft),
    Delete(TransactionId),
}

impl Mutation {
    /// Notice shown once the server confirms the write.
    pub fn success_message(&self) -> &'static str {
        match self {
            Mutation::Create(_) => "Created successfully",
            Mutation::Update(..) => "Updated successfully",
            Mutation::Delete(_) => "Deleted successfully",
        }
    }

    fn validate(&self) -> Result<(), CoreError> {
        match self {
            Mutation::Create(draft) | Mutation::Update(_, draft) => draft.validate(),
            Mutation::Delete(_) => Ok(()),
        }
    }
}

/// Sends validated writes to the server, exactly one call per mutation.
///
/// It never touches local collections; reconciling the view (a full refetch)
/// is the caller's job once the server has answered.
pub struct MutationCoordinator {
    api: Arc<dyn BudgetApi>,
    session: Arc<SessionStore>,
}

impl MutationCoordinator {
    pub fn new(api: Arc<dyn BudgetApi>, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    pub async fn create(&self, draft: TransactionDraft) -> Result<(), CoreError> {
        self.execute(&Mutation::Create(draft)).await
    }

    pub async fn update(&self, id: TransactionId, draft: TransactionDraft) -> Result<(), CoreError> {
        self.execute(&Mutation::Update(id, draft)).await
    }

    pub async fn delete(&self, id: TransactionId) -> Result<(), CoreError> {
        self.execute(&Mutation::Delete(id)).await
    }

    /// Validate locally, then issue the single matching API call.
    /// Validation failures return before anything is sent.
    pub async fn execute(&self, mutation: &Mutation) -> Result<(), CoreError> {
        mutation.validate()?;
        let token = self.session.credential()?;

        let result = match mutation {
            Mutation::Create(draft) => self.api.create_transaction(&token, draft).await,
            Mutation::Update(id, draft) => self.api.update_transaction(&token, *id, draft).await,
            Mutation::Delete(id) => self.api.delete_transaction(&token, *id).await,
        };

        match &result {
            Ok(()) => tracing::info!(?mutation, "transaction change saved"),
            Err(e) => tracing::warn!(?mutation, error = %e, "transaction change failed"),
        }
        self.session.screen(result).await
    }
}
