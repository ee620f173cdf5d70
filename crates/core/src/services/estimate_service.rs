use std::sync::Arc;

use tokio::sync::watch;

use crate::api::traits::BudgetApi;
use crate::errors::CoreError;
use crate::models::estimate::BudgetEstimateRecord;

use super::collection_service::{CollectionState, CollectionStore};
use super::sequencer::Resolution;
use super::session_service::SessionStore;

pub const ESTIMATES_FAILED: &str = "Failed to fetch budget estimates";

/// Read-only, searchable list of monthly budget estimates.
pub struct EstimateBrowser {
    api: Arc<dyn BudgetApi>,
    collection: CollectionStore<BudgetEstimateRecord>,
}

impl EstimateBrowser {
    pub fn new(api: Arc<dyn BudgetApi>, session: Arc<SessionStore>) -> Self {
        Self {
            api,
            collection: CollectionStore::new(session, ESTIMATES_FAILED),
        }
    }

    pub async fn load(&self) -> Result<Resolution, CoreError> {
        let api = Arc::clone(&self.api);
        self.collection
            .load(move |token| async move { api.list_budget_estimates(&token).await })
            .await
    }

    /// Matches year, month name, income or expense.
    pub fn search(&self, query: &str) {
        self.collection.search(query);
    }

    pub fn snapshot(&self) -> CollectionState<BudgetEstimateRecord> {
        self.collection.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<CollectionState<BudgetEstimateRecord>> {
        self.collection.subscribe()
    }

    pub fn dismiss_notice(&self) {
        self.collection.dismiss_notice();
    }
}
