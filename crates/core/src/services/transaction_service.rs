use std::sync::Arc;

use tokio::sync::watch;

use crate::api::traits::BudgetApi;
use crate::errors::CoreError;
use crate::models::notice::Notice;
use crate::models::transaction::{TransactionDraft, TransactionForm, TransactionId, TransactionRecord};

use super::collection_service::{CollectionState, CollectionStore};
use super::mutation_service::{Mutation, MutationCoordinator};
use super::sequencer::Resolution;
use super::session_service::SessionStore;

pub const TRANSACTIONS_FAILED: &str = "Failed to fetch transactions";

/// Whether the dialog adds a new transaction or replaces an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogMode {
    #[default]
    Create,
    Edit(TransactionId),
}

/// State of the add/edit transaction dialog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditDialog {
    pub open: bool,
    pub mode: DialogMode,
    pub form: TransactionForm,
    /// A save is in flight; the save control is disabled.
    pub submitting: bool,
    /// Validation or server message for the last failed save.
    pub error: Option<String>,
    /// Bumped every time the dialog is opened, reset or cancelled.
    generation: u64,
}

impl EditDialog {
    pub fn title(&self) -> &'static str {
        match self.mode {
            DialogMode::Create => "Add Transaction",
            DialogMode::Edit(_) => "Edit Transaction",
        }
    }

    pub fn can_submit(&self) -> bool {
        self.open && !self.submitting
    }
}

/// The transactions view: a searchable list plus the dialog that edits it.
///
/// Writes go through the [`MutationCoordinator`]; the list is never patched
/// locally. After the server confirms a write the whole list is refetched and
/// the current query re-applied.
pub struct TransactionBrowser {
    api: Arc<dyn BudgetApi>,
    collection: CollectionStore<TransactionRecord>,
    coordinator: MutationCoordinator,
    dialog: watch::Sender<EditDialog>,
}

impl TransactionBrowser {
    pub fn new(api: Arc<dyn BudgetApi>, session: Arc<SessionStore>) -> Self {
        let (dialog, _) = watch::channel(EditDialog::default());
        Self {
            collection: CollectionStore::new(Arc::clone(&session), TRANSACTIONS_FAILED),
            coordinator: MutationCoordinator::new(Arc::clone(&api), session),
            api,
            dialog,
        }
    }

    // ── List ────────────────────────────────────────────────────────

    pub async fn load(&self) -> Result<Resolution, CoreError> {
        let api = Arc::clone(&self.api);
        self.collection
            .load(move |token| async move { api.list_transactions(&token).await })
            .await
    }

    pub fn search(&self, query: &str) {
        self.collection.search(query);
    }

    pub fn snapshot(&self) -> CollectionState<TransactionRecord> {
        self.collection.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<CollectionState<TransactionRecord>> {
        self.collection.subscribe()
    }

    pub fn dismiss_notice(&self) {
        self.collection.dismiss_notice();
    }

    // ── Mutations ───────────────────────────────────────────────────

    pub async fn create(&self, draft: TransactionDraft) -> Result<(), CoreError> {
        self.mutate(Mutation::Create(draft)).await
    }

    pub async fn update(&self, id: TransactionId, draft: TransactionDraft) -> Result<(), CoreError> {
        self.mutate(Mutation::Update(id, draft)).await
    }

    pub async fn delete(&self, id: TransactionId) -> Result<(), CoreError> {
        self.mutate(Mutation::Delete(id)).await
    }

    async fn mutate(&self, mutation: Mutation) -> Result<(), CoreError> {
        match self.coordinator.execute(&mutation).await {
            Ok(()) => {
                self.collection.notify(Notice::success(mutation.success_message()));
                // A failed refetch posts its own notice; the write itself stands.
                let _ = self.load().await;
                Ok(())
            }
            Err(e) if e.is_validation() => {
                self.collection.notify(Notice::warning(e.user_message()));
                Err(e)
            }
            Err(e) if e.is_not_found() => {
                self.collection.notify(Notice::error(e.user_message()));
                // The row is gone server-side; show the server's truth.
                let _ = self.load().await;
                Err(e)
            }
            Err(e) => {
                self.collection.notify(Notice::error(e.user_message()));
                Err(e)
            }
        }
    }

    // ── Edit dialog ─────────────────────────────────────────────────

    pub fn dialog(&self) -> EditDialog {
        self.dialog.borrow().clone()
    }

    pub fn subscribe_dialog(&self) -> watch::Receiver<EditDialog> {
        self.dialog.subscribe()
    }

    /// Open an empty form: no category, type expense, no amount.
    ///
    /// Like every other dialog change this fails with [`CoreError::Busy`]
    /// while a save is in flight.
    pub fn open_create(&self) -> Result<(), CoreError> {
        self.replace_dialog(EditDialog {
            open: true,
            ..EditDialog::default()
        })
    }

    /// Open the form prefilled with `record`.
    pub fn open_edit(&self, record: &TransactionRecord) -> Result<(), CoreError> {
        self.replace_dialog(EditDialog {
            open: true,
            mode: DialogMode::Edit(record.id),
            form: TransactionForm::from(record),
            ..EditDialog::default()
        })
    }

    /// Replace the form's field values as the user types.
    pub fn edit_form(&self, form: TransactionForm) -> Result<(), CoreError> {
        let mut outcome = Ok(());
        self.dialog.send_if_modified(|d| {
            if d.submitting {
                outcome = Err(CoreError::Busy);
                return false;
            }
            d.form = form;
            d.error = None;
            true
        });
        outcome
    }

    /// Close and reset the dialog without saving.
    pub fn cancel(&self) -> Result<(), CoreError> {
        self.replace_dialog(EditDialog::default())
    }

    fn replace_dialog(&self, next: EditDialog) -> Result<(), CoreError> {
        let mut outcome = Ok(());
        self.dialog.send_if_modified(|d| {
            if d.submitting {
                outcome = Err(CoreError::Busy);
                return false;
            }
            *d = EditDialog {
                generation: d.generation + 1,
                ..next
            };
            true
        });
        outcome
    }

    /// Save the dialog: create in create mode, full replace in edit mode.
    ///
    /// Only one save can be in flight; until it finishes a second submit,
    /// and any attempt to reopen, edit or cancel the dialog, fails with
    /// [`CoreError::Busy`] and sends nothing. On success the dialog closes and
    /// resets; on failure it stays open with the error message. The outcome is
    /// only applied to the dialog the save started from.
    pub async fn submit(&self) -> Result<(), CoreError> {
        let mut claim = Err(CoreError::Busy);
        let mut generation = 0;
        self.dialog.send_if_modified(|d| {
            if !d.open {
                claim = Err(CoreError::Validation("No transaction is being edited".into()));
                return false;
            }
            if d.submitting {
                return false;
            }
            match d.form.to_draft() {
                Ok(draft) => {
                    d.submitting = true;
                    d.error = None;
                    generation = d.generation;
                    claim = Ok(match d.mode {
                        DialogMode::Create => Mutation::Create(draft),
                        DialogMode::Edit(id) => Mutation::Update(id, draft),
                    });
                }
                Err(e) => {
                    d.error = Some(e.user_message());
                    claim = Err(e);
                }
            }
            true
        });
        let mutation = claim?;

        let result = self.mutate(mutation).await;

        self.dialog.send_if_modified(|d| {
            if d.generation != generation {
                return false;
            }
            match &result {
                Ok(()) => {
                    *d = EditDialog {
                        generation: d.generation + 1,
                        ..EditDialog::default()
                    }
                }
                Err(e) => {
                    d.submitting = false;
                    d.error = Some(e.user_message());
                }
            }
            true
        });
        result
    }
}
