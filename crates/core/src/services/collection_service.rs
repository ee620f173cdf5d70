use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;

use crate::errors::CoreError;
use crate::models::notice::Notice;

use super::search_service::{CollectionView, Searchable};
use super::sequencer::{RequestSequencer, Resolution};
use super::session_service::{SessionScoped, SessionStore};

/// A browsable, searchable server collection.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionState<T> {
    pub view: CollectionView<T>,
    pub loading: bool,
    pub notice: Option<Notice>,
}

impl<T> Default for CollectionState<T> {
    fn default() -> Self {
        Self {
            view: CollectionView::default(),
            loading: false,
            notice: None,
        }
    }
}

/// Read-through cache of one collection for the lifetime of a view.
///
/// Fetches replace the source wholesale and re-apply the current query;
/// a failed fetch keeps the last good source. Overlapping fetches are
/// sequenced so only the newest response lands.
///
/// The cached rows belong to the session that fetched them: when it ends the
/// view is emptied and any fetch still in flight is dropped on arrival.
pub struct CollectionStore<T> {
    session: Arc<SessionStore>,
    shared: Arc<Shared<T>>,
    failure: &'static str,
}

struct Shared<T> {
    state: watch::Sender<CollectionState<T>>,
    sequencer: Mutex<RequestSequencer<()>>,
}

impl<T> Shared<T> {
    fn lock_sequencer(&self) -> std::sync::MutexGuard<'_, RequestSequencer<()>> {
        self.sequencer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Send + Sync> SessionScoped for Shared<T> {
    fn session_ended(&self) {
        self.state.send_modify(|s| {
            self.lock_sequencer().invalidate(());
            *s = CollectionState::default();
        });
    }
}

impl<T: Searchable + Clone + Send + Sync> CollectionStore<T> {
    /// `failure` is the notice shown when a fetch fails.
    pub fn new(session: Arc<SessionStore>, failure: &'static str) -> Self {
        let (state, _) = watch::channel(CollectionState::default());
        let shared = Arc::new(Shared {
            state,
            sequencer: Mutex::new(RequestSequencer::new()),
        });
        let scoped: Arc<dyn SessionScoped> = shared.clone();
        session.attach(&scoped);
        Self {
            session,
            shared,
            failure,
        }
    }

    pub fn snapshot(&self) -> CollectionState<T> {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CollectionState<T>> {
        self.shared.state.subscribe()
    }

    /// Re-filter synchronously; no network.
    pub fn search(&self, query: &str) {
        self.shared.state.send_modify(|s| s.view.set_query(query));
    }

    pub fn notify(&self, notice: Notice) {
        self.shared.state.send_modify(|s| s.notice = Some(notice));
    }

    pub fn dismiss_notice(&self) {
        self.shared.state.send_if_modified(|s| s.notice.take().is_some());
    }

    /// Fetch the full collection with `request` and rebuild the view from it.
    pub async fn load<F, Fut>(&self, request: F) -> Result<Resolution, CoreError>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<Vec<T>, CoreError>>,
    {
        let token = self.session.credential()?;
        let ticket = self.shared.lock_sequencer().issue(());
        self.shared.state.send_modify(|s| s.loading = true);

        let result = self.session.screen(request(token).await).await;

        let mut result = Some(result);
        let mut outcome = Ok(Resolution::Stale);
        self.shared.state.send_if_modified(|s| {
            if !self.shared.lock_sequencer().is_current(ticket) {
                // A rejected credential is reported even though the view was reset.
                if let Some(Err(e)) = result.take() {
                    if e.is_auth() {
                        outcome = Err(e);
                    }
                }
                return false;
            }
            s.loading = false;
            match result.take() {
                Some(Ok(records)) => {
                    s.view.replace_source(records);
                    outcome = Ok(Resolution::Applied);
                }
                Some(Err(e)) => {
                    s.notice = Some(Notice::error(self.failure));
                    outcome = Err(e);
                }
                None => {}
            }
            true
        });

        match &outcome {
            Ok(Resolution::Applied) => {
                tracing::debug!(rows = self.shared.state.borrow().view.source().len(), "collection loaded");
            }
            Ok(Resolution::Stale) => tracing::debug!(seq = ticket.seq, "discarded stale collection response"),
            Err(e) => tracing::warn!(error = %e, "{}", self.failure),
        }
        outcome
    }
}
