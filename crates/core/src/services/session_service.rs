use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::watch;

use crate::api::traits::BudgetApi;
use crate::errors::CoreError;
use crate::models::session::{LoginForm, Session, TOKEN_KEY, USERNAME_KEY};
use crate::storage::store::KeyValueStore;

/// View state that belongs to one session and is dropped when it ends.
pub trait SessionScoped: Send + Sync {
    fn session_ended(&self);
}

/// Owner of the single active [`Session`].
///
/// The session is persisted under fixed keys so it survives a restart, and
/// published over a watch channel so views can react to login/logout. Nothing
/// else writes the persisted keys.
pub struct SessionStore {
    api: Arc<dyn BudgetApi>,
    storage: Box<dyn KeyValueStore>,
    current: watch::Sender<Option<Session>>,
    scoped: Mutex<Vec<Weak<dyn SessionScoped>>>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &*self.current.borrow())
            .finish()
    }
}

impl SessionStore {
    /// Restore whatever session was persisted. A token without a username (or
    /// the reverse) is not a session and is cleared.
    pub fn restore(api: Arc<dyn BudgetApi>, storage: Box<dyn KeyValueStore>) -> Result<Self, CoreError> {
        let token = storage.get(TOKEN_KEY)?;
        let username = storage.get(USERNAME_KEY)?;

        let session = match (username, token) {
            (Some(username), Some(token)) => Session::new(username, token).ok(),
            _ => None,
        };
        if session.is_none() {
            storage.remove_many(&[TOKEN_KEY, USERNAME_KEY])?;
        } else {
            tracing::info!("restored persisted session");
        }

        let (current, _) = watch::channel(session);
        Ok(Self {
            api,
            storage,
            current,
            scoped: Mutex::new(Vec::new()),
        })
    }

    /// Validate the form, exchange it for a token and store the new session.
    ///
    /// On any failure the existing session state is left exactly as it was.
    pub async fn sign_in(&self, form: &LoginForm) -> Result<Session, CoreError> {
        form.validate()?;
        let username = form.username.trim();

        let token = match self.api.login(username, &form.password).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(%username, error = %e, "login failed");
                return Err(e);
            }
        };

        self.login(username, &token)?;
        tracing::info!(%username, "signed in");
        Session::new(username, token)
    }

    /// Store both fields together (both-or-neither) and publish the session.
    pub fn login(&self, identity: &str, credential: &str) -> Result<(), CoreError> {
        let session = Session::new(identity, credential)?;
        self.storage
            .set_many(&[(TOKEN_KEY, credential), (USERNAME_KEY, identity)])?;
        self.current.send_replace(Some(session));
        Ok(())
    }

    /// Tell the server (ignoring any failure), then clear the session locally.
    ///
    /// Always ends with no session in memory and every attached view reset,
    /// whatever the server says. If the persisted keys could not be removed
    /// the storage error is returned, since a restart would restore them.
    pub async fn logout(&self) -> Result<(), CoreError> {
        if let Some(session) = self.snapshot() {
            if let Err(e) = self.api.logout(session.credential()).await {
                tracing::debug!(error = %e, "server logout failed, clearing session anyway");
            }
        }
        let cleared = self.storage.remove_many(&[TOKEN_KEY, USERNAME_KEY]);
        if let Err(e) = &cleared {
            tracing::error!(error = %e, "failed to clear persisted session");
        }
        if self.current.send_replace(None).is_some() {
            tracing::info!("signed out");
        }
        self.end_scoped();
        cleared
    }

    /// Register view state to be reset whenever the session ends.
    /// Only a weak reference is kept.
    pub fn attach(&self, scoped: &Arc<dyn SessionScoped>) {
        let mut attached = self.lock_scoped();
        attached.retain(|view| view.strong_count() > 0);
        attached.push(Arc::downgrade(scoped));
    }

    fn end_scoped(&self) {
        let live: Vec<Arc<dyn SessionScoped>> =
            self.lock_scoped().iter().filter_map(Weak::upgrade).collect();
        for view in live {
            view.session_ended();
        }
    }

    fn lock_scoped(&self) -> std::sync::MutexGuard<'_, Vec<Weak<dyn SessionScoped>>> {
        self.scoped.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.borrow().is_some()
    }

    pub fn current_identity(&self) -> Option<String> {
        self.current.borrow().as_ref().map(|s| s.identity().to_string())
    }

    /// Token for an outgoing call, or [`CoreError::Auth`] if signed out.
    pub fn credential(&self) -> Result<String, CoreError> {
        self.current
            .borrow()
            .as_ref()
            .map(|s| s.credential().to_string())
            .ok_or_else(|| CoreError::Auth("Not signed in".into()))
    }

    pub fn snapshot(&self) -> Option<Session> {
        self.current.borrow().clone()
    }

    /// Change notifications: the new session (or `None`) after every login/logout.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.current.subscribe()
    }

    /// Pass a remote call's result through, ending the session first if the
    /// server rejected the credential. The result itself is returned unchanged.
    pub async fn screen<T>(&self, result: Result<T, CoreError>) -> Result<T, CoreError> {
        if let Err(e) = &result {
            if e.is_auth() {
                tracing::warn!(error = %e, "authorization rejected, ending session");
                // Storage failures are already logged; the caller gets the auth error.
                let _ = self.logout().await;
            }
        }
        result
    }
}
