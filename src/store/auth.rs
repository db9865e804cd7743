//! Session state: who is logged in and with which token.

use std::sync::{Arc, RwLock};

use inkpost_api_types::User;
use serde::Serialize;
use tracing::{info, warn};

use crate::infra::error::InfraError;
use crate::infra::session::{SessionStorage, TOKEN_KEY, USER_KEY};
use crate::util::lock::{rw_read, rw_write};

const SOURCE: &str = "store::auth";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Anonymous,
    Authenticated,
}

#[derive(Debug, Default)]
struct AuthState {
    session: Session,
    is_loading: bool,
}

/// Holds the current session and mirrors it into durable storage.
///
/// Every transition swaps the whole session under one write lock, so readers
/// observe either the old or the new session, never a mix. A new session is
/// persisted before it is swapped in, and not swapped in at all when
/// persisting fails. Clearing happens in memory first; a storage failure is
/// then reported to the caller.
pub struct AuthStore {
    state: RwLock<AuthState>,
    storage: Arc<dyn SessionStorage>,
}

impl AuthStore {
    /// Anonymous store backed by `storage`; nothing is read from it.
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            state: RwLock::new(AuthState::default()),
            storage,
        }
    }

    /// Rehydrate the session persisted by an earlier process.
    ///
    /// A stored user record is only restored alongside a token. An unreadable
    /// user record is dropped with a warning; the token alone still
    /// authenticates requests. Storage that cannot be read at all yields an
    /// anonymous store, and the next login or logout overwrites it.
    pub fn restore(storage: Arc<dyn SessionStorage>) -> Self {
        let session = match Self::read_persisted(storage.as_ref()) {
            Ok(session) => session,
            Err(err) => {
                warn!(error = %err, "stored session unreadable; starting anonymous");
                Session::default()
            }
        };

        let store = Self::new(storage);
        rw_write(&store.state, SOURCE, "restore").session = session;
        store
    }

    fn read_persisted(storage: &dyn SessionStorage) -> Result<Session, InfraError> {
        let token = storage.get(TOKEN_KEY)?.filter(|token| !token.is_empty());
        let user = match token {
            Some(_) => storage.get(USER_KEY)?.and_then(|raw| {
                serde_json::from_str::<User>(&raw)
                    .map_err(|err| warn!(error = %err, "discarding unreadable stored user"))
                    .ok()
            }),
            None => None,
        };
        Ok(Session { user, token })
    }

    /// Persist a freshly issued session, then make it current.
    ///
    /// When persisting fails the previous session stays current and the
    /// stored token is put back.
    pub fn set_credentials(&self, user: User, token: String) -> Result<(), InfraError> {
        let encoded_user = serde_json::to_string(&user)
            .map_err(|err| InfraError::storage(format!("failed to encode user: {err}")))?;

        self.storage.set(TOKEN_KEY, &token)?;
        if let Err(err) = self.storage.set(USER_KEY, &encoded_user) {
            self.restore_stored_token();
            return Err(err);
        }

        {
            let mut state = rw_write(&self.state, SOURCE, "set_credentials");
            state.session = Session {
                user: Some(user),
                token: Some(token),
            };
            state.is_loading = false;
        }
        info!(phase = "authenticated", "session established");
        Ok(())
    }

    fn restore_stored_token(&self) {
        let previous = self.token();
        let rollback = match previous.as_deref() {
            Some(token) => self.storage.set(TOKEN_KEY, token),
            None => self.storage.remove(TOKEN_KEY),
        };
        if let Err(err) = rollback {
            warn!(error = %err, "failed to restore stored token");
        }
    }

    /// Clear the session in memory and in durable storage.
    pub fn logout(&self) -> Result<(), InfraError> {
        {
            let mut state = rw_write(&self.state, SOURCE, "logout");
            state.session = Session::default();
            state.is_loading = false;
        }
        info!(phase = "anonymous", "session cleared");

        self.storage.remove(TOKEN_KEY)?;
        self.storage.remove(USER_KEY)
    }

    /// Logout on behalf of the client layer, which has no caller to report a
    /// storage failure to.
    pub(crate) fn expire(&self) {
        if let Err(err) = self.logout() {
            warn!(error = %err, "failed to clear persisted session");
        }
    }

    pub fn session(&self) -> Session {
        rw_read(&self.state, SOURCE, "session").session.clone()
    }

    pub fn token(&self) -> Option<String> {
        rw_read(&self.state, SOURCE, "token").session.token.clone()
    }

    pub fn user(&self) -> Option<User> {
        rw_read(&self.state, SOURCE, "user").session.user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase() == AuthPhase::Authenticated
    }

    pub fn phase(&self) -> AuthPhase {
        if rw_read(&self.state, SOURCE, "phase").session.token.is_some() {
            AuthPhase::Authenticated
        } else {
            AuthPhase::Anonymous
        }
    }

    pub fn set_loading(&self, loading: bool) {
        rw_write(&self.state, SOURCE, "set_loading").is_loading = loading;
    }

    pub fn is_loading(&self) -> bool {
        rw_read(&self.state, SOURCE, "is_loading").is_loading
    }
}
