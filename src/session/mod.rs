//! Session manager: credential lifecycle, expiry watchdog, route access.
//!
//! ARCHITECTURE
//! ============
//! One `SessionManager` per process, constructed by the composition root and
//! cloned into whatever needs it. It exclusively owns the persisted
//! `token`/`user` keys and the in-memory session; views read state through
//! `snapshot()` or `subscribe()` and never touch storage.
//!
//! CONCURRENCY
//! ===========
//! State lives behind a `std::sync::Mutex` that is never held across an
//! await. Every transition bumps a generation counter. The watchdog and the
//! async `authenticate`/`refresh_credential` continuations capture the
//! generation up front and drop their result if it moved, so a superseded
//! timer or a slow response cannot touch a newer session.
//!
//! ERROR HANDLING
//! ==============
//! Storage failures are logged and ignored: the session keeps working in
//! memory for the life of the process. Expired or malformed credentials turn
//! into a logout, never into an error for the caller.

pub mod clock;
pub mod credential;
pub mod store;
pub mod watchdog;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use time::OffsetDateTime;
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub use clock::{Clock, SystemClock};
pub use credential::{Credential, CredentialError};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use watchdog::Watchdog;

use crate::net::{ApiError, AuthBackend, UserRecord};
use crate::route::{self, GateDecision};

/// Storage key holding the raw bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key holding the JSON-encoded [`UserRecord`].
pub const USER_KEY: &str = "user";
/// How long before expiry the watchdog logs the session out.
pub const DEFAULT_WATCHDOG_LEAD: Duration = Duration::from_secs(60);

const INVALID_CREDENTIALS: &str = "Invalid credentials";

// =============================================================================
// SNAPSHOT & ERRORS
// =============================================================================

/// Immutable view of the session at one instant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub authenticated: bool,
    pub identity: Option<UserRecord>,
    pub credential: Option<Credential>,
}

/// Failure of an interactive login. The only session error shown to a user.
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("{0}")]
    Rejected(String),
    #[error("could not reach the server: {0}")]
    Transport(String),
    #[error("server issued an unusable token: {0}")]
    Credential(#[from] CredentialError),
    #[error("login was superseded by another session change")]
    Superseded,
}

impl From<ApiError> for LoginError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized { message } | ApiError::Status { message, .. } => Self::Rejected(message),
            ApiError::Transport(e) | ApiError::ClientBuild(e) => Self::Transport(e),
            ApiError::Parse(_) | ApiError::MissingData => Self::Rejected(INVALID_CREDENTIALS.to_owned()),
        }
    }
}

// =============================================================================
// MANAGER
// =============================================================================

struct SessionState {
    credential: Option<Credential>,
    identity: Option<UserRecord>,
    generation: u64,
    watchdog: Watchdog,
}

struct Shared {
    state: Mutex<SessionState>,
    store: Arc<dyn KeyValueStore>,
    backend: Arc<dyn AuthBackend>,
    clock: Arc<dyn Clock>,
    watchdog_lead: Duration,
    changes: watch::Sender<SessionSnapshot>,
}

/// Cloneable handle to the process-wide session.
#[derive(Clone)]
pub struct SessionManager {
    shared: Arc<Shared>,
}

impl SessionManager {
    /// Empty session using the system clock and the default watchdog lead.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, backend: Arc<dyn AuthBackend>) -> Self {
        Self::with_options(store, backend, Arc::new(SystemClock), DEFAULT_WATCHDOG_LEAD)
    }

    #[must_use]
    pub fn with_options(
        store: Arc<dyn KeyValueStore>,
        backend: Arc<dyn AuthBackend>,
        clock: Arc<dyn Clock>,
        watchdog_lead: Duration,
    ) -> Self {
        let (changes, _) = watch::channel(SessionSnapshot::default());
        let state = SessionState { credential: None, identity: None, generation: 0, watchdog: Watchdog::new() };
        Self {
            shared: Arc::new(Shared { state: Mutex::new(state), store, backend, clock, watchdog_lead, changes }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.shared.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -------------------------------------------------------------------------
    // reads
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.lock();
        self.snapshot_of(&state)
    }

    /// True only while a credential is held and its expiry is still ahead.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        let state = self.lock();
        self.live_credential(&state).is_some()
    }

    #[must_use]
    pub fn identity(&self) -> Option<UserRecord> {
        self.lock().identity.clone()
    }

    /// Token to attach to backend calls, if the session is live.
    #[must_use]
    pub fn bearer_token(&self) -> Option<String> {
        let state = self.lock();
        self.live_credential(&state).map(|c| c.token().to_owned())
    }

    /// Receiver that observes every session transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.shared.changes.subscribe()
    }

    /// When the armed watchdog will fire, if one is armed.
    #[must_use]
    pub fn watchdog_deadline(&self) -> Option<tokio::time::Instant> {
        self.lock().watchdog.deadline()
    }

    /// Route decision for `path` against the current session.
    #[must_use]
    pub fn gate(&self, path: &str) -> GateDecision {
        route::gate(self.is_authenticated(), path)
    }

    pub(crate) fn generation(&self) -> u64 {
        self.lock().generation
    }

    // -------------------------------------------------------------------------
    // transitions
    // -------------------------------------------------------------------------

    /// Re-establish the session persisted by a previous run.
    ///
    /// Expired or unreadable credentials are wiped and leave the session
    /// empty. Must be called from within a tokio runtime.
    pub fn restore(&self) {
        let token = self.shared.store.get(TOKEN_KEY).unwrap_or_else(|e| {
            warn!(error = %e, "session: persisted token unreadable");
            None
        });
        let mut state = self.lock();
        let Some(token) = token else {
            debug!("session: nothing to restore");
            return;
        };

        let now = self.shared.clock.now();
        let credential = match Credential::parse(token) {
            Ok(credential) if !credential.is_expired_at(now) => credential,
            Ok(credential) => {
                info!(expired_at = %credential.expires_at(), "session: persisted credential expired");
                self.clear_locked(&mut state);
                return;
            }
            Err(e) => {
                warn!(error = %e, "session: persisted credential malformed");
                self.clear_locked(&mut state);
                return;
            }
        };

        let identity = self.read_identity();
        info!(expires_at = %credential.expires_at(), "session: restored");
        self.install_locked(&mut state, credential, identity, now);
    }

    /// Adopt a token obtained from the auth endpoint.
    ///
    /// Persists the pair, then flips the session to authenticated and re-arms
    /// the watchdog. Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns a [`CredentialError`] when the token cannot be decoded or has
    /// already expired. The session is logged out in that case.
    pub fn login(&self, token: impl Into<String>, identity: Option<UserRecord>) -> Result<(), CredentialError> {
        let mut state = self.lock();
        let now = self.shared.clock.now();
        match Self::accept(token.into(), now) {
            Ok(credential) => {
                self.persist(&credential, identity.as_ref());
                info!(expires_at = %credential.expires_at(), "session: logged in");
                self.install_locked(&mut state, credential, identity, now);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "session: login with unusable credential");
                self.clear_locked(&mut state);
                Err(e)
            }
        }
    }

    /// Clear the session, its storage, and the watchdog. Idempotent.
    pub fn logout(&self) {
        let mut state = self.lock();
        if state.credential.is_some() {
            info!("session: logged out");
        }
        self.clear_locked(&mut state);
    }

    /// Run the login exchange, then [`login`](Self::login) with the result.
    ///
    /// # Errors
    ///
    /// Returns a [`LoginError`] when the backend rejects the attempt, cannot be
    /// reached, issues an unusable token, or the session changed while the
    /// request was in flight. The session is left untouched on error.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<(), LoginError> {
        let generation = self.generation();
        let response = self.shared.backend.login(email, password).await?;

        let mut state = self.lock();
        if state.generation != generation {
            debug!(generation, current = state.generation, "session: discarding stale login response");
            return Err(LoginError::Superseded);
        }
        let now = self.shared.clock.now();
        let credential = Self::accept(response.access_token, now)?;
        let identity = response.user;
        self.persist(&credential, identity.as_ref());
        info!(expires_at = %credential.expires_at(), "session: logged in");
        self.install_locked(&mut state, credential, identity, now);
        Ok(())
    }

    /// Swap the current token for a fresh one.
    ///
    /// Returns `true` when the session now holds the new token. Any failure
    /// logs the session out; a response that arrives after the session moved
    /// on is dropped and leaves the newer session alone.
    pub async fn refresh_credential(&self) -> bool {
        let (token, generation) = {
            let state = self.lock();
            match &state.credential {
                Some(credential) => (credential.token().to_owned(), state.generation),
                None => (String::new(), state.generation),
            }
        };
        if token.is_empty() {
            debug!("session: refresh requested without a credential");
            self.logout();
            return false;
        }

        let result = self.shared.backend.refresh(&token).await;

        let mut state = self.lock();
        if state.generation != generation {
            debug!(generation, current = state.generation, "session: discarding stale refresh response");
            return false;
        }
        let now = self.shared.clock.now();
        let fresh = match result {
            Ok(Some(token)) => Self::accept(token, now).map_err(|e| e.to_string()),
            Ok(None) => Err("response carried no token".to_owned()),
            Err(e) => Err(e.to_string()),
        };
        match fresh {
            Ok(credential) => {
                let identity = state.identity.clone();
                self.persist(&credential, identity.as_ref());
                info!(expires_at = %credential.expires_at(), "session: credential refreshed");
                self.install_locked(&mut state, credential, identity, now);
                true
            }
            Err(reason) => {
                warn!(%reason, "session: refresh failed, logging out");
                self.clear_locked(&mut state);
                false
            }
        }
    }

    /// Watchdog callback for the session armed at `generation`.
    fn expire(&self, generation: u64) {
        let mut state = self.lock();
        if state.generation != generation {
            debug!(generation, current = state.generation, "session: ignoring superseded watchdog");
            return;
        }
        state.watchdog.release();
        info!("session: credential near expiry, logging out");
        self.clear_locked(&mut state);
    }

    // -------------------------------------------------------------------------
    // internals
    // -------------------------------------------------------------------------

    fn accept(token: String, now: OffsetDateTime) -> Result<Credential, CredentialError> {
        let credential = Credential::parse(token)?;
        if credential.is_expired_at(now) {
            return Err(CredentialError::Expired);
        }
        Ok(credential)
    }

    fn live_credential<'a>(&self, state: &'a SessionState) -> Option<&'a Credential> {
        let now = self.shared.clock.now();
        state.credential.as_ref().filter(|c| !c.is_expired_at(now))
    }

    fn snapshot_of(&self, state: &SessionState) -> SessionSnapshot {
        SessionSnapshot {
            authenticated: self.live_credential(state).is_some(),
            identity: state.identity.clone(),
            credential: state.credential.clone(),
        }
    }

    fn publish(&self, state: &SessionState) {
        let snapshot = self.snapshot_of(state);
        self.shared.changes.send_if_modified(|current| {
            if *current == snapshot {
                return false;
            }
            *current = snapshot;
            true
        });
    }

    fn read_identity(&self) -> Option<UserRecord> {
        let raw = match self.shared.store.get(USER_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "session: persisted user unreadable");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(identity) => Some(identity),
            Err(e) => {
                warn!(error = %e, "session: persisted user malformed, identity unknown");
                None
            }
        }
    }

    /// Write the pair before the in-memory flag flips, so a restart right
    /// after login sees it.
    fn persist(&self, credential: &Credential, identity: Option<&UserRecord>) {
        let store = &self.shared.store;
        if let Err(e) = store.set(TOKEN_KEY, credential.token()) {
            warn!(error = %e, "session: could not persist token, session will not survive restart");
        }
        let user_result = match identity.map(serde_json::to_string) {
            Some(Ok(raw)) => store.set(USER_KEY, &raw),
            Some(Err(e)) => {
                warn!(error = %e, "session: could not encode user record");
                store.remove(USER_KEY)
            }
            None => store.remove(USER_KEY),
        };
        if let Err(e) = user_result {
            warn!(error = %e, "session: could not persist user record");
        }
    }

    fn install_locked(
        &self,
        state: &mut SessionState,
        credential: Credential,
        identity: Option<UserRecord>,
        now: OffsetDateTime,
    ) {
        state.watchdog.cancel();
        state.generation += 1;
        let generation = state.generation;

        let delay = credential.watchdog_delay(now, self.shared.watchdog_lead);
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        state.watchdog.arm(delay, move || {
            if let Some(shared) = weak.upgrade() {
                SessionManager { shared }.expire(generation);
            }
        });
        debug!(generation, delay_secs = delay.as_secs(), "session: watchdog armed");

        state.credential = Some(credential);
        state.identity = identity;
        self.publish(state);
    }

    fn clear_locked(&self, state: &mut SessionState) {
        state.watchdog.cancel();
        state.generation += 1;
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.shared.store.remove(key) {
                warn!(error = %e, key, "session: could not clear persisted key");
            }
        }
        state.credential = None;
        state.identity = None;
        self.publish(state);
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "manager_test.rs"]
mod tests;
