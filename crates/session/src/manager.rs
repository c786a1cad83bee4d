//! Session manager
//!
//! Holds the current [`Session`] in a `tokio::sync::watch` channel. Every
//! mutation takes the writer lock, issues its storage call, commits the new
//! session through `send_if_modified` and then navigates, all before the
//! lock is released. Commits and navigations therefore happen in the same
//! order, subscribers are woken only after commit, and readers always see a
//! whole `Session`, never a token without its user.
//!
//! Stores must not call back into the manager. Navigators run under the
//! writer lock and may only read the session through `state`, `snapshot`,
//! `current_user` and the other accessors that do not take the lock.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::claims::SessionClaims;
use crate::clock::{Clock, SystemClock};
use crate::config::SessionConfig;
use crate::error::{SessionError, StorageError};
use crate::jwt::decode_claims;
use crate::navigation::{Navigator, Route};
use crate::state::{SessionEvent, SessionState, SessionStateMachine};
use crate::storage::TokenStore;
use crate::types::{Session, UserIdentity};

pub struct SessionManager {
    config: SessionConfig,
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    clock: Arc<dyn Clock>,
    state: watch::Sender<Session>,
    /// Writer lock; holds the most recent storage failure
    writer: Mutex<Option<SessionError>>,
}

impl SessionManager {
    /// Create an anonymous manager. Call [`SessionManager::initialize`] to
    /// restore a persisted session.
    pub fn new(
        config: SessionConfig,
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self::with_clock(config, store, navigator, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: SessionConfig,
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (state, _) = watch::channel(Session::anonymous());
        Self {
            config,
            store,
            navigator,
            clock,
            state,
            writer: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Restore the session from storage.
    ///
    /// A missing, undecodable or expired token leaves the session anonymous
    /// and removes whatever was persisted. Never fails; an unreadable store
    /// is reported through [`SessionManager::storage_error`].
    pub fn initialize(&self) {
        let mut last_error = self.lock_writer();

        self.state.send_if_modified(|session| {
            let stored = record(
                &mut last_error,
                "read",
                self.store.get(&self.config.storage_key),
            )
            .flatten();

            let Some(token) = stored else {
                return commit(session, Session::anonymous(), SessionEvent::Logout);
            };

            match self.decode_live(&token) {
                Ok(claims) => {
                    tracing::info!("Restored persisted session");
                    commit(
                        session,
                        Session::authenticated(token, &claims),
                        SessionEvent::Login,
                    )
                }
                Err(e) => {
                    tracing::info!(reason = %e, "Discarding persisted session token");
                    self.clear_persisted(&mut last_error);
                    let event = match e {
                        SessionError::TokenExpired => SessionEvent::Expired,
                        _ => SessionEvent::DecodeFailed,
                    };
                    commit(session, Session::anonymous(), event)
                }
            }
        });
    }

    /// Accept a freshly issued token and navigate to the authenticated route.
    ///
    /// The token is decoded and stored exactly as given. One that does not
    /// decode (or has already expired) is rejected with
    /// [`SessionError::InvalidCredential`]; the session is left untouched and
    /// no navigation happens.
    pub fn login(&self, token: &str) -> Result<(), SessionError> {
        if token.is_empty() {
            return Err(SessionError::InvalidCredential);
        }

        let claims = self.decode_live(token).map_err(|e| {
            tracing::warn!(reason = %e, "Rejected login credential");
            SessionError::InvalidCredential
        })?;
        let next = Session::authenticated(token.to_string(), &claims);

        let mut last_error = self.lock_writer();
        self.state.send_if_modified(|session| {
            record(
                &mut last_error,
                "write",
                self.store.set(&self.config.storage_key, token),
            );
            commit(session, next, SessionEvent::Login)
        });
        self.navigate(Route::Authenticated);

        Ok(())
    }

    /// Clear the session and navigate to the unauthenticated route.
    /// Calling it while signed out yields the same state.
    pub fn logout(&self) {
        let mut last_error = self.lock_writer();
        self.end_session(&mut last_error, SessionEvent::Logout);
        self.navigate(Route::Unauthenticated);
    }

    /// React to the API rejecting the current token with 401
    pub fn handle_unauthorized(&self) {
        let mut last_error = self.lock_writer();
        if self.end_session(&mut last_error, SessionEvent::Unauthorized) {
            tracing::info!("Session rejected by API");
        }
        self.navigate(Route::Unauthenticated);
    }

    /// Drop the session if its token has expired. Returns whether it did.
    pub fn expire_if_stale(&self) -> bool {
        if !self.config.enforce_expiry {
            return false;
        }

        let now = self.clock.now();
        let leeway = self.config.expiry_leeway_secs;
        let mut expired = false;

        let mut last_error = self.lock_writer();
        self.state.send_if_modified(|session| {
            if !session.is_expired_at(now, leeway) {
                return false;
            }
            expired = true;
            self.clear_persisted(&mut last_error);
            commit(session, Session::anonymous(), SessionEvent::Expired)
        });

        expired
    }

    pub fn current_user(&self) -> Option<UserIdentity> {
        self.state.borrow().user().cloned()
    }

    pub fn current_token(&self) -> Option<String> {
        self.state.borrow().token().map(str::to_string)
    }

    pub fn authorization_header(&self) -> Option<String> {
        self.state.borrow().authorization_header()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().state()
    }

    /// Consistent copy of the current session
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Receive every committed session change
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Failure of the most recent storage call, if it failed.
    ///
    /// The session keeps working in memory while storage is unavailable;
    /// this lets the host warn that it will not survive a reload.
    pub fn storage_error(&self) -> Option<SessionError> {
        self.lock_writer().clone()
    }

    fn lock_writer(&self) -> MutexGuard<'_, Option<SessionError>> {
        // Nothing guarded can be left half-written by a panicking writer
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clear token, user and storage. Returns whether a session was ended.
    fn end_session(&self, last_error: &mut Option<SessionError>, event: SessionEvent) -> bool {
        let mut ended = false;

        self.state.send_if_modified(|session| {
            if !SessionStateMachine::can_transition(session.state(), event) {
                return false;
            }
            ended = session.is_authenticated();
            self.clear_persisted(last_error);
            commit(session, Session::anonymous(), event)
        });

        ended
    }

    /// Decode `token` and apply the expiry policy
    fn decode_live(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let claims = decode_claims(token)?;

        if self.config.enforce_expiry {
            let candidate = Session::authenticated(token.to_string(), &claims);
            if candidate.is_expired_at(self.clock.now(), self.config.expiry_leeway_secs) {
                return Err(SessionError::TokenExpired);
            }
        }

        Ok(claims)
    }

    fn clear_persisted(&self, last_error: &mut Option<SessionError>) {
        record(
            last_error,
            "delete",
            self.store.delete(&self.config.storage_key),
        );
    }

    fn navigate(&self, route: Route) {
        self.navigator.navigate(route.path(&self.config));
    }
}

impl std::fmt::Debug for SessionManager {
    #[mutants::skip] // Diagnostic output only
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("config", &self.config)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Remember the outcome of a storage call. Failures are logged and
/// swallowed so the session keeps working in memory.
fn record<T>(
    last_error: &mut Option<SessionError>,
    operation: &'static str,
    result: Result<T, StorageError>,
) -> Option<T> {
    match result {
        Ok(value) => {
            *last_error = None;
            Some(value)
        }
        Err(e) => {
            let e = SessionError::from(e);
            tracing::warn!(error = %e, operation, "Session storage call failed");
            *last_error = Some(e);
            None
        }
    }
}

/// Replace `slot` with `next`, logging the transition. Returns whether the
/// session changed, which decides if subscribers are woken.
fn commit(slot: &mut Session, next: Session, event: SessionEvent) -> bool {
    if *slot == next {
        return false;
    }

    let from = slot.state();
    let to = next.state();
    debug_assert_eq!(SessionStateMachine::transition(from, event), Ok(to));
    tracing::info!(%from, %to, %event, "Session transition");

    *slot = next;
    true
}
