//! The process-wide session store.
//!
//! `SessionStore` owns the only copy of `SessionState` and is the only
//! thing allowed to change it. Every operation is total: failures are
//! logged and collapse to a fully determined state, never to an error
//! the caller has to handle. Anything ambiguous counts as logged out.
//!
//! Overlapping verifications are ordered by a generation number taken
//! when each one is issued. A response is committed only if nothing
//! issued later has been committed already, so a slow stale answer can
//! never overwrite a newer one.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::api::{ApiClient, MeResponse};

use super::{CredentialInput, SessionState, User};

#[derive(Debug, Default)]
struct Generations {
    issued: u64,
    committed: u64,
    verified_at: Option<DateTime<Utc>>,
}

pub struct SessionStore {
    api: ApiClient,
    credentials: CredentialInput,
    state_tx: watch::Sender<SessionState>,
    generations: Mutex<Generations>,
}

impl SessionStore {
    pub fn new(api: ApiClient) -> Self {
        Self::with_credentials(api, CredentialInput::new())
    }

    pub fn with_credentials(api: ApiClient, credentials: CredentialInput) -> Self {
        let (state_tx, _) = watch::channel(SessionState::LoggedOut);
        Self {
            api,
            credentials,
            state_tx,
            generations: Mutex::new(Generations::default()),
        }
    }

    // =========================================================================
    // Observation
    // =========================================================================

    pub fn state(&self) -> SessionState {
        self.state_tx.borrow().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.state_tx.borrow().is_logged_in()
    }

    pub fn user(&self) -> Option<User> {
        self.state_tx.borrow().user().cloned()
    }

    /// Receive every change to the session state.
    /// Commits that leave the state as it was do not wake subscribers.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// When the last verification result was committed.
    pub fn last_verified_at(&self) -> Option<DateTime<Utc>> {
        self.generations().verified_at
    }

    /// The login form draft consumed by `sign_in`.
    pub fn credentials(&self) -> &CredentialInput {
        &self.credentials
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Ask the backend who we are and record the answer.
    ///
    /// Transport failures, error statuses and malformed bodies all leave
    /// the store logged out. Re-read the state afterwards for the result.
    pub async fn verify_session(&self) {
        let generation = self.issue();

        let user = match self.api.fetch_me().await.and_then(MeResponse::into_user) {
            Ok(user) => user,
            Err(e) => {
                warn!(kind = ?e.kind(), error = %e, "Session check failed, treating as logged out");
                None
            }
        };

        self.commit(generation, SessionState::from(user), true);
    }

    /// Log in with the current credential draft.
    ///
    /// A rejected login leaves the state untouched and is only logged.
    /// An accepted one is followed by a fresh `verify_session`, so the
    /// stored user always comes from `/api/user/me`.
    pub async fn sign_in(&self) {
        let draft = self.credentials.snapshot();

        if let Err(e) = self.api.login(&draft.login, &draft.password).await {
            error!(kind = ?e.kind(), error = %e, login = %draft.login, "Invalid login or password");
            return;
        }

        debug!(login = %draft.login, "Login accepted, verifying session");
        self.verify_session().await;
    }

    /// Log out and forget the session.
    ///
    /// The local state is cleared whatever the backend says, including
    /// when the request fails or the future is dropped before it finishes.
    pub async fn sign_out(&self) {
        let _clear = ClearOnDrop(self);

        if let Err(e) = self.api.logout().await {
            debug!(kind = ?e.kind(), error = %e, "Logout request failed, clearing local session anyway");
        }
    }

    // =========================================================================
    // Bookkeeping
    // =========================================================================

    fn generations(&self) -> MutexGuard<'_, Generations> {
        // Only counters live here and every update completes under the lock
        self.generations.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn issue(&self) -> u64 {
        let mut generations = self.generations();
        generations.issued += 1;
        generations.issued
    }

    /// Publish `next` unless something issued after `generation` already was.
    fn commit(&self, generation: u64, next: SessionState, verified: bool) -> bool {
        let mut generations = self.generations();
        if generation <= generations.committed {
            debug!(
                generation,
                committed = generations.committed,
                "Discarding stale session result"
            );
            return false;
        }
        generations.committed = generation;
        if verified {
            generations.verified_at = Some(Utc::now());
        }

        let changed = self.state_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        if changed {
            match self.state_tx.borrow().user() {
                Some(user) => info!(user_id = user.id, login = %user.login, "Session established"),
                None => info!("Session cleared"),
            }
        }
        true
    }
}

/// Clears the session when dropped, so `sign_out` cleans up on every exit path.
struct ClearOnDrop<'a>(&'a SessionStore);

impl Drop for ClearOnDrop<'_> {
    fn drop(&mut self) {
        let generation = self.0.issue();
        self.0.commit(generation, SessionState::LoggedOut, false);
    }
}
