use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Login form contents.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialDraft {
    pub login: String,
    pub password: String,
}

impl fmt::Debug for CredentialDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialDraft")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Shared staging area bound to the login form.
///
/// The form writes into it, `SessionStore::sign_in` reads a snapshot.
/// Nothing clears it except an explicit `clear`.
/// Clone is cheap - clones edit the same draft.
#[derive(Clone, Default)]
pub struct CredentialInput {
    draft: Arc<Mutex<CredentialDraft>>,
}

impl CredentialInput {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CredentialDraft> {
        // The draft is two plain strings, a panicked writer cannot leave it torn
        self.draft.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_login(&self, login: impl Into<String>) {
        self.lock().login = login.into();
    }

    pub fn set_password(&self, password: impl Into<String>) {
        self.lock().password = password.into();
    }

    pub fn login(&self) -> String {
        self.lock().login.clone()
    }

    pub fn snapshot(&self) -> CredentialDraft {
        self.lock().clone()
    }

    pub fn clear(&self) {
        *self.lock() = CredentialDraft::default();
    }
}

impl fmt::Debug for CredentialInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CredentialInput").field(&*self.lock()).finish()
    }
}
