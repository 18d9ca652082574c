use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub login: String,
}

/// The client's cached belief about the backend session.
///
/// Being logged in and having a user are the same fact, so there is no
/// way to represent one without the other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    LoggedOut,
    LoggedIn(User),
}

impl SessionState {
    pub fn is_logged_in(&self) -> bool {
        matches!(self, SessionState::LoggedIn(_))
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::LoggedIn(user) => Some(user),
            SessionState::LoggedOut => None,
        }
    }
}

impl From<Option<User>> for SessionState {
    fn from(user: Option<User>) -> Self {
        match user {
            Some(user) => SessionState::LoggedIn(user),
            None => SessionState::LoggedOut,
        }
    }
}
