//! Session module for the cookie-backed backend session.
//!
//! This module provides:
//! - `SessionState`, `User`: the client's belief about who is logged in
//! - `CredentialInput`: the login form draft
//! - `SessionStore`: the observable store and the verify/sign-in/sign-out operations
//!
//! The session itself lives in a browser-style cookie jar and is never
//! written to disk; each process rehydrates it with `verify_session`.

pub mod credentials;
pub mod state;
pub mod store;

pub use credentials::{CredentialDraft, CredentialInput};
pub use state::{SessionState, User};
pub use store::SessionStore;
