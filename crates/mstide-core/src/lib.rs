//! Core library for the MSTIDE DB compound and fragment database client.
//!
//! - `api`: HTTP client for the backend's user endpoints
//! - `session`: the observable session store and login form draft
//! - `router`: page routes and the navigation guard that protects them
//! - `config`: persisted client settings

pub mod api;
pub mod config;
pub mod router;
pub mod session;

pub use api::{ApiClient, ApiError, FailureKind};
pub use config::Config;
pub use router::{Navigation, NavigationDecision, NavigationGuard, RouteName, RouteTable, Router};
pub use session::{CredentialDraft, CredentialInput, SessionState, SessionStore, User};
