//! REST API client module for the MSTIDE DB backend.
//!
//! This module provides the `ApiClient` for the user endpoints that
//! create, inspect and revoke the cookie-backed session.

pub mod client;
pub mod error;

pub use client::{ApiClient, MeResponse};
pub use error::{ApiError, FailureKind};
