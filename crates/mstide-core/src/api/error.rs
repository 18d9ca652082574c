use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - session may have expired")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Unexpected status: {0}")]
    UnexpectedStatus(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Coarse failure category used for structured logging.
///
/// The session layer treats every category the same way; this only
/// exists so logs can tell a dead backend from a rejected request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No usable HTTP response arrived.
    Transport,
    /// The backend answered with a non-success status.
    Status,
    /// The response body was not what the endpoint promises.
    Parse,
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::UnexpectedStatus(format!("Status {}: {}", status, truncated)),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            // reqwest reports body decoding problems through the same error type
            ApiError::NetworkError(e) if e.is_decode() => FailureKind::Parse,
            ApiError::NetworkError(_) => FailureKind::Transport,
            ApiError::InvalidResponse(_) => FailureKind::Parse,
            ApiError::AccessDenied(_)
            | ApiError::Unauthorized
            | ApiError::NotFound(_)
            | ApiError::RateLimited
            | ApiError::ServerError(_)
            | ApiError::UnexpectedStatus(_) => FailureKind::Status,
        }
    }
}
