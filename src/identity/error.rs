use thiserror::Error;

/// Failures of the session store and session service. The HTTP layer decides how
/// much of this distinction reaches the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("an active session already exists for this user")]
    AlreadyExists,

    #[error("session not found")]
    NotFound,

    #[error("session expired")]
    Expired,

    #[error("invalid token")]
    InvalidToken,

    #[error("token signing failed: {0}")]
    Signing(String),

    #[error("session storage failure: {0}")]
    Storage(String),
}
