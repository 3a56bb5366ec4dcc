use std::fmt;

use crate::refresh::SecretError;
use crate::session::StoreError;
use crate::token::TokenError;

/// Why a refresh or logout attempt was refused.
///
/// The reason is for logs only. Callers facing a client must collapse every
/// variant into the same generic response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnauthorizedReason {
    InvalidAccessToken,
    SessionNotFound,
    Expired,
    SecretMismatch,
    UserAgentMismatch,
}

impl UnauthorizedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidAccessToken => "invalid_access_token",
            Self::SessionNotFound => "session_not_found",
            Self::Expired => "expired",
            Self::SecretMismatch => "secret_mismatch",
            Self::UserAgentMismatch => "user_agent_mismatch",
        }
    }
}

impl fmt::Display for UnauthorizedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure while minting a token pair.
#[derive(Debug, thiserror::Error)]
pub enum IssueError {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Secret(#[from] SecretError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(UnauthorizedReason),

    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),

    #[error("Token issuance failed: {0}")]
    Issuance(#[source] IssueError),

    /// The old session was consumed but its replacement could not be minted.
    /// The user has no valid session left and must re-authenticate.
    #[error("Token rotation failed: {0}")]
    Rotation(#[source] IssueError),
}

impl CoreError {
    /// The refusal reason, if this is an [`CoreError::Unauthorized`].
    pub fn unauthorized_reason(&self) -> Option<UnauthorizedReason> {
        match self {
            Self::Unauthorized(reason) => Some(*reason),
            _ => None,
        }
    }
}
