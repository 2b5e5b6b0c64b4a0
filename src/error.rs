use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Access token failed signature, expiry, or parse checks. Deliberately
    /// opaque: callers must not learn which check failed.
    #[error("Invalid access credential")]
    InvalidCredential,

    /// Refresh token not found in the store.
    #[error("Invalid refresh token")]
    InvalidToken,

    /// Refresh token past its rotation TTL.
    #[error("Refresh token expired")]
    TokenExpired,

    /// An already-consumed refresh token was presented again. The whole
    /// family has been cascade-revoked by the time this error is returned.
    #[error("Refresh token reuse detected")]
    ReuseDetected,

    /// The external identity assertion was rejected.
    #[error("Identity verification failed: {0}")]
    IdentityVerificationFailed(String),

    /// Token value collided on insert. Should not happen with 256-bit tokens;
    /// retryable by the caller, never retried silently by the engine.
    #[error("Session token conflict")]
    Conflict,

    #[error("User not found")]
    UserNotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Whether this error maps to the uniform "unauthorized" outward signal.
    ///
    /// Every credential-path failure collapses to the same signal so callers
    /// cannot probe which check rejected them; the variants stay distinct for
    /// audit logging.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredential
                | AuthError::InvalidToken
                | AuthError::TokenExpired
                | AuthError::ReuseDetected
                | AuthError::IdentityVerificationFailed(_)
                | AuthError::UserNotFound
        )
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return AuthError::Conflict;
            }
        }
        tracing::error!("Database error: {}", err);
        AuthError::Database(err.to_string())
    }
}
