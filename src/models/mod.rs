pub mod session;
pub mod user;

// Re-export commonly used types
pub use session::{NewSessionRecord, SessionRecord};
pub use user::{IdentityClaim, User, UserProfile};

use serde::Serialize;

/// Credential pair returned by login and refresh.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    /// Opaque rotating bearer secret. Callers must store it out of reach of
    /// scripts and never log it.
    pub refresh_token: String,
    /// Access-token lifetime in seconds.
    pub expires_in: i64,
}
