pub mod auth;
pub mod sessions;

pub use auth::{AuthService, IdentityVerifier, UserDirectory};
pub use sessions::SessionManager;
