//! Session token lifecycle for the archive backend.
//!
//! Authenticates users via a third-party identity assertion and issues a
//! short-lived access token plus a long-lived rotating refresh token. The
//! refresh token rotates on every use; presenting an already-consumed token
//! is treated as evidence of theft and revokes the whole rotation chain.
//!
//! ## Modules
//!
//! - `config`: environment-driven settings
//! - `error`: error taxonomy and the unauthorized outward mapping
//! - `models`: session records, users, identity claims
//! - `security`: access-token issuance and verification (HS256 JWT)
//! - `store`: session record persistence (Postgres + in-memory reference)
//! - `services`: rotation engine and authentication facade
//! - `telemetry`: tracing setup

pub mod config;
pub mod error;
pub mod models;
pub mod security;
pub mod services;
pub mod store;
pub mod telemetry;

// Re-export commonly used types
pub use error::{AuthError, Result};
pub use models::{IdentityClaim, NewSessionRecord, SessionRecord, TokenPair, User, UserProfile};
pub use security::AccessTokenIssuer;
pub use services::{AuthService, IdentityVerifier, SessionManager, UserDirectory};
pub use store::{InMemorySessionStore, PgSessionStore, SessionStore};
