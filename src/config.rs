//! Configuration management.
//!
//! Settings load from environment variables, with a `.env` file picked up in
//! debug builds for local development.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;

/// Application settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub session: SessionSettings,
}

impl Settings {
    pub fn load() -> Result<Self> {
        if cfg!(debug_assertions) {
            dotenvy::dotenv().ok();
        }

        Ok(Settings {
            database: DatabaseSettings::from_env()?,
            jwt: JwtSettings::from_env()?,
            session: SessionSettings::from_env()?,
        })
    }
}

/// Database connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl DatabaseSettings {
    fn from_env() -> Result<Self> {
        Ok(Self {
            url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("Invalid DATABASE_MAX_CONNECTIONS")?,
            acquire_timeout_secs: env::var("DATABASE_ACQUIRE_TIMEOUT")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("Invalid DATABASE_ACQUIRE_TIMEOUT")?,
        })
    }
}

/// Access-token signing settings
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    pub secret: String,
    /// Access tokens are never revoked before expiry, so this must stay
    /// short (minutes).
    pub expiry_seconds: i64,
}

impl JwtSettings {
    fn from_env() -> Result<Self> {
        Ok(Self {
            secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            expiry_seconds: env::var("JWT_EXPIRY_SECONDS")
                .unwrap_or_else(|_| "900".to_string())
                .parse()
                .context("Invalid JWT_EXPIRY_SECONDS")?,
        })
    }
}

/// Refresh-token rotation settings
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    pub rotation_ttl_days: i64,
}

impl SessionSettings {
    fn from_env() -> Result<Self> {
        Ok(Self {
            rotation_ttl_days: env::var("SESSION_ROTATION_TTL_DAYS")
                .unwrap_or_else(|_| "14".to_string())
                .parse()
                .context("Invalid SESSION_ROTATION_TTL_DAYS")?,
        })
    }
}
