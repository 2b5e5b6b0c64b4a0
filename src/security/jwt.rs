//! Short-lived access credential issuance and verification.
//!
//! Access tokens are self-contained HS256 JWTs asserting `(sub, iat, exp)`.
//! They are verified by signature and expiry only and are never revoked
//! before their natural expiry; the TTL must therefore stay short (minutes).
//!
//! The signing key is loaded once at startup and injected here explicitly,
//! never read from a hidden global.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuthError, Result};

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT claims carried by an access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token id, for audit correlation
    pub jti: String,
}

/// Stateless issuer/verifier for access tokens.
#[derive(Clone)]
pub struct AccessTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl AccessTokenIssuer {
    pub fn from_settings(settings: &crate::config::JwtSettings) -> Self {
        Self::new(&settings.secret, settings.expiry_seconds)
    }

    pub fn new(secret: &str, ttl_seconds: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    /// Access-token lifetime in seconds, as advertised to callers.
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Mint a signed access token for `user_id`.
    pub fn issue(&self, user_id: Uuid) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to sign access token: {e}")))
    }

    /// Verify signature and expiry and return the subject.
    ///
    /// Fails closed: parse, signature, expiry, and malformed-subject failures
    /// all collapse to the same opaque `InvalidCredential`.
    pub fn verify(&self, token: &str) -> Result<Uuid> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| AuthError::InvalidCredential)?;

        Uuid::parse_str(&data.claims.sub).map_err(|_| AuthError::InvalidCredential)
    }
}
