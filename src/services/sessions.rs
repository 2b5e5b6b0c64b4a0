//! Refresh-token rotation engine.
//!
//! A family (rotation chain) is in exactly one of three conceptual states:
//! ACTIVE (one current record), EXPIRED (current record past its TTL), or
//! REVOKED (every record permanently revoked). There is no way out of
//! REVOKED: once reuse handling or logout cascades over a family, no record
//! in it can become current again.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use uuid::Uuid;

use crate::error::{AuthError, Result};
use crate::models::{NewSessionRecord, SessionRecord};
use crate::store::SessionStore;

/// State machine over rotation chains. All policy lives here; the store only
/// supplies atomic primitives.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    rotation_ttl: Duration,
}

impl SessionManager {
    pub fn from_settings(
        store: Arc<dyn SessionStore>,
        settings: &crate::config::SessionSettings,
    ) -> Self {
        Self::new(store, Duration::days(settings.rotation_ttl_days))
    }

    pub fn new(store: Arc<dyn SessionStore>, rotation_ttl: Duration) -> Self {
        Self {
            store,
            rotation_ttl,
        }
    }

    /// Open a brand-new rotation chain for `user_id`.
    ///
    /// Independent of any existing session for the same user, so one user may
    /// hold multiple concurrent device sessions.
    pub async fn start_session(&self, user_id: Uuid) -> Result<SessionRecord> {
        let family_id = Uuid::new_v4();
        let record = self
            .store
            .insert(self.new_link(user_id, family_id, Utc::now()))
            .await?;

        tracing::info!(user_id = %user_id, family_id = %family_id, "Session started");
        Ok(record)
    }

    /// Validate and rotate a presented refresh token.
    ///
    /// Despite reading, this is a command: presenting an already-consumed
    /// token cascade-revokes the whole family as a side effect, including the
    /// currently valid descendant, before `ReuseDetected` is reported. A
    /// detected compromise cuts off the chain even at the cost of the
    /// legitimate holder's still-valid token.
    ///
    /// Revoked wins over expired: a revoked record may indicate active
    /// compromise while expiry is benign, so the revoked check runs first.
    pub async fn rotate(&self, presented_token: &str) -> Result<SessionRecord> {
        if presented_token.trim().is_empty() {
            return Err(AuthError::InvalidToken);
        }

        let record = self
            .store
            .find_by_token(presented_token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if record.revoked {
            return Err(self.handle_reuse(&record).await?);
        }

        let now = Utc::now();
        if record.is_expired(now) {
            // Defensive: an expired record should not have still been
            // presented. Only this record is revoked; expiry does not poison
            // the family.
            self.store.revoke(record.id).await?;
            tracing::info!(family_id = %record.family_id, "Expired refresh token presented");
            return Err(AuthError::TokenExpired);
        }

        let successor = self.new_link(record.user_id, record.family_id, now);
        match self.store.consume_and_replace(record.id, successor).await? {
            Some(next) => {
                tracing::info!(
                    user_id = %next.user_id,
                    family_id = %next.family_id,
                    "Refresh token rotated"
                );
                Ok(next)
            }
            // Lost the swap: a concurrent rotation consumed this record
            // between our read and the compare-and-swap. Contention is
            // indistinguishable from replay, so treat it as reuse.
            None => Err(self.handle_reuse(&record).await?),
        }
    }

    /// Revoke the whole family the presented token belongs to.
    ///
    /// Same cascade as reuse handling, but a normal logout rather than a
    /// security event. Unknown or blank tokens succeed silently so logout is
    /// idempotent.
    pub async fn end_session(&self, presented_token: &str) -> Result<()> {
        if presented_token.trim().is_empty() {
            return Ok(());
        }

        if let Some(record) = self.store.find_by_token(presented_token).await? {
            let revoked = self.store.revoke_family(record.family_id).await?;
            tracing::info!(
                user_id = %record.user_id,
                family_id = %record.family_id,
                revoked,
                "Session ended"
            );
        }
        Ok(())
    }

    async fn handle_reuse(&self, record: &SessionRecord) -> Result<AuthError> {
        let revoked = self.store.revoke_family(record.family_id).await?;
        tracing::warn!(
            user_id = %record.user_id,
            family_id = %record.family_id,
            revoked,
            "Refresh token reuse detected, family revoked"
        );
        Ok(AuthError::ReuseDetected)
    }

    fn new_link(&self, user_id: Uuid, family_id: Uuid, now: DateTime<Utc>) -> NewSessionRecord {
        NewSessionRecord {
            user_id,
            token: generate_token(),
            family_id,
            issued_at: now,
            expires_at: now + self.rotation_ttl,
        }
    }
}

/// 256 bits of entropy, hex-encoded. Uniqueness is enforced by the store's
/// token constraint as a backstop.
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
