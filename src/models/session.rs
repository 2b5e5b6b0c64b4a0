/// Session record model: one link in a refresh-token rotation chain
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One link in a rotation chain.
///
/// Records are immutable once created except for `revoked`, which only ever
/// transitions false -> true. Records are never deleted by this crate;
/// expired and revoked rows stay behind for audit and reuse detection.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Opaque bearer secret presented by the caller. Unique across all
    /// records, never reassigned. Never logged.
    pub token: String,
    /// Stable across every rotation descending from one login.
    pub family_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
}

impl SessionRecord {
    /// Whether the rotation TTL has elapsed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether this record is the current link of its chain.
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && !self.is_expired(now)
    }
}

/// Insert payload for a new chain link; the store assigns the record id.
#[derive(Debug, Clone)]
pub struct NewSessionRecord {
    pub user_id: Uuid,
    pub token: String,
    pub family_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
