//! Session record persistence.
//!
//! The store holds rotation-chain records and nothing else: pure data access,
//! no lifecycle policy. Policy lives in [`crate::services::SessionManager`].

pub mod memory;
pub mod postgres;

pub use memory::InMemorySessionStore;
pub use postgres::PgSessionStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{NewSessionRecord, SessionRecord};

/// Contract consumed by the rotation engine.
///
/// Records are append-only except for the `revoked` flag, which only ever
/// moves false -> true. Implementations must keep `token` values unique and
/// make `consume_and_replace` / `revoke_family` atomic with respect to
/// concurrent calls on the same family.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a new chain link. Fails with `Conflict` if `token` collides,
    /// which sufficient entropy makes a retryable internal error.
    async fn insert(&self, record: NewSessionRecord) -> Result<SessionRecord>;

    async fn find_by_token(&self, token: &str) -> Result<Option<SessionRecord>>;

    /// Set `revoked = true` on one record. Idempotent.
    async fn revoke(&self, record_id: Uuid) -> Result<()>;

    /// Atomically consume `record_id` (compare-and-swap on `revoked`) and
    /// insert its successor in the same single unit.
    ///
    /// Returns `None` when the record was already revoked, i.e. this caller
    /// lost a rotation race. Callers must treat a lost swap as token reuse,
    /// never retry it blindly. The atomicity guarantees that a concurrent
    /// family cascade can only observe the record either untouched or with
    /// its successor already present.
    async fn consume_and_replace(
        &self,
        record_id: Uuid,
        successor: NewSessionRecord,
    ) -> Result<Option<SessionRecord>>;

    /// Atomically revoke every non-revoked record in the family; returns how
    /// many were changed. This is the cascade used by reuse handling and
    /// logout.
    async fn revoke_family(&self, family_id: Uuid) -> Result<u64>;
}
