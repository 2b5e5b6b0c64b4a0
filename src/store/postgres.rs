/// Postgres-backed session store.
///
/// The rotate step runs as a single transaction so a concurrent rotation on
/// the same token can only observe the record before the swap or after the
/// successor exists, and `revoke_family` is one UPDATE statement, never a
/// read-then-write loop.
///
/// Both operations take a transaction-scoped advisory lock on the family.
/// Under READ COMMITTED, a cascade's UPDATE uses its statement snapshot: a
/// successor row committed by a rotation the cascade was blocked on would be
/// invisible to it and survive un-revoked. The per-family lock serializes
/// the swap and the cascade so the cascade's snapshot always includes the
/// successor.
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::config::DatabaseSettings;
use crate::error::Result;
use crate::models::{NewSessionRecord, SessionRecord};
use crate::store::SessionStore;

#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool from settings.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(std::time::Duration::from_secs(settings.acquire_timeout_secs))
            .connect(&settings.url)
            .await?;

        Ok(Self::new(pool))
    }
}

/// Serialize rotation swaps and cascades on one family. Released when the
/// surrounding transaction commits or rolls back.
async fn lock_family(conn: &mut PgConnection, family_id: Uuid) -> Result<()> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1::text))")
        .bind(family_id)
        .execute(conn)
        .await?;
    Ok(())
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn insert(&self, record: NewSessionRecord) -> Result<SessionRecord> {
        let stored = sqlx::query_as::<_, SessionRecord>(
            r#"
            INSERT INTO session_records (id, user_id, token, family_id, issued_at, expires_at, revoked)
            VALUES (gen_random_uuid(), $1, $2, $3, $4, $5, false)
            RETURNING id, user_id, token, family_id, issued_at, expires_at, revoked
            "#,
        )
        .bind(record.user_id)
        .bind(&record.token)
        .bind(record.family_id)
        .bind(record.issued_at)
        .bind(record.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<SessionRecord>> {
        let record = sqlx::query_as::<_, SessionRecord>(
            r#"
            SELECT id, user_id, token, family_id, issued_at, expires_at, revoked
            FROM session_records
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn revoke(&self, record_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE session_records SET revoked = true WHERE id = $1
            "#,
        )
        .bind(record_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn consume_and_replace(
        &self,
        record_id: Uuid,
        successor: NewSessionRecord,
    ) -> Result<Option<SessionRecord>> {
        let mut tx = self.pool.begin().await?;

        lock_family(tx.as_mut(), successor.family_id).await?;

        let consumed = sqlx::query(
            r#"
            UPDATE session_records SET revoked = true WHERE id = $1 AND revoked = false
            "#,
        )
        .bind(record_id)
        .execute(tx.as_mut())
        .await?;

        if consumed.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let stored = sqlx::query_as::<_, SessionRecord>(
            r#"
            INSERT INTO session_records (id, user_id, token, family_id, issued_at, expires_at, revoked)
            VALUES (gen_random_uuid(), $1, $2, $3, $4, $5, false)
            RETURNING id, user_id, token, family_id, issued_at, expires_at, revoked
            "#,
        )
        .bind(successor.user_id)
        .bind(&successor.token)
        .bind(successor.family_id)
        .bind(successor.issued_at)
        .bind(successor.expires_at)
        .fetch_one(tx.as_mut())
        .await?;

        tx.commit().await?;

        Ok(Some(stored))
    }

    async fn revoke_family(&self, family_id: Uuid) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        lock_family(tx.as_mut(), family_id).await?;

        let result = sqlx::query(
            r#"
            UPDATE session_records SET revoked = true WHERE family_id = $1 AND revoked = false
            "#,
        )
        .bind(family_id)
        .execute(tx.as_mut())
        .await?;

        tx.commit().await?;

        Ok(result.rows_affected())
    }
}
