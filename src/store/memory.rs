/// In-memory reference implementation of the session store.
///
/// Every operation runs under one mutex, so the atomicity the contract asks
/// for holds trivially. Intended for tests and single-process embedding;
/// production deployments use [`super::PgSessionStore`].
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{AuthError, Result};
use crate::models::{NewSessionRecord, SessionRecord};
use crate::store::SessionStore;

#[derive(Default)]
struct Inner {
    records: HashMap<Uuid, SessionRecord>,
    by_token: HashMap<String, Uuid>,
}

#[derive(Default)]
pub struct InMemorySessionStore {
    inner: Mutex<Inner>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_locked(inner: &mut Inner, record: NewSessionRecord) -> Result<SessionRecord> {
        if inner.by_token.contains_key(&record.token) {
            return Err(AuthError::Conflict);
        }

        let stored = SessionRecord {
            id: Uuid::new_v4(),
            user_id: record.user_id,
            token: record.token,
            family_id: record.family_id,
            issued_at: record.issued_at,
            expires_at: record.expires_at,
            revoked: false,
        };
        inner.by_token.insert(stored.token.clone(), stored.id);
        inner.records.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Lock poisoning only happens if a holder panicked; the map is still
        // consistent because every mutation is a single statement.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, record: NewSessionRecord) -> Result<SessionRecord> {
        let mut inner = self.lock();
        Self::insert_locked(&mut inner, record)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<SessionRecord>> {
        let inner = self.lock();
        let id = match inner.by_token.get(token) {
            Some(id) => *id,
            None => return Ok(None),
        };
        Ok(inner.records.get(&id).cloned())
    }

    async fn revoke(&self, record_id: Uuid) -> Result<()> {
        let mut inner = self.lock();
        if let Some(record) = inner.records.get_mut(&record_id) {
            record.revoked = true;
        }
        Ok(())
    }

    async fn consume_and_replace(
        &self,
        record_id: Uuid,
        successor: NewSessionRecord,
    ) -> Result<Option<SessionRecord>> {
        let mut inner = self.lock();

        // Reject the collision before mutating anything, mirroring the
        // transactional rollback of the Postgres store.
        if inner.by_token.contains_key(&successor.token) {
            return Err(AuthError::Conflict);
        }

        match inner.records.get_mut(&record_id) {
            Some(record) if !record.revoked => record.revoked = true,
            // Already revoked or gone: lost the swap.
            _ => return Ok(None),
        }

        Self::insert_locked(&mut inner, successor).map(Some)
    }

    async fn revoke_family(&self, family_id: Uuid) -> Result<u64> {
        let mut inner = self.lock();
        let mut changed = 0;
        for record in inner.records.values_mut() {
            if record.family_id == family_id && !record.revoked {
                record.revoked = true;
                changed += 1;
            }
        }
        Ok(changed)
    }
}
