#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::StoreError;
use crate::identity::Identity;

use super::model::{CachedIdentity, Session, SessionExpiry, SessionTokens};
use super::store::SessionStore;

#[derive(Clone, Default)]
pub struct MockSessionStore {
    pub sessions: Arc<Mutex<HashMap<String, Session>>>,
    pub fail_writes: Arc<AtomicBool>,
    pub fail_identity_writes: Arc<AtomicBool>,
    pub identity_writes: Arc<AtomicUsize>,
    /// 写回缓存前的人为延迟（毫秒）
    pub identity_write_delay_ms: Arc<AtomicU64>,
}

impl MockSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: Session) {
        self.sessions
            .lock()
            .unwrap()
            .insert(session.id.clone(), session);
    }

    pub fn cached_identity(&self, session_id: &str) -> Option<CachedIdentity> {
        self.sessions
            .lock()
            .unwrap()
            .get(session_id)
            .and_then(|s| s.cached_identity.clone())
    }
}

#[async_trait]
impl SessionStore for MockSessionStore {
    async fn create(
        &self,
        tokens: SessionTokens,
        expiry: SessionExpiry,
    ) -> Result<Session, StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        let session = Session {
            id: Uuid::new_v4().to_string(),
            tokens,
            expiry,
            cached_identity: None,
        };
        self.insert(session.clone());
        Ok(session)
    }

    async fn get(&self, session_id: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.lock().unwrap().get(session_id).cloned())
    }

    async fn update_tokens(
        &self,
        session_id: &str,
        tokens: SessionTokens,
        expiry: SessionExpiry,
    ) -> Result<Session, StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions.get_mut(session_id).ok_or(StoreError::NotFound)?;
        session.tokens = tokens;
        session.expiry = expiry;
        Ok(session.clone())
    }

    async fn update_cached_identity(
        &self,
        session_id: &str,
        identity: &Identity,
        fetched_at: DateTime<Utc>,
    ) {
        let delay = self.identity_write_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
        }
        if self.fail_identity_writes.load(Ordering::SeqCst) {
            return;
        }
        if let Some(session) = self.sessions.lock().unwrap().get_mut(session_id) {
            session.cached_identity = Some(CachedIdentity::from_identity(identity, fetched_at));
        }
        self.identity_writes.fetch_add(1, Ordering::SeqCst);
    }

    async fn delete(&self, session_id: &str) -> Result<(), StoreError> {
        self.sessions.lock().unwrap().remove(session_id);
        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired_at(now));
        Ok((before - sessions.len()) as u64)
    }
}

/// 构造测试用会话
pub fn session_with(id: &str, cached_identity: Option<CachedIdentity>) -> Session {
    let now = Utc::now();
    Session {
        id: id.to_string(),
        tokens: SessionTokens {
            access_token: format!("access-{id}"),
            refresh_token: format!("refresh-{id}"),
            token_type: "bearer".into(),
        },
        expiry: SessionExpiry {
            access_expires_at: now + chrono::Duration::hours(1),
            session_expires_at: now + chrono::Duration::days(30),
        },
        cached_identity,
    }
}
