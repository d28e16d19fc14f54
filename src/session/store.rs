use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::database::StoreError;
use crate::identity::Identity;

use super::model::{CachedIdentity, Session, SessionExpiry, SessionTokens};

/// 会话存储
///
/// 身份缓存就是会话记录本身，不在进程内另做缓存。
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// 新建会话，不带缓存身份；写入失败必须返回错误
    async fn create(
        &self,
        tokens: SessionTokens,
        expiry: SessionExpiry,
    ) -> Result<Session, StoreError>;

    /// 按主键查询，不存在返回 `None`
    async fn get(&self, session_id: &str) -> Result<Option<Session>, StoreError>;

    /// 整体替换凭据字段（刷新令牌时使用），失败必须返回错误
    async fn update_tokens(
        &self,
        session_id: &str,
        tokens: SessionTokens,
        expiry: SessionExpiry,
    ) -> Result<Session, StoreError>;

    /// 尽力写回身份缓存，失败只记录日志
    async fn update_cached_identity(
        &self,
        session_id: &str,
        identity: &Identity,
        fetched_at: DateTime<Utc>,
    );

    /// 幂等删除
    async fn delete(&self, session_id: &str) -> Result<(), StoreError>;

    /// 清理 `session_expires_at` 早于 `now` 的会话，返回删除条数
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}

#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct SessionRecord {
    id: String,
    access_token: String,
    refresh_token: String,
    token_type: String,
    access_expires_at: DateTime<Utc>,
    session_expires_at: DateTime<Utc>,
    user_id: Option<i64>,
    user_username: Option<String>,
    user_trust_level: Option<i32>,
    user_fetched_at: Option<DateTime<Utc>>,
}

impl From<SessionRecord> for Session {
    fn from(row: SessionRecord) -> Self {
        // 三个必填字段缺任何一个都视为没有缓存
        let cached_identity = match (row.user_username, row.user_trust_level, row.user_fetched_at)
        {
            (Some(username), Some(trust_level), Some(fetched_at)) if !username.is_empty() => {
                Some(CachedIdentity {
                    user_id: row.user_id,
                    username,
                    trust_level,
                    fetched_at,
                })
            }
            _ => None,
        };

        Session {
            id: row.id,
            tokens: SessionTokens {
                access_token: row.access_token,
                refresh_token: row.refresh_token,
                token_type: row.token_type,
            },
            expiry: SessionExpiry {
                access_expires_at: row.access_expires_at,
                session_expires_at: row.session_expires_at,
            },
            cached_identity,
        }
    }
}

const SESSION_COLUMNS: &str = "id, access_token, refresh_token, token_type, access_expires_at, \
     session_expires_at, user_id, user_username, user_trust_level, user_fetched_at";

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(
        &self,
        tokens: SessionTokens,
        expiry: SessionExpiry,
    ) -> Result<Session, StoreError> {
        let session_id = Uuid::new_v4().to_string();

        let row: SessionRecord = sqlx::query_as(&format!(
            r#"
            INSERT INTO auth_sessions (
                id, access_token, refresh_token, token_type,
                access_expires_at, session_expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {SESSION_COLUMNS}
            "#
        ))
        .bind(&session_id)
        .bind(&tokens.access_token)
        .bind(&tokens.refresh_token)
        .bind(&tokens.token_type)
        .bind(expiry.access_expires_at)
        .bind(expiry.session_expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create auth session: {}", e);
            StoreError::from(e)
        })?;

        tracing::info!("Created auth session: {}", row.id);
        Ok(row.into())
    }

    async fn get(&self, session_id: &str) -> Result<Option<Session>, StoreError> {
        let row: Option<SessionRecord> = sqlx::query_as(&format!(
            "SELECT {SESSION_COLUMNS} FROM auth_sessions WHERE id = $1"
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn update_tokens(
        &self,
        session_id: &str,
        tokens: SessionTokens,
        expiry: SessionExpiry,
    ) -> Result<Session, StoreError> {
        let row: SessionRecord = sqlx::query_as(&format!(
            r#"
            UPDATE auth_sessions
            SET access_token = $1, refresh_token = $2, token_type = $3,
                access_expires_at = $4, session_expires_at = $5, updated_at = NOW()
            WHERE id = $6
            RETURNING {SESSION_COLUMNS}
            "#
        ))
        .bind(&tokens.access_token)
        .bind(&tokens.refresh_token)
        .bind(&tokens.token_type)
        .bind(expiry.access_expires_at)
        .bind(expiry.session_expires_at)
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update tokens of session {}: {}", session_id, e);
            StoreError::from(e)
        })?;

        Ok(row.into())
    }

    async fn update_cached_identity(
        &self,
        session_id: &str,
        identity: &Identity,
        fetched_at: DateTime<Utc>,
    ) {
        let result = sqlx::query(
            r#"
            UPDATE auth_sessions
            SET user_id = $1, user_username = $2, user_trust_level = $3,
                user_fetched_at = $4, updated_at = NOW()
            WHERE id = $5
            "#,
        )
        .bind(identity.id)
        .bind(&identity.username)
        .bind(identity.trust_level)
        .bind(fetched_at)
        .bind(session_id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => tracing::debug!("Cached identity written back to session {}", session_id),
            Err(e) => tracing::warn!(
                "Failed to write back identity for session {}: {}",
                session_id,
                e
            ),
        }
    }

    async fn delete(&self, session_id: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE session_expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
