use std::sync::Arc;

use chrono::Utc;

use crate::database::StoreError;
use crate::session::SessionStore;

use super::model::{Identity, ResolveOptions};
use super::provider::{IdentityError, IdentityProvider};

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("session lookup failed: {0}")]
    Persistence(#[from] StoreError),
    #[error(transparent)]
    Upstream(#[from] IdentityError),
}

/// 会话到身份的解析器
///
/// 会话记录充当读穿/写回缓存：命中且新鲜则直接返回，否则请求身份提供方，
/// 再异步写回会话。
pub struct IdentityResolver {
    sessions: Arc<dyn SessionStore>,
    provider: Arc<dyn IdentityProvider>,
}

impl IdentityResolver {
    pub fn new(sessions: Arc<dyn SessionStore>, provider: Arc<dyn IdentityProvider>) -> Self {
        Self { sessions, provider }
    }

    /// 解析会话对应的身份，会话不存在或已过期返回 `None`
    pub async fn resolve(
        &self,
        session_id: &str,
        options: ResolveOptions,
    ) -> Result<Option<Identity>, ResolveError> {
        let Some(session) = self.sessions.get(session_id).await? else {
            return Ok(None);
        };

        let now = Utc::now();
        if session.is_expired_at(now) {
            tracing::debug!("Session {} expired", session.id);
            return Ok(None);
        }

        if let Some(identity) = session
            .cached_identity
            .as_ref()
            .and_then(|cached| cached.usable_at(now, &options))
        {
            tracing::debug!("Identity cache hit for session {}", session.id);
            return Ok(Some(identity));
        }

        tracing::debug!("Identity cache miss for session {}", session.id);
        // 上游失败直接返回错误，不回退到旧缓存
        let identity = self.provider.fetch_user(session.access_token()).await?;
        let fetched_at = Utc::now();

        // 写回不阻塞本次响应，失败由存储层记录日志
        let sessions = Arc::clone(&self.sessions);
        let session_id = session.id.clone();
        let snapshot = identity.clone();
        tokio::spawn(async move {
            sessions
                .update_cached_identity(&session_id, &snapshot, fetched_at)
                .await;
        });

        Ok(Some(identity))
    }
}
