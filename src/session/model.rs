use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{Identity, ResolveOptions};

/// 上游 OAuth 凭据，只在会话存储内部流转
#[derive(Clone, PartialEq, Eq)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokens")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionExpiry {
    pub access_expires_at: DateTime<Utc>,
    pub session_expires_at: DateTime<Utc>,
}

/// 会话中缓存的身份快照
///
/// 要么整体缺失，要么 username / trust_level / fetched_at 全部存在；
/// `user_id` 可以单独缺失，表示“身份已知但数字 id 未确认”。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedIdentity {
    pub user_id: Option<i64>,
    pub username: String,
    pub trust_level: i32,
    pub fetched_at: DateTime<Utc>,
}

impl CachedIdentity {
    pub fn from_identity(identity: &Identity, fetched_at: DateTime<Utc>) -> Self {
        Self {
            user_id: identity.id,
            username: identity.username.clone(),
            trust_level: identity.trust_level,
            fetched_at,
        }
    }

    /// 在 `now` 时刻按给定新鲜度要求判断缓存是否可用，可用则返回身份
    pub fn usable_at(&self, now: DateTime<Utc>, options: &ResolveOptions) -> Option<Identity> {
        if options.require_id && self.user_id.is_none() {
            return None;
        }
        let age = now.signed_duration_since(self.fetched_at).num_milliseconds();
        if age > options.max_age_millis() {
            return None;
        }

        Some(Identity {
            id: self.user_id,
            username: self.username.clone(),
            trust_level: self.trust_level,
            name: None,
            avatar_template: None,
        })
    }
}

#[derive(Clone)]
pub struct Session {
    pub id: String,
    pub(crate) tokens: SessionTokens,
    pub expiry: SessionExpiry,
    pub cached_identity: Option<CachedIdentity>,
}

impl Session {
    pub(crate) fn access_token(&self) -> &str {
        &self.tokens.access_token
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry.session_expires_at < now
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("tokens", &self.tokens)
            .field("expiry", &self.expiry)
            .field("cached_identity", &self.cached_identity)
            .finish()
    }
}
