use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::model::Identity;

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("identity provider returned {status}: {detail}")]
    Upstream { status: u16, detail: String },
    #[error("identity provider timed out")]
    Timeout,
    #[error("identity provider request failed: {0}")]
    Transport(String),
    #[error("identity provider returned malformed user: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for IdentityError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            IdentityError::Timeout
        } else if err.is_decode() {
            IdentityError::Decode(err.to_string())
        } else {
            IdentityError::Transport(err.to_string())
        }
    }
}

/// 外部身份提供方
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn fetch_user(&self, access_token: &str) -> Result<Identity, IdentityError>;
}

/// 用户端点返回的原始结构，只关心其中几个字段
#[derive(Debug, Deserialize)]
struct LdUser {
    id: i64,
    username: String,
    trust_level: i32,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    avatar_template: Option<String>,
}

impl From<LdUser> for Identity {
    fn from(user: LdUser) -> Self {
        Identity {
            id: Some(user.id),
            username: user.username,
            trust_level: user.trust_level,
            name: user.name,
            avatar_template: user.avatar_template,
        }
    }
}

/// 基于 HTTP 的身份提供方客户端
pub struct HttpIdentityProvider {
    endpoint: String,
    http: reqwest::Client,
}

impl HttpIdentityProvider {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, IdentityError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            http,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn fetch_user(&self, access_token: &str) -> Result<Identity, IdentityError> {
        let response = self
            .http
            .get(&self.endpoint)
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!("Identity fetch failed: {} {}", status, detail);
            return Err(IdentityError::Upstream {
                status: status.as_u16(),
                detail,
            });
        }

        let user = response.json::<LdUser>().await?;
        Ok(user.into())
    }
}
