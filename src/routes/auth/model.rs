use serde::{Deserialize, Serialize};

use crate::identity::Identity;

#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub id: Option<i64>,
    pub username: String,
    pub trust_level: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_template: Option<String>,
}

impl From<Identity> for MeResponse {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            username: identity.username,
            trust_level: identity.trust_level,
            name: identity.name,
            avatar_template: identity.avatar_template,
        }
    }
}
