use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: String,
    pub name: String,
    pub is_active: bool,
    pub is_runaway: bool,
}

/// 站长记录，username 与 profile_url 可能只填其一
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Maintainer {
    pub username: Option<String>,
    pub profile_url: Option<String>,
}

impl Maintainer {
    /// 忽略大小写比较用户名或主页地址中的用户名
    pub fn matches(&self, actor_username: &str) -> bool {
        let actor = actor_username.to_lowercase();
        if actor.is_empty() {
            return false;
        }
        [&self.username, &self.profile_url]
            .into_iter()
            .flatten()
            .any(|value| parse_maintainer_id(value).to_lowercase() == actor)
    }
}

/// 从 `linux.do/u/<name>/summary` 形式的主页地址中取出用户名，
/// 不是主页地址则原样返回
pub fn parse_maintainer_id(value: &str) -> &str {
    const MARKER: &str = "linux.do/u/";
    const SUFFIX: &str = "/summary";

    let lowered = value.to_ascii_lowercase();
    let Some(start) = lowered.find(MARKER).map(|i| i + MARKER.len()) else {
        return value;
    };
    let rest = &value[start..];
    match rest.find('/') {
        Some(end)
            if end > 0 && rest[end..].to_ascii_lowercase().starts_with(SUFFIX) =>
        {
            &rest[..end]
        }
        _ => value,
    }
}
