use serde::{Deserialize, Serialize};

/// 默认身份缓存时长（秒）
pub const DEFAULT_MAX_AGE_SECONDS: u64 = 60 * 60;

/// 身份提供方返回的用户身份
///
/// `id` 为 `None` 表示身份来自缓存且数字 id 未确认，绝不用 0 代替。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Option<i64>,
    pub username: String,
    pub trust_level: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_template: Option<String>,
}

/// 身份解析的新鲜度要求
///
/// 只读场景容忍一小时的陈旧数据；修改状态的操作（例如站长身份校验）
/// 要求数字 id 已确认。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    pub max_age_seconds: u64,
    pub require_id: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_age_seconds: DEFAULT_MAX_AGE_SECONDS,
            require_id: false,
        }
    }
}

impl ResolveOptions {
    pub fn strict() -> Self {
        Self {
            require_id: true,
            ..Self::default()
        }
    }

    pub fn with_max_age(max_age_seconds: u64) -> Self {
        Self {
            max_age_seconds,
            ..Self::default()
        }
    }

    /// 以毫秒表示的缓存时长，超出 `i64` 时饱和
    pub fn max_age_millis(&self) -> i64 {
        i64::try_from(self.max_age_seconds)
            .ok()
            .and_then(|secs| secs.checked_mul(1000))
            .unwrap_or(i64::MAX)
    }
}
