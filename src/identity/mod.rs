// 身份模块
// 以会话为缓存、按需请求外部身份提供方

pub mod model;
pub mod provider;
pub mod resolver;

#[cfg(test)]
pub mod mock;

pub use model::{DEFAULT_MAX_AGE_SECONDS, Identity, ResolveOptions};
pub use provider::{HttpIdentityProvider, IdentityError, IdentityProvider};
pub use resolver::{IdentityResolver, ResolveError};
