// 会话模块
// OAuth 凭据与身份缓存的持久化

pub mod model;
pub mod store;

#[cfg(test)]
pub mod mock;

pub use model::{CachedIdentity, Session, SessionExpiry, SessionTokens};
pub use store::{PgSessionStore, SessionStore};
