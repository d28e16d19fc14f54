// 站点模块
// 报告与站长操作需要的站点查询

pub mod model;
pub mod store;

#[cfg(test)]
pub mod mock;

pub use model::{Maintainer, Site, parse_maintainer_id};
pub use store::{PgSiteStore, SiteStore};
