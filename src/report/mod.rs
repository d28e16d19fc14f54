// 报告模块
// 站点举报及其准入控制

pub mod guard;
pub mod model;
pub mod store;

#[cfg(test)]
pub mod mock;

pub use guard::{AdmissionGuard, DuplicateKind, ReportError};
pub use model::{MAX_REASON_CHARS, NewReport, Report, ReportCategory, ReportStatus};
pub use store::{PENDING_REPORT_INDEX, PgReportStore, ReportStore};
