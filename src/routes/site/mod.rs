mod handler;
mod model;

pub use handler::{restore_runaway, submit_report};
pub use model::{RestoreRunawayResponse, SubmitReportRequest, SubmitReportResponse};
