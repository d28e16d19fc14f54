use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::report::{Report, ReportCategory, ReportStatus};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportRequest {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub report_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitReportResponse {
    pub report_id: Uuid,
    pub site_id: String,
    pub report_type: ReportCategory,
    pub status: ReportStatus,
}

impl From<Report> for SubmitReportResponse {
    fn from(report: Report) -> Self {
        Self {
            report_id: report.id,
            site_id: report.site_id,
            report_type: report.category,
            status: report.status,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RestoreRunawayResponse {
    pub id: String,
}
