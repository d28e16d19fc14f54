use std::sync::Arc;

use crate::database::StoreError;

use super::model::{MAX_REASON_CHARS, NewReport, Report, ReportCategory};
use super::store::{PENDING_REPORT_INDEX, ReportStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateKind {
    PendingExists,
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("{0}")]
    Validation(String),
    #[error("a pending {category} report already exists for site {site_id}")]
    Duplicate {
        kind: DuplicateKind,
        site_id: String,
        category: ReportCategory,
    },
    #[error("report persistence failed: {0}")]
    Persistence(StoreError),
}

/// 报告准入控制：同一 `(site_id, category)` 最多一条 pending 报告
///
/// 先查询给出友好的拒绝，再由部分唯一索引兜底并发竞争；两条路径对调用方
/// 表现完全一致。
pub struct AdmissionGuard {
    reports: Arc<dyn ReportStore>,
}

impl AdmissionGuard {
    pub fn new(reports: Arc<dyn ReportStore>) -> Self {
        Self { reports }
    }

    pub async fn submit(
        &self,
        site_id: &str,
        category: ReportCategory,
        reporter_id: Option<i64>,
        reporter_username: &str,
        reason: &str,
    ) -> Result<Report, ReportError> {
        let reason = validate_reason(reason)?;
        let duplicate = || ReportError::Duplicate {
            kind: DuplicateKind::PendingExists,
            site_id: site_id.to_string(),
            category,
        };

        let existing = self
            .reports
            .find_pending(site_id, category)
            .await
            .map_err(ReportError::Persistence)?;
        if let Some(existing) = existing {
            tracing::debug!(
                "Rejecting {} report for site {}: pending report {} exists",
                category,
                site_id,
                existing.id
            );
            return Err(duplicate());
        }

        let new_report = NewReport {
            site_id: site_id.to_string(),
            category,
            reporter_id,
            reporter_username: reporter_username.to_string(),
            reason,
        };

        match self.reports.insert(&new_report).await {
            Ok(report) => {
                tracing::info!(
                    "Created {} report {} for site {} by {}",
                    category,
                    report.id,
                    site_id,
                    reporter_username
                );
                Ok(report)
            }
            // 并发提交越过了前置检查，由唯一索引拦下
            Err(StoreError::UniqueViolation(constraint)) if constraint == PENDING_REPORT_INDEX => {
                tracing::debug!(
                    "Concurrent {} report for site {} rejected by {}",
                    category,
                    site_id,
                    constraint
                );
                Err(duplicate())
            }
            Err(e) => {
                tracing::error!("Failed to insert report for site {}: {}", site_id, e);
                Err(ReportError::Persistence(e))
            }
        }
    }
}

/// 去除首尾空白后非空且不超过上限
fn validate_reason(reason: &str) -> Result<String, ReportError> {
    let reason = reason.trim();
    if reason.is_empty() || reason.chars().count() > MAX_REASON_CHARS {
        return Err(ReportError::Validation(format!(
            "报告原因不能为空且不超过{}字",
            MAX_REASON_CHARS
        )));
    }
    Ok(reason.to_string())
}
