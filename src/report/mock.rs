#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::database::StoreError;

use super::model::{NewReport, Report, ReportCategory, ReportStatus};
use super::store::{PENDING_REPORT_INDEX, ReportStore};

/// 内存报告存储，插入时与部分唯一索引同样原子地检查 pending 冲突
#[derive(Clone, Default)]
pub struct MockReportStore {
    pub reports: Arc<Mutex<Vec<Report>>>,
    pub blind_lookups: Arc<AtomicBool>,
    pub fail_inserts: Arc<AtomicBool>,
    /// 插入时报告为违反该唯一约束
    pub violated_constraint: Arc<Mutex<Option<String>>>,
}

impl MockReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().unwrap().len()
    }

    pub fn set_status(&self, id: Uuid, status: ReportStatus) {
        let mut reports = self.reports.lock().unwrap();
        if let Some(report) = reports.iter_mut().find(|r| r.id == id) {
            report.status = status;
        }
    }
}

#[async_trait]
impl ReportStore for MockReportStore {
    async fn find_pending(
        &self,
        site_id: &str,
        category: ReportCategory,
    ) -> Result<Option<Report>, StoreError> {
        let found = if self.blind_lookups.load(Ordering::SeqCst) {
            None
        } else {
            self.reports
                .lock()
                .unwrap()
                .iter()
                .find(|r| {
                    r.site_id == site_id
                        && r.category == category
                        && r.status == ReportStatus::Pending
                })
                .cloned()
        };
        // 让并发提交有机会在检查与插入之间交错
        tokio::task::yield_now().await;
        Ok(found)
    }

    async fn insert(&self, report: &NewReport) -> Result<Report, StoreError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        if let Some(constraint) = self.violated_constraint.lock().unwrap().clone() {
            return Err(StoreError::UniqueViolation(constraint));
        }
        let mut reports = self.reports.lock().unwrap();
        let conflict = reports.iter().any(|r| {
            r.site_id == report.site_id
                && r.category == report.category
                && r.status == ReportStatus::Pending
        });
        if conflict {
            return Err(StoreError::UniqueViolation(PENDING_REPORT_INDEX.into()));
        }

        let created = Report {
            id: Uuid::new_v4(),
            site_id: report.site_id.clone(),
            reporter_id: report.reporter_id,
            reporter_username: report.reporter_username.clone(),
            category: report.category,
            reason: report.reason.clone(),
            status: ReportStatus::Pending,
            created_at: Utc::now(),
        };
        reports.push(created.clone());
        Ok(created)
    }
}
