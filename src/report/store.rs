use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::database::StoreError;

use super::model::{NewReport, Report, ReportCategory, ReportStatus};

/// 每个 `(site_id, report_type)` 至多一条 pending 报告的部分唯一索引
pub const PENDING_REPORT_INDEX: &str = "uniq_site_reports_pending";

/// 报告存储
///
/// `insert` 必须由 `(site_id, report_type) WHERE status = 'pending'` 的
/// 部分唯一索引保护，冲突时返回 `StoreError::UniqueViolation`。
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn find_pending(
        &self,
        site_id: &str,
        category: ReportCategory,
    ) -> Result<Option<Report>, StoreError>;

    async fn insert(&self, report: &NewReport) -> Result<Report, StoreError>;
}

#[derive(Clone)]
pub struct PgReportStore {
    pool: PgPool,
}

impl PgReportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ReportRecord {
    id: Uuid,
    site_id: String,
    reporter_id: Option<i64>,
    reporter_username: String,
    report_type: String,
    reason: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReportRecord> for Report {
    type Error = StoreError;

    fn try_from(row: ReportRecord) -> Result<Self, Self::Error> {
        let category = row
            .report_type
            .parse::<ReportCategory>()
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let status = ReportStatus::parse(&row.status)
            .ok_or_else(|| StoreError::Corrupt(format!("unknown report status: {}", row.status)))?;

        Ok(Report {
            id: row.id,
            site_id: row.site_id,
            reporter_id: row.reporter_id,
            reporter_username: row.reporter_username,
            category,
            reason: row.reason,
            status,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn find_pending(
        &self,
        site_id: &str,
        category: ReportCategory,
    ) -> Result<Option<Report>, StoreError> {
        let row: Option<ReportRecord> = sqlx::query_as(
            r#"
            SELECT id, site_id, reporter_id, reporter_username, report_type,
                   reason, status, created_at
            FROM site_reports
            WHERE site_id = $1 AND report_type = $2 AND status = 'pending'
            LIMIT 1
            "#,
        )
        .bind(site_id)
        .bind(category.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Report::try_from).transpose()
    }

    async fn insert(&self, report: &NewReport) -> Result<Report, StoreError> {
        let row: ReportRecord = sqlx::query_as(
            r#"
            INSERT INTO site_reports (
                id, site_id, reporter_id, reporter_username, report_type, reason, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, 'pending', NOW())
            RETURNING id, site_id, reporter_id, reporter_username, report_type,
                      reason, status, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&report.site_id)
        .bind(report.reporter_id)
        .bind(&report.reporter_username)
        .bind(report.category.as_str())
        .bind(&report.reason)
        .fetch_one(&self.pool)
        .await?;

        Report::try_from(row)
    }
}
