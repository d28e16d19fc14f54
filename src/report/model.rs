use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 报告原因最大字符数
pub const MAX_REASON_CHARS: usize = 500;

/// 报告类型，固定枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportCategory {
    Runaway,
    FakeCharity,
}

impl ReportCategory {
    pub const ALL: [ReportCategory; 2] = [ReportCategory::Runaway, ReportCategory::FakeCharity];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportCategory::Runaway => "runaway",
            ReportCategory::FakeCharity => "fake_charity",
        }
    }
}

impl fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown report category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for ReportCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// 报告状态：新建为 pending，由管理流程转为终态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Resolved,
    Dismissed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Resolved => "resolved",
            ReportStatus::Dismissed => "dismissed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ReportStatus::Pending),
            "resolved" => Some(ReportStatus::Resolved),
            "dismissed" => Some(ReportStatus::Dismissed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: Uuid,
    pub site_id: String,
    pub reporter_id: Option<i64>,
    pub reporter_username: String,
    pub category: ReportCategory,
    pub reason: String,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
}

/// 待插入的报告，状态固定为 pending
#[derive(Debug, Clone)]
pub struct NewReport {
    pub site_id: String,
    pub category: ReportCategory,
    pub reporter_id: Option<i64>,
    pub reporter_username: String,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_wire_names() {
        assert_eq!("runaway".parse::<ReportCategory>(), Ok(ReportCategory::Runaway));
        assert_eq!(
            "fake_charity".parse::<ReportCategory>(),
            Ok(ReportCategory::FakeCharity)
        );
        assert_eq!(
            serde_json::to_string(&ReportCategory::FakeCharity).unwrap(),
            "\"fake_charity\""
        );
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!("spam".parse::<ReportCategory>().is_err());
        assert!("Runaway".parse::<ReportCategory>().is_err());
    }

    #[test]
    fn status_parse_matches_as_str() {
        for status in [
            ReportStatus::Pending,
            ReportStatus::Resolved,
            ReportStatus::Dismissed,
        ] {
            assert_eq!(ReportStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ReportStatus::parse("open"), None);
    }
}
