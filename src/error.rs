use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::database::StoreError;
use crate::identity::{IdentityError, ResolveError};
use crate::report::ReportError;
use crate::utils::{error_codes, error_to_api_response};

/// 报告重复时返回给用户的提示
pub const REPORT_PENDING_MESSAGE: &str = "该类型报告已在处理中，暂不接受新的报告";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("unauthorized")]
    Unauthorized,
    #[error(transparent)]
    UpstreamIdentity(IdentityError),
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("forbidden")]
    Forbidden,
    #[error("pending report exists")]
    DuplicateReport,
    #[error(transparent)]
    Persistence(StoreError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Persistence(err)
    }
}

impl From<ResolveError> for AppError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Persistence(e) => AppError::Persistence(e),
            ResolveError::Upstream(e) => AppError::UpstreamIdentity(e),
        }
    }
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::Validation(msg) => AppError::Validation(msg),
            ReportError::Duplicate { .. } => AppError::DuplicateReport,
            ReportError::Persistence(e) => AppError::Persistence(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                error_codes::AUTH_FAILED,
                "未授权访问".to_string(),
            ),
            // 上游拒绝说明令牌可能已失效，按未登录处理
            AppError::UpstreamIdentity(e) => {
                tracing::warn!("Identity provider rejected session: {}", e);
                (
                    StatusCode::UNAUTHORIZED,
                    error_codes::AUTH_FAILED,
                    "登录状态已失效，请重新登录".to_string(),
                )
            }
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                error_codes::VALIDATION_ERROR,
                msg.clone(),
            ),
            AppError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                error_codes::NOT_FOUND,
                format!("{} not found", what),
            ),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                error_codes::PERMISSION_DENIED,
                "没有权限执行该操作".to_string(),
            ),
            AppError::DuplicateReport => (
                StatusCode::CONFLICT,
                error_codes::REPORT_PENDING_EXISTS,
                REPORT_PENDING_MESSAGE.to_string(),
            ),
            // 数据库错误细节只写日志，不返回给客户端
            AppError::Persistence(e) => {
                tracing::error!("Persistence failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_codes::INTERNAL_ERROR,
                    "内部服务器错误".to_string(),
                )
            }
        };

        (status, error_to_api_response::<()>(code, message)).into_response()
    }
}
