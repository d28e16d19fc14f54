use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    error::AppError,
    identity::Identity,
    report::ReportCategory,
    utils::success_to_api_response,
};

use super::model::{RestoreRunawayResponse, SubmitReportRequest, SubmitReportResponse};

/// 提交站点报告
#[axum::debug_handler]
pub async fn submit_report(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<SubmitReportRequest>,
) -> Result<impl IntoResponse, AppError> {
    if state.sites.find(&site_id).await?.is_none() {
        return Err(AppError::NotFound("site"));
    }

    let category = req
        .report_type
        .as_deref()
        .and_then(|t| t.parse::<ReportCategory>().ok())
        .ok_or_else(|| AppError::Validation("报告类型无效".to_string()))?;

    let report = state
        .reports
        .submit(
            &site_id,
            category,
            identity.id,
            &identity.username,
            req.reason.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok((
        StatusCode::OK,
        success_to_api_response(SubmitReportResponse::from(report)),
    ))
}

/// 站长撤销跑路标记
#[axum::debug_handler]
pub async fn restore_runaway(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    if state.sites.find(&site_id).await?.is_none() {
        return Err(AppError::NotFound("site"));
    }

    let maintainers = state.sites.maintainers(&site_id).await?;
    if !maintainers.iter().any(|m| m.matches(&identity.username)) {
        tracing::warn!(
            "{} tried to restore site {} without being a maintainer",
            identity.username,
            site_id
        );
        return Err(AppError::Forbidden);
    }

    state.sites.restore_runaway(&site_id, &identity).await?;

    Ok((
        StatusCode::OK,
        success_to_api_response(RestoreRunawayResponse { id: site_id }),
    ))
}
