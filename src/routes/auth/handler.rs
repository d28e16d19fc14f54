use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::{CookieJar, cookie::Cookie};

use crate::{
    AppState,
    common::EmptyResponse,
    error::AppError,
    identity::Identity,
    utils::success_to_api_response,
};

use super::model::MeResponse;

/// 当前登录用户
#[axum::debug_handler]
pub async fn me(Extension(identity): Extension<Identity>) -> impl IntoResponse {
    (
        StatusCode::OK,
        success_to_api_response(MeResponse::from(identity)),
    )
}

/// 退出登录：删除会话并清除 cookie，重复调用无副作用
#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let cookie_name = state.config.session_cookie_name.clone();

    if let Some(session_id) = jar.get(&cookie_name).map(|c| c.value().to_string()) {
        state.sessions.delete(&session_id).await?;
        tracing::info!("Session {} logged out", session_id);
    }

    let jar = jar.remove(Cookie::build((cookie_name, "")).path("/").build());
    Ok((StatusCode::OK, jar, success_to_api_response(EmptyResponse {})))
}
