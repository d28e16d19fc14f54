use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::{
    AppState,
    error::AppError,
    identity::{Identity, ResolveOptions},
};

/// 只读场景的认证：容忍配置时长内的缓存身份
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let options = ResolveOptions::with_max_age(state.config.user_cache_secs);
    let identity = authenticate(&state, &jar, options).await?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// 修改状态的场景：要求缓存中的数字 id 已确认
pub async fn strict_auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let options = ResolveOptions {
        max_age_seconds: state.config.user_cache_secs,
        ..ResolveOptions::strict()
    };
    let identity = authenticate(&state, &jar, options).await?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

pub async fn authenticate(
    state: &AppState,
    jar: &CookieJar,
    options: ResolveOptions,
) -> Result<Identity, AppError> {
    // 只有开发环境才会配置 dev_user
    if let Some(dev_user) = &state.config.dev_user {
        return Ok(dev_user.clone());
    }

    let session_id = jar
        .get(&state.config.session_cookie_name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(AppError::Unauthorized)?;

    state
        .identities
        .resolve(&session_id, options)
        .await?
        .ok_or(AppError::Unauthorized)
}
