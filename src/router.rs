use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::{
    AppState,
    middleware::{auth_middleware, log_errors, strict_auth_middleware},
    routes,
};

/// 组装全部路由，限流与 CORS 在 main 中按环境追加
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/ping", get(routes::health::ping))
        .route("/auth/logout", post(routes::auth::logout));

    // 只读或容忍缓存身份的路由
    let protected_routes = Router::new()
        .route("/auth/me", get(routes::auth::me))
        .route("/sites/{id}/report", post(routes::site::submit_report))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // 需要确认数字 id 的站长操作
    let maintainer_routes = Router::new()
        .route(
            "/sites/{id}/restore-runaway",
            patch(routes::site::restore_runaway),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            strict_auth_middleware,
        ));

    let api = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(maintainer_routes);

    let base = state.config.api_base_uri.trim_end_matches('/');
    let router = if base.is_empty() {
        api
    } else {
        Router::new().nest(base, api)
    };

    router
        .layer(axum::middleware::from_fn(log_errors))
        .with_state(state)
}
