use axum::{
    body::{Body, to_bytes},
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::error;

const MAX_LOGGED_BODY: usize = 1024;

pub async fn log_errors(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let response = next.run(req).await;

    if !response.status().is_server_error() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_LOGGED_BODY).await {
        Ok(b) => b,
        Err(e) => {
            error!("{} {} failed, body unreadable: {}", method, path, e);
            return Response::from_parts(parts, Body::empty());
        }
    };

    error!(
        "{} {} failed - Status: {}, Body: {}",
        method,
        path,
        parts.status,
        String::from_utf8_lossy(&bytes)
    );

    // 重新构建响应体
    parts.headers.remove(axum::http::header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(bytes))
}
