use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use crate::{
    config::Config,
    utils::{error_codes, error_to_api_response},
};

/// 按客户端 IP 的固定窗口限流
#[derive(Clone)]
pub struct RateLimiter {
    redis: Arc<redis::Client>,
    config: Arc<Config>,
}

impl RateLimiter {
    pub fn new(redis: redis::Client, config: Config) -> Self {
        Self {
            redis: Arc::new(redis),
            config: Arc::new(config),
        }
    }

    /// 递增当前窗口的计数，返回窗口内的请求数
    async fn hit(&self, ip: &str) -> redis::RedisResult<i64> {
        let key = window_key(ip);
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let (count,): (i64,) = window_pipeline(&key, self.config.rate_limit_window())
            .query_async(&mut conn)
            .await?;
        Ok(count)
    }

    pub async fn check_rate_limit(self: Arc<Self>, req: Request<Body>, next: Next) -> Response {
        let remote = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ci| ci.0.ip().to_string());
        let ip = client_ip(req.headers(), remote.as_deref());

        let count = match self.hit(&ip).await {
            Ok(count) => count,
            Err(e) => {
                // 限流不影响正确性，Redis 故障时放行
                tracing::warn!("Rate limiter unavailable, letting {} through: {}", ip, e);
                return next.run(req).await;
            }
        };

        if count > self.config.rate_limit_requests as i64 {
            tracing::debug!("Rate limit exceeded for {}", ip);
            return (
                StatusCode::TOO_MANY_REQUESTS,
                error_to_api_response::<()>(
                    error_codes::RATE_LIMIT,
                    format!(
                        "请求过于频繁，请在{}秒后重试",
                        self.config.rate_limit_window().as_secs()
                    ),
                ),
            )
                .into_response();
        }

        next.run(req).await
    }
}

fn window_key(ip: &str) -> String {
    format!("rate_limit:{}", ip)
}

/// 计数与过期时间在同一个事务里提交，键不会停留在没有 TTL 的状态
///
/// `EXPIRE ... NX` 只在键还没有过期时间时生效，窗口不会因后续请求顺延
/// （需要 Redis 7.0 及以上）。
fn window_pipeline(key: &str, window: Duration) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic()
        .incr(key, 1)
        .cmd("EXPIRE")
        .arg(key)
        .arg(window.as_secs().max(1))
        .arg("NX")
        .ignore();
    pipe
}

/// 优先使用反向代理头，其次是连接地址
pub fn client_ip(headers: &HeaderMap, remote: Option<&str>) -> String {
    headers
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .filter(|ip| !ip.trim().is_empty())
        .or_else(|| {
            headers
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.split(',').find(|ip| !ip.trim().is_empty()))
        })
        .or(remote)
        .unwrap_or("unknown")
        .trim()
        .to_string()
}

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    limiter.check_rate_limit(req, next).await
}
