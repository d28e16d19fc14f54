use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use sitewatch::{
    AppState,
    config::Config,
    database,
    identity::{HttpIdentityProvider, IdentityResolver},
    middleware::{RateLimiter, rate_limit},
    report::{AdmissionGuard, PgReportStore},
    router::create_router,
    session::{PgSessionStore, SessionStore},
    site::PgSiteStore,
};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");
    if config.dev_user.is_some() {
        tracing::warn!("Running with a fixed development identity, sessions are bypassed");
    }

    // 设置数据库连接池
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'sitewatch';").await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    database::migrate(&pool)
        .await
        .expect("Failed to run database migrations");

    // 组装存储与服务
    let sessions: Arc<dyn SessionStore> = Arc::new(PgSessionStore::new(pool.clone()));
    let provider = HttpIdentityProvider::new(config.user_endpoint.clone(), config.identity_timeout())
        .expect("Failed to build identity provider client");
    let state = AppState {
        config: config.clone(),
        sessions: Arc::clone(&sessions),
        identities: Arc::new(IdentityResolver::new(
            Arc::clone(&sessions),
            Arc::new(provider),
        )),
        reports: Arc::new(AdmissionGuard::new(Arc::new(PgReportStore::new(
            pool.clone(),
        )))),
        sites: Arc::new(PgSiteStore::new(pool.clone())),
    };

    // 定期清理过期会话
    let sweeper = Arc::clone(&sessions);
    let sweep_interval = config.session_sweep_interval();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        loop {
            ticker.tick().await;
            match sweeper.delete_expired(chrono::Utc::now()).await {
                Ok(0) => {}
                Ok(removed) => tracing::info!("Swept {} expired sessions", removed),
                Err(e) => tracing::warn!("Session sweep failed: {}", e),
            }
        }
    });

    // 设置限流器
    let redis_client =
        redis::Client::open(config.redis_url.clone()).expect("Failed to create Redis client");
    let rate_limiter = Arc::new(RateLimiter::new(redis_client, config.clone()));

    let router = create_router(state.clone())
        .layer(axum::middleware::from_fn_with_state(rate_limiter, rate_limit));

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    // 启动服务器
    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
