use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use planets::{
    AppState,
    cache::{CacheStore, PlanetCache, RedisCache},
    config::Config,
    database::PgPlanetStore,
    middleware::RateLimiter,
    router::create_router,
    service::PlanetService,
};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
#[cfg(debug_assertions)]
use tower_http::cors::CorsLayer;
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

    // 设置数据库连接池
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'planets';").await?;
                Ok(())
            })
        })
        .connect(&config.database_url())
        .await
        .expect("Failed to connect to Postgres");

    let store = PgPlanetStore::new(pool);
    store
        .ensure_schema()
        .await
        .expect("Failed to set up planets table");

    // 设置 Redis 缓存
    let redis: Arc<dyn CacheStore> = Arc::new(
        RedisCache::connect(&config.redis_url())
            .await
            .expect("Failed to connect to Redis"),
    );

    // 设置应用状态
    let state = AppState {
        planets: PlanetService::new(
            Arc::new(store),
            PlanetCache::new(redis.clone(), config.cache_ttl()),
        ),
    };

    // 设置限流器
    let rate_limiter = Arc::new(RateLimiter::from_config(redis, &config));

    let router = create_router(state, rate_limiter);

    // 开发模式允许所有来源跨域
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(CorsLayer::permissive())
    };

    // 启动服务器
    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Failed to start server");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
