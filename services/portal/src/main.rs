use sea_orm::Database;
use tracing::info;

use zerogate_core::config::Config;
use zerogate_core::tracing::init_tracing;
use zerogate_portal::config::PortalConfig;
use zerogate_portal::router::build_router;
use zerogate_portal::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = PortalConfig::from_env().expect("invalid portal configuration");
    config.validate().expect("invalid portal configuration");

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let redis_cfg = deadpool_redis::Config::from_url(&config.redis_url);
    let redis = redis_cfg
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .expect("failed to create Redis pool");

    let addr = format!("0.0.0.0:{}", config.portal_port);
    let router = build_router(AppState::new(db, redis, config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("portal listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
