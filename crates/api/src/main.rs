use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use emlak_api::config::{RateLimitBackend, ServerConfig};
use emlak_api::router::build_app_router;
use emlak_api::state::AppState;
use emlak_core::gateway::ImageHost;
use emlak_core::rate_limit::{MemoryRateLimiter, RateLimitStore};
use emlak_db::{PgRateLimiter, PgStore};
use emlak_media::{CloudinaryClient, CloudinaryConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "emlak_api=debug,emlak_core=debug,tower_http=debug".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = emlak_db::create_pool(&database_url, config.database_max_connections)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    emlak_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    emlak_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    let store = Arc::new(PgStore::new(pool.clone()));

    let limiter: Arc<dyn RateLimitStore> = match config.rate_limit_backend {
        RateLimitBackend::Postgres => Arc::new(PgRateLimiter::new(pool.clone())),
        RateLimitBackend::Memory => {
            tracing::warn!(
                "Using in-process rate limiter; limits are not shared between instances"
            );
            Arc::new(MemoryRateLimiter::new())
        }
    };

    let images: Option<Arc<dyn ImageHost>> = match CloudinaryConfig::from_env() {
        Some(cloudinary) => {
            let client =
                CloudinaryClient::new(cloudinary).expect("Failed to build image host client");
            tracing::info!("Image host configured");
            Some(Arc::new(client))
        }
        None => {
            tracing::warn!("CLOUDINARY_* not set; image uploads will fail");
            None
        }
    };

    let state = AppState {
        listings: store.clone(),
        submissions: store.clone(),
        accounts: store,
        limiter,
        images,
        config: Arc::new(config.clone()),
    };

    let app = build_app_router(state, &config);

    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    pool.close().await;
    tracing::info!("Server stopped, database pool closed");
}

/// Resolves on SIGINT (Ctrl-C) or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
