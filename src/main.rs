use diesel::r2d2::{ConnectionManager, Pool};
use diesel::PgConnection;
use dotenvy::dotenv;
use http::HeaderValue;
use std::{env, net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use microcompta::app::create_router;
use microcompta::clients::{EmailClient, ShopifyClient};
use microcompta::config::app_config::AppConfig;
use microcompta::logging::setup_logging;
use microcompta::models::AppState;

#[tokio::main]
async fn main() -> Result<(), eyre::Error> {
    setup_logging();
    info!("Starting microcompta");

    dotenv().ok();
    let db_url = env::var("DATABASE_URL").map_err(|_| eyre::eyre!("DATABASE_URL must be set"))?;
    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "8080".to_string());

    let config = AppConfig::from_env()?;

    let manager = ConnectionManager::<PgConnection>::new(db_url);
    let pool = Pool::builder().max_size(10).build(manager).map_err(|e| {
        error!("Failed to create database pool: {}", e);
        eyre::eyre!("Failed to create database pool: {}", e)
    })?;

    let email = EmailClient::new(config.resend_api_key.clone(), config.mail_from.clone());
    let state = Arc::new(AppState {
        db: pool,
        config,
        email,
        shopify: ShopifyClient::new(),
    });

    let cors_origins = env::var("CORS_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000".to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .collect::<Vec<String>>();
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_origin(
            cors_origins
                .iter()
                .map(|s| s.parse::<HeaderValue>())
                .collect::<Result<Vec<_>, _>>()?,
        );

    let app = create_router(state).layer(cors);

    let addr = format!("{}:{}", host, port).parse::<SocketAddr>()?;
    let listener = TcpListener::bind(&addr).await?;
    info!("Server running on http://{}", addr);
    info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
