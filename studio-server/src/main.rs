//! studio-server: photography studio website back-end
//!
//! Long-running service that:
//! - Serves the public site API (catalogue, availability, bookings, vouchers)
//! - Runs the photo challenge flow and Stripe checkouts
//! - Provides the back-office API (JWT authenticated)
//! - Sweeps expired challenges and gift cards in the background

mod api;
mod auth;
mod background;
mod config;
mod db;
mod email;
mod error;
mod services;
mod state;
mod stripe;
mod util;

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use http::HeaderValue;
use tower::ServiceBuilder;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use config::Config;
use db::BoxError;
use state::AppState;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // `studio-server hash-password <password>` prints an ADMIN_PASSWORD_HASH value
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(String::as_str) == Some("hash-password") {
        let password = args.get(2).ok_or("usage: studio-server hash-password <password>")?;
        let hash = util::hash_password(password).map_err(|e| format!("hashing failed: {e}"))?;
        println!("{hash}");
        return Ok(());
    }

    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studio_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting studio-server (env: {})", config.environment);

    let state = AppState::new(&config).await?;

    background::spawn_rate_limit_cleanup(&state);
    background::spawn_sweeper(&state);

    let app = with_middleware(api::create_router(state), &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("studio-server HTTP listening on {addr}");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("studio-server stopped");
    Ok(())
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_allowed_origins.is_empty() {
        if !config.is_development() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty, allowing any origin");
        }
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Outermost first: request id, trace, CORS, compression, limits.
fn with_middleware(router: Router, config: &Config) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(config))
            .layer(CompressionLayer::new())
            .layer(TimeoutLayer::with_status_code(
                http::StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(30),
            ))
            .layer(ConcurrencyLimitLayer::new(256))
            .layer(DefaultBodyLimit::max(1024 * 1024)),
    )
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
