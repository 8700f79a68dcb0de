use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use mabar::api::http::HttpTransport;
use mabar::config::AppConfig;
use mabar::handlers;
use mabar::state::{spawn_sweeper, AppState};

const UPLOAD_LIMIT_BYTES: usize = 8 * 1024 * 1024;
const MOUNT_SWEEP_PERIOD: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    if config.payment_client_key.is_empty() {
        tracing::warn!("PAYMENT_CLIENT_KEY is not set; the checkout widget will reject payments");
    }

    let transport = HttpTransport::new(&config.api_base_url, config.api_timeout_secs)?;
    tracing::info!(
        backend = %config.api_base_url,
        production = config.payment_is_production,
        "backend client ready"
    );

    let state = Arc::new(AppState::new(config.clone(), Arc::new(transport)));
    spawn_sweeper(state.clone(), MOUNT_SWEEP_PERIOD);

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/payment/continue", get(handlers::continuation::continue_page))
        .route("/unauthorized", get(handlers::diagnostics::unauthorized_page))
        .route("/api/session", get(handlers::session::current))
        .route("/api/session/logout", post(handlers::session::logout))
        .route("/api/bookings", post(handlers::continuation::create_booking))
        .route("/api/payments/continue", get(handlers::continuation::mount))
        .route("/api/payments/:mount", delete(handlers::continuation::unmount))
        .route(
            "/api/payments/:mount/continue",
            post(handlers::continuation::resume),
        )
        .route(
            "/api/payments/:mount/outcome",
            post(handlers::continuation::outcome),
        )
        .route(
            "/api/payments/:mount/countdown",
            get(handlers::continuation::countdown),
        )
        .route(
            "/api/mabar/:id/join",
            post(handlers::mabar::join_session).delete(handlers::mabar::leave_session),
        )
        .route("/api/mabar/:id/manage", get(handlers::mabar::manage))
        .route("/api/mabar/:id/edit", post(handlers::mabar::edit))
        .route("/api/mabar/:id/guests", post(handlers::mabar::add_guest))
        .route(
            "/api/mabar/:id/participants/:pid/moderate",
            post(handlers::mabar::moderate),
        )
        .route(
            "/api/mabar/:id/participants/:pid/payment-proof",
            post(handlers::mabar::upload_proof),
        )
        .fallback(handlers::fallback)
        .layer(middleware::from_fn(handlers::edge::gate_pages))
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
