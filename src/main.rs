use std::sync::{Arc, Mutex};

use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use barberbook::config::AppConfig;
use barberbook::db;
use barberbook::handlers;
use barberbook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;
    if config.seed_demo {
        db::seed::seed_demo(&conn, Utc::now().date_naive())?;
    }

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
    });

    let app = router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/shops", get(handlers::shops::list_shops))
        .route("/api/shops/:id", get(handlers::shops::get_shop))
        .route("/api/shops/:id/dates", get(handlers::shops::get_dates))
        .route("/api/shops/:id/slots", get(handlers::shops::get_slots))
        .route("/api/shops/:id/qr", get(handlers::shops::get_qr))
        .route(
            "/api/shops/:id/appointments",
            get(handlers::appointments::list_for_shop),
        )
        .route("/api/qr/scan", post(handlers::shops::scan_qr))
        .route(
            "/api/appointments",
            post(handlers::appointments::book).get(handlers::appointments::list_for_customer),
        )
        .route(
            "/api/appointments/:id/confirm",
            post(handlers::appointments::confirm),
        )
        .route(
            "/api/appointments/:id/complete",
            post(handlers::appointments::complete),
        )
        .route(
            "/api/appointments/:id/cancel",
            post(handlers::appointments::cancel),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
