//! Railway Concession Admin Backend
//!
//! REST backend for the college railway-concession workflow: staff edit and
//! cancel student pass records, correct certificate numbers, and broadcast
//! notifications. SQLite holds the document collections and the daily
//! statistics ledger; a filesystem blob store holds attachments and the
//! concession history log.

mod api;
mod blob;
mod config;
mod db;
mod errors;
mod history;
mod models;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use blob::BlobStore;
use config::Config;
use db::Repository;
use history::HistoryLog;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub blobs: Arc<BlobStore>,
    pub history: Arc<HistoryLog>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Railway Concession Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Blob root: {:?}", config.blob_root);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Initialize blob store and history log
    let blobs = Arc::new(BlobStore::open(&config.blob_root, &config.public_url).await?);
    let history = Arc::new(HistoryLog::new((*blobs).clone()));

    // Create application state
    let state = AppState {
        repo,
        blobs,
        history,
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes
    let api_routes = Router::new()
        // Pass records
        .route("/passes", post(api::create_pass))
        .route("/passes/{studentId}", get(api::get_pass))
        .route("/passes/{studentId}", put(api::update_pass))
        .route("/passes/{studentId}/cancel", post(api::cancel_pass))
        .route("/passes/{studentId}/issue", post(api::issue_pass))
        // Certificate number correction
        .route("/certificates/{number}", get(api::search_certificate))
        .route("/certificates/{number}", put(api::update_certificate))
        // Notifications
        .route("/notifications", get(api::list_notifications))
        .route("/notifications", post(api::send_notification))
        // Daily stats ledger
        .route("/stats", get(api::get_stats));

    // Uploaded blobs (attachments, history log)
    let files = ServeDir::new(state.blobs.root());

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .nest_service("/files", files)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
