//! ASL Glove Inference API
//!
//! Low-latency prediction server for an IoT sign-language glove.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  ASL INFERENCE API                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌─────────────┐  ┌───────────────────────┐ │
//! │  │  API      │  │  Inference  │  │  Prediction Logging   │ │
//! │  │  Gateway  │  │  Engine     │  │  (Background Tasks)   │ │
//! │  │  (Axum)   │  │  (ONNX)     │  │                       │ │
//! │  └─────┬─────┘  └──────┬──────┘  └───────────┬───────────┘ │
//! │        └───────────────┼──────────────────────┘             │
//! │                        ▼                                    │
//! │                 ┌─────────────┐                             │
//! │                 │ PostgreSQL  │                             │
//! │                 └─────────────┘                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;
mod error;
mod features;
mod handlers;
mod inference;
mod models;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inference::ModelHolder;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "asl_inference_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("ASL Inference API starting...");

    // Load model (service stays up in degraded mode if unavailable)
    let model = Arc::new(ModelHolder::new());
    match config.resolve_model_path() {
        Some(path) => {
            if let Err(e) = model.load(&path) {
                tracing::error!("Failed to load model: {}", e);
            }
        }
        None => tracing::error!("No model found! Please mount a model artifact"),
    }

    // Initialize database pool (degraded sink if unreachable or the
    // schema cannot be applied)
    let pool = db::init_pool(&config).await;

    // Build application state
    let state = AppState {
        model,
        pool: pool.clone(),
        started_at: Instant::now(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pool {
        pool.close().await;
        tracing::info!("Database pool closed");
    }

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received");
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<ModelHolder>,
    pub pool: Option<sqlx::PgPool>,
    pub started_at: Instant,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root::info))
        .route("/health", get(handlers::health::check))
        .route("/predict", post(handlers::predict::predict))
        .route("/stats", get(handlers::stats::summary))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
