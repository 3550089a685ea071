//! Root handler - service info

use axum::{extract::State, Json};
use serde_json::json;

use crate::AppState;

pub async fn info(State(state): State<AppState>) -> Json<serde_json::Value> {
    let model = state
        .model
        .status()
        .map(|s| s.name)
        .unwrap_or_else(|| "not loaded".to_string());

    Json(json!({
        "service": "ASL ML Inference API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "operational",
        "endpoints": {
            "predict": "POST /predict",
            "health": "GET /health",
            "stats": "GET /stats"
        },
        "model": model
    }))
}
