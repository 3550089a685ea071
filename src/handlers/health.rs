//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    model_loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_loaded_at: Option<String>,
    database_connected: bool,
    uptime_seconds: f64,
}

/// Report service health; "degraded" whenever no model is loaded.
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let model = state.model.status();

    Json(HealthResponse {
        status: if model.is_some() { "healthy" } else { "degraded" },
        model_loaded: model.is_some(),
        model_name: model.as_ref().map(|m| m.name.clone()),
        model_loaded_at: model.as_ref().map(|m| m.loaded_at.to_rfc3339()),
        database_connected: state.pool.is_some(),
        uptime_seconds: state.started_at.elapsed().as_secs_f64(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::ModelHolder;
    use std::sync::Arc;
    use std::time::Instant;

    #[test]
    fn reports_degraded_without_model() {
        let state = AppState {
            model: Arc::new(ModelHolder::new()),
            pool: None,
            started_at: Instant::now(),
        };

        let Json(response) = tokio_test::block_on(check(State(state)));

        assert_eq!(response.status, "degraded");
        assert!(!response.model_loaded);
        assert!(response.model_name.is_none());
        assert!(response.model_loaded_at.is_none());
        assert!(!response.database_connected);
    }
}
