//! Statistics handler
//!
//! Rolling-window aggregates recomputed on demand from the prediction
//! log; nothing is cached between requests.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::models::PredictionRecord;
use crate::{AppError, AppResult, AppState};

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_predictions: i64,
    pub last_24h_avg_confidence: f64,
    pub last_1h_avg_processing_ms: f64,
    pub top_letters_24h: Vec<LetterCount>,
}

#[derive(Debug, Serialize)]
pub struct LetterCount {
    pub letter: String,
    pub count: i64,
}

/// Get prediction statistics
pub async fn summary(State(state): State<AppState>) -> AppResult<Json<StatsResponse>> {
    let pool = state.pool.as_ref().ok_or(AppError::DatabaseUnavailable)?;

    let total = PredictionRecord::total_count(pool).await?;
    let avg_confidence = PredictionRecord::avg_confidence_24h(pool).await?;
    let avg_processing = PredictionRecord::avg_processing_ms_1h(pool).await?;
    let top_letters = PredictionRecord::top_letters_24h(pool).await?;

    Ok(Json(StatsResponse {
        total_predictions: total,
        last_24h_avg_confidence: avg_confidence,
        last_1h_avg_processing_ms: avg_processing,
        top_letters_24h: top_letters
            .into_iter()
            .map(|(letter, count)| LetterCount { letter, count })
            .collect(),
    }))
}
