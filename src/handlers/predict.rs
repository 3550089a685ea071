//! Prediction handler
//!
//! Validate payload shape, extract features, run the classifier, and log
//! the result to the prediction store without blocking the response.

use std::collections::BTreeMap;
use std::time::Instant;

use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::features::{self, CHANNEL_COUNT};
use crate::models::NewPrediction;
use crate::{AppError, AppResult, AppState};

/// Identifier recorded when the client omits `device_id`
const DEFAULT_DEVICE_ID: &str = "desktop-app";

/// Raw sensor payload from the glove
#[derive(Debug, Deserialize)]
pub struct SensorPayload {
    pub flex_sensors: SensorInput,
    #[serde(default)]
    pub timestamp: Option<f64>,
    #[serde(default)]
    pub device_id: Option<String>,
}

/// Either a single 5-channel sample or a multi-sample window
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SensorInput {
    Single(Vec<f32>),
    Window(Vec<Vec<f32>>),
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub letter: String,
    pub confidence: f32,
    pub all_probabilities: BTreeMap<String, f32>,
    pub processing_time_ms: f64,
    pub model_name: String,
    pub timestamp: f64,
}

/// Predict an ASL letter from flex-sensor readings.
pub async fn predict(
    State(state): State<AppState>,
    Json(payload): Json<SensorPayload>,
) -> AppResult<Json<PredictionResponse>> {
    let started = Instant::now();

    if !state.model.is_loaded() {
        return Err(AppError::ModelUnavailable);
    }

    let device_id = payload
        .device_id
        .unwrap_or_else(|| DEFAULT_DEVICE_ID.to_string());
    tracing::debug!(
        device_id = %device_id,
        client_timestamp = payload.timestamp,
        "prediction request"
    );

    let window = normalize_window(&payload.flex_sensors)?;
    let feature_vector = features::extract_features(&window);

    // Inference holds the model write lock; run it on a blocking thread
    // so waiting predictions never stall the async workers
    let model = state.model.clone();
    let (prediction, model_name) =
        tokio::task::spawn_blocking(move || model.predict(&feature_vector))
            .await
            .map_err(|e| AppError::InternalError(format!("inference task failed: {}", e)))??;

    let processing_time_ms = started.elapsed().as_secs_f64() * 1000.0;

    // Log prediction in the background; the response never waits for it
    if let Some(pool) = state.pool.clone() {
        let record = NewPrediction {
            letter: prediction.letter.clone(),
            confidence: prediction.confidence,
            sensor_data: feature_vector.to_vec(),
            device_id,
            processing_time_ms,
        };
        tokio::spawn(async move {
            if let Err(e) = record.insert(&pool).await {
                tracing::warn!("Failed to log prediction: {}", e);
            }
        });
    }

    Ok(Json(PredictionResponse {
        letter: prediction.letter,
        confidence: prediction.confidence,
        all_probabilities: prediction.probabilities,
        processing_time_ms,
        model_name,
        timestamp: Utc::now().timestamp_micros() as f64 / 1e6,
    }))
}

/// Normalize the payload into a window of shape (n >= 1, 5).
fn normalize_window(input: &SensorInput) -> Result<Vec<[f32; CHANNEL_COUNT]>, AppError> {
    match input {
        SensorInput::Single(sample) => Ok(vec![to_sample(sample)?]),
        SensorInput::Window(samples) => {
            if samples.is_empty() {
                return Err(AppError::InvalidInput(
                    "flex_sensors window must contain at least one sample".to_string(),
                ));
            }
            samples.iter().map(|s| to_sample(s)).collect()
        }
    }
}

fn to_sample(values: &[f32]) -> Result<[f32; CHANNEL_COUNT], AppError> {
    let array: [f32; CHANNEL_COUNT] = values.try_into().map_err(|_| {
        AppError::InvalidInput(format!(
            "each sample must have exactly {} flex sensor values, got {}",
            CHANNEL_COUNT,
            values.len()
        ))
    })?;
    Ok(array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::ModelHolder;
    use std::sync::Arc;

    #[test]
    fn rejects_prediction_without_model() {
        let state = AppState {
            model: Arc::new(ModelHolder::new()),
            pool: None,
            started_at: Instant::now(),
        };
        let payload = SensorPayload {
            flex_sensors: SensorInput::Single(vec![512.3, 678.1, 345.9, 890.2, 234.5]),
            timestamp: None,
            device_id: None,
        };

        let result = tokio_test::block_on(predict(State(state), Json(payload)));
        assert!(matches!(result, Err(AppError::ModelUnavailable)));
    }

    #[test]
    fn single_sample_normalizes_to_window_of_one() {
        let input = SensorInput::Single(vec![512.3, 678.1, 345.9, 890.2, 234.5]);
        let window = normalize_window(&input).unwrap();

        assert_eq!(window.len(), 1);
        assert_eq!(window[0], [512.3, 678.1, 345.9, 890.2, 234.5]);
    }

    #[test]
    fn windowed_payload_keeps_sample_order() {
        let input = SensorInput::Window(vec![vec![0.0; 5], vec![10.0; 5]]);
        let window = normalize_window(&input).unwrap();

        assert_eq!(window.len(), 2);
        assert_eq!(window[0], [0.0; 5]);
        assert_eq!(window[1], [10.0; 5]);
    }

    #[test]
    fn short_sample_is_invalid_input() {
        let input = SensorInput::Single(vec![1.0, 2.0, 3.0, 4.0]);
        assert!(matches!(
            normalize_window(&input),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn ragged_window_is_invalid_input() {
        let input = SensorInput::Window(vec![vec![1.0; 5], vec![1.0; 4]]);
        assert!(matches!(
            normalize_window(&input),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn empty_window_is_invalid_input() {
        let input = SensorInput::Window(vec![]);
        assert!(matches!(
            normalize_window(&input),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn payload_accepts_both_wire_shapes() {
        let single: SensorPayload =
            serde_json::from_str(r#"{"flex_sensors": [1.0, 2.0, 3.0, 4.0, 5.0]}"#).unwrap();
        assert!(matches!(single.flex_sensors, SensorInput::Single(_)));
        assert_eq!(single.device_id, None);

        let windowed: SensorPayload = serde_json::from_str(
            r#"{"flex_sensors": [[1.0, 2.0, 3.0, 4.0, 5.0]], "device_id": "glove-001"}"#,
        )
        .unwrap();
        assert!(matches!(windowed.flex_sensors, SensorInput::Window(_)));
        assert_eq!(windowed.device_id.as_deref(), Some("glove-001"));
    }
}
